//! 输入模板
//!
//! 展开输入定义得到全部参数的默认值，再填入足以跑通一个场景的示例值

use super::{cell_text, write_csv};
use crate::error::AppResult;
use crate::models::{piped_key, ApiVersion, FlatRow, InputSchema};
use crate::services::flatten;
use serde_json::{json, Value as JsonValue};
use std::path::Path;
use tracing::info;

const SITE_NUMBER_COLUMN: &str = "site_number";

/// 示例值，负荷类别随协议版本变化
fn example_values(version: ApiVersion) -> Vec<(String, JsonValue)> {
    let load = version.load_category();
    vec![
        (SITE_NUMBER_COLUMN.to_string(), json!(1)),
        ("description".to_string(), json!("test site")),
        (piped_key("Site", "latitude"), json!(34)),
        (piped_key("Site", "longitude"), json!(-118)),
        (piped_key("ElectricTariff", "urdb_label"), json!("5a3821035457a32645d2dd80")),
        (piped_key(load, "doe_reference_name"), json!("LargeOffice")),
        (piped_key(load, "annual_kwh"), json!(1000000)),
    ]
}

/// 生成输入模板行，`site_number` 为第一列
pub fn build_input_template(schema: &InputSchema, version: ApiVersion) -> FlatRow {
    let mut row = flatten(schema);
    for (key, value) in example_values(version) {
        row.set(key, Some(value));
    }
    row.move_to_front(SITE_NUMBER_COLUMN);
    row
}

/// 写出一行的输入模板 CSV
///
/// # 返回
/// 模板列数
pub async fn write_input_template(
    path: &Path,
    schema: &InputSchema,
    version: ApiVersion,
) -> AppResult<usize> {
    let row = build_input_template(schema, version);
    let header: Vec<String> = row.keys().map(str::to_string).collect();
    let values: Vec<String> = row.iter().map(|(_, v)| cell_text(v)).collect();

    write_csv(path, &header, &[values]).await?;
    info!("📝 输入模板已写入 {} ({} 列)", path.display(), header.len());
    Ok(header.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_scenarios_csv;
    use crate::services::unflatten;

    fn legacy_schema() -> InputSchema {
        InputSchema::from_value(&json!({
            "Scenario": {
                "description": {"default": ""},
                "Site": {
                    "latitude": {"type": "float"},
                    "longitude": {"type": "float"},
                    "PV": {"max_kw": {"default": 1.0e9}, "tilt": {"default": 0.5}},
                    "ElectricTariff": {"urdb_label": {"type": "str"}},
                    "LoadProfile": {
                        "doe_reference_name": {"type": "str"},
                        "annual_kwh": {"type": "float"}
                    }
                }
            }
        }))
    }

    fn current_schema() -> InputSchema {
        InputSchema::from_value(&json!({
            "Site": {"latitude": {"type": "float"}, "longitude": {"type": "float"}},
            "PV": {"max_kw": {"default": 1.0e9}},
            "ElectricTariff": {"urdb_label": {"type": "str"}},
            "ElectricLoad": {
                "doe_reference_name": {"type": "str"},
                "annual_kwh": {"type": "float"}
            }
        }))
    }

    async fn write_and_reload(schema: &InputSchema, version: ApiVersion) -> JsonValue {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("all_api_inputs.csv");

        write_input_template(&path, schema, version).await.expect("write");

        let content = std::fs::read_to_string(&path).expect("read");
        let table = parse_scenarios_csv(&content).expect("parse");
        assert_eq!(table.len(), 1);
        assert_eq!(table.headers[0], "site_number");
        unflatten(&table.rows[0], schema)
    }

    #[test]
    fn site_number_comes_first_and_examples_are_filled() {
        let row = build_input_template(&legacy_schema(), ApiVersion::Legacy);

        assert_eq!(row.keys().next(), Some("site_number"));
        assert_eq!(row.value("description"), Some(&json!("test site")));
        assert_eq!(row.value("Site|latitude"), Some(&json!(34)));
        assert_eq!(row.value("ElectricTariff|urdb_label"), Some(&json!("5a3821035457a32645d2dd80")));
        assert_eq!(row.value("PV|max_kw"), Some(&json!(1.0e9)));
        assert_eq!(row.value("PV|tilt"), None);
    }

    #[test]
    fn current_protocol_examples_use_electric_load() {
        let row = build_input_template(&current_schema(), ApiVersion::Current);

        assert_eq!(row.value("Site|latitude"), Some(&json!(34)));
        assert_eq!(row.value("ElectricLoad|annual_kwh"), Some(&json!(1000000)));
        assert!(!row.contains("LoadProfile|annual_kwh"));
        assert!(!row.contains("latitude"));
    }

    #[tokio::test]
    async fn legacy_template_can_be_read_back_and_submitted() {
        let request = write_and_reload(&legacy_schema(), ApiVersion::Legacy).await;
        let site = &request["Scenario"]["Site"];

        assert_eq!(request["Scenario"]["description"], json!("test site"));
        assert_eq!(site["latitude"], json!(34));
        assert_eq!(site["LoadProfile"]["doe_reference_name"], json!("LargeOffice"));
        assert_eq!(site["PV"]["max_kw"], json!(1.0e9));
        assert!(site["PV"].get("tilt").is_none());
    }

    #[tokio::test]
    async fn current_template_can_be_read_back_and_submitted() {
        let request = write_and_reload(&current_schema(), ApiVersion::Current).await;

        assert_eq!(request["Site"]["latitude"], json!(34));
        assert_eq!(request["Site"]["longitude"], json!(-118));
        assert_eq!(request["ElectricLoad"]["doe_reference_name"], json!("LargeOffice"));
        assert_eq!(request["ElectricLoad"]["annual_kwh"], json!(1000000));
        assert_eq!(request["ElectricTariff"]["urdb_label"], json!("5a3821035457a32645d2dd80"));
        assert_eq!(request["PV"]["max_kw"], json!(1.0e9));
    }
}
