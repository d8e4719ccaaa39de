//! 分类别输出
//!
//! 每张"工作表"写成目录下的一个 CSV：
//! - `Sites.csv`：场景级和站点级的标量输入，以及错误信息
//! - `<类别>_inputs.csv` / `<类别>_outputs.csv`：每个场景一行
//! - `<描述>_time_series.csv`：该场景所有非空序列，每列一个 `类别|字段`；
//!   描述重复时文件名加上行号
//!
//! 没有结果的场景不出现在任何表中。

use super::{cell_text, write_csv};
use crate::error::AppResult;
use crate::models::{lookup, piped_key, ApiVersion};
use crate::utils::file_stem;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::info;

const DESCRIPTION_COLUMN: &str = "description";
const ERROR_COLUMN: &str = "error_message";
const SITES_SHEET: &str = "Sites";

/// 一张表
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

type Fields<'a> = BTreeMap<String, &'a JsonValue>;

/// 按类别整理全部结果
///
/// `descriptions` 与 `responses` 按位置对应
pub fn build_sheets(
    responses: &[Option<JsonValue>],
    descriptions: &[String],
    version: ApiVersion,
) -> Vec<Sheet> {
    let mut sites = SitesSheet::default();
    let mut categories: BTreeMap<String, Vec<(&str, Fields<'_>)>> = BTreeMap::new();
    let mut time_series = Vec::new();

    let mut series_names = HashSet::new();

    for (index, (response, description)) in responses.iter().zip(descriptions).enumerate() {
        let Some(response) = response else {
            continue;
        };

        sites.push(description, response, version);

        let mut series: BTreeMap<String, &Vec<JsonValue>> = BTreeMap::new();
        let roots = [
            (version.input_root(), "inputs"),
            (version.output_root(), "outputs"),
        ];
        for (root, suffix) in roots {
            let Some(root) = lookup(response, root).and_then(JsonValue::as_object) else {
                continue;
            };
            for (category, fields) in root.iter().filter(|(k, _)| is_category(k)) {
                let Some(fields) = fields.as_object() else {
                    continue;
                };
                categories
                    .entry(format!("{}_{}", category, suffix))
                    .or_default()
                    .push((description.as_str(), scalar_fields(fields)));
                for (name, values) in series_fields(fields) {
                    series.insert(piped_key(category, name), values);
                }
            }
        }

        if !series.is_empty() {
            let mut name = format!("{}_time_series", description);
            if !series_names.insert(name.clone()) {
                // 描述重复时加上行号
                name = format!("{}_time_series_{}", description, index + 1);
                series_names.insert(name.clone());
            }
            time_series.push(time_series_sheet(name, &series));
        }
    }

    let mut sheets = vec![sites.finish()];
    sheets.extend(
        categories
            .into_iter()
            .map(|(name, records)| category_sheet(name, &records)),
    );
    sheets.extend(time_series);
    sheets
}

/// 写出全部分类别表
///
/// # 返回
/// 写出的文件数量
pub async fn write_category_sheets(
    dir: &Path,
    responses: &[Option<JsonValue>],
    descriptions: &[String],
    version: ApiVersion,
) -> AppResult<usize> {
    let sheets = build_sheets(responses, descriptions, version);
    for sheet in &sheets {
        let path = dir.join(format!("{}.csv", file_stem(&sheet.name)));
        write_csv(&path, &sheet.header, &sheet.rows).await?;
    }
    info!("📁 已写入 {} 张分类别表: {}", sheets.len(), dir.display());
    Ok(sheets.len())
}

#[derive(Default)]
struct SitesSheet<'a> {
    scenario_keys: BTreeSet<String>,
    site_keys: BTreeSet<String>,
    records: Vec<(&'a str, Fields<'a>, String)>,
}

impl<'a> SitesSheet<'a> {
    fn push(&mut self, description: &'a str, response: &'a JsonValue, version: ApiVersion) {
        let [scenario_root, site_root] = version.scenario_input_roots();
        let scenario = object_fields(response, scenario_root);
        let site = object_fields(response, site_root);

        self.scenario_keys.extend(scenario.keys().cloned());
        self.site_keys.extend(site.keys().cloned());

        let mut fields = site;
        fields.extend(scenario);
        fields.remove(DESCRIPTION_COLUMN);

        let error = cell_text(lookup(response, version.error_message_path()));
        self.records.push((description, fields, error));
    }

    fn finish(self) -> Sheet {
        let site_only: Vec<String> = self
            .site_keys
            .into_iter()
            .filter(|k| !self.scenario_keys.contains(k))
            .collect();
        let columns: Vec<String> = self
            .scenario_keys
            .into_iter()
            .chain(site_only)
            .filter(|k| k != DESCRIPTION_COLUMN)
            .collect();

        let header = std::iter::once(DESCRIPTION_COLUMN.to_string())
            .chain(columns.iter().cloned())
            .chain(std::iter::once(ERROR_COLUMN.to_string()))
            .collect();

        let rows = self
            .records
            .into_iter()
            .map(|(description, fields, error)| {
                std::iter::once(description.to_string())
                    .chain(columns.iter().map(|c| cell_text(fields.get(c).copied())))
                    .chain(std::iter::once(error))
                    .collect()
            })
            .collect();

        Sheet {
            name: SITES_SHEET.to_string(),
            header,
            rows,
        }
    }
}

fn category_sheet(name: String, records: &[(&str, Fields<'_>)]) -> Sheet {
    let columns: BTreeSet<&String> = records.iter().flat_map(|(_, f)| f.keys()).collect();

    let header = std::iter::once(DESCRIPTION_COLUMN.to_string())
        .chain(columns.iter().map(|c| c.to_string()))
        .collect();

    let rows = records
        .iter()
        .map(|(description, fields)| {
            std::iter::once(description.to_string())
                .chain(columns.iter().map(|c| cell_text(fields.get(*c).copied())))
                .collect()
        })
        .collect();

    Sheet { name, header, rows }
}

fn time_series_sheet(name: String, series: &BTreeMap<String, &Vec<JsonValue>>) -> Sheet {
    let length = series.values().map(|v| v.len()).max().unwrap_or(0);
    let rows = (0..length)
        .map(|i| series.values().map(|v| cell_text(v.get(i))).collect())
        .collect();

    Sheet {
        name,
        header: series.keys().cloned().collect(),
        rows,
    }
}

fn is_category(key: &str) -> bool {
    key.starts_with(|c: char| c.is_ascii_uppercase())
}

fn is_parameter(key: &str) -> bool {
    key.starts_with(|c: char| c.is_ascii_lowercase())
}

fn object_fields<'a>(response: &'a JsonValue, path: &[&str]) -> Fields<'a> {
    lookup(response, path)
        .and_then(JsonValue::as_object)
        .map(scalar_fields)
        .unwrap_or_default()
}

/// 小写开头的标量字段；列表、对象和名称含 `series` 的字段除外
fn scalar_fields(fields: &Map<String, JsonValue>) -> Fields<'_> {
    fields
        .iter()
        .filter(|(k, v)| {
            is_parameter(k)
                && !v.is_object()
                && !v.is_array()
                && !k.to_ascii_lowercase().contains("series")
        })
        .map(|(k, v)| (k.clone(), v))
        .collect()
}

fn series_fields(fields: &Map<String, JsonValue>) -> impl Iterator<Item = (&str, &Vec<JsonValue>)> {
    fields.iter().filter_map(|(k, v)| match v {
        JsonValue::Array(values) if is_parameter(k) && !values.is_empty() => {
            Some((k.as_str(), values))
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(pv_kw: f64, error: Option<&str>) -> JsonValue {
        json!({
            "inputs": {"Scenario": {
                "description": "ignored",
                "timeout_seconds": 295,
                "Site": {
                    "latitude": 34.0,
                    "longitude": -118.0,
                    "PV": {"max_kw": 1000, "prod_factor_series_kw": [0.1, 0.2]},
                    "LoadProfile": {"loads_kw": [], "annual_kwh": 1.0e6}
                }
            }},
            "outputs": {"Scenario": {
                "status": "optimal",
                "Site": {
                    "PV": {"size_kw": pv_kw, "year_one_power_production_series_kw": [1.0, 2.0, 3.0]},
                    "Financial": {"npv_us_dollars": 10}
                }
            }},
            "messages": {"error": error}
        })
    }

    fn names(sheets: &[Sheet]) -> Vec<&str> {
        sheets.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn builds_sites_category_and_time_series_sheets() {
        let responses = vec![Some(response(100.0, None)), None, Some(response(50.0, Some("infeasible")))];
        let descriptions = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let sheets = build_sheets(&responses, &descriptions, ApiVersion::Legacy);

        assert_eq!(
            names(&sheets),
            vec![
                "Sites",
                "Financial_outputs",
                "LoadProfile_inputs",
                "PV_inputs",
                "PV_outputs",
                "a_time_series",
                "c_time_series",
            ]
        );

        let sites = &sheets[0];
        assert_eq!(
            sites.header,
            vec!["description", "timeout_seconds", "latitude", "longitude", "error_message"]
        );
        assert_eq!(sites.rows[0], vec!["a", "295", "34.0", "-118.0", ""]);
        assert_eq!(sites.rows[1][4], "infeasible");

        let pv_outputs = &sheets[4];
        assert_eq!(pv_outputs.header, vec!["description", "size_kw"]);
        assert_eq!(pv_outputs.rows, vec![vec!["a", "100.0"], vec!["c", "50.0"]]);

        let pv_inputs = &sheets[3];
        assert_eq!(pv_inputs.header, vec!["description", "max_kw"]);
    }

    #[test]
    fn time_series_columns_are_padded() {
        let sheets = build_sheets(&[Some(response(1.0, None))], &["a".to_string()], ApiVersion::Legacy);
        let series = sheets.iter().find(|s| s.name == "a_time_series").expect("series sheet");

        assert_eq!(
            series.header,
            vec!["PV|prod_factor_series_kw", "PV|year_one_power_production_series_kw"]
        );
        assert_eq!(series.rows.len(), 3);
        assert_eq!(series.rows[2], vec!["", "3.0"]);
    }

    #[test]
    fn current_protocol_uses_top_level_inputs_and_errors() {
        let response = json!({
            "status": "error",
            "inputs": {"Site": {"latitude": 1.0}, "PV": {"max_kw": 5}},
            "outputs": {"PV": {"size_kw": 2}},
            "messages": {"errors": "bad tariff"}
        });
        let sheets = build_sheets(&[Some(response)], &["x".to_string()], ApiVersion::Current);

        assert_eq!(sheets[0].header, vec!["description", "latitude", "error_message"]);
        assert_eq!(sheets[0].rows[0], vec!["x", "1.0", "bad tariff"]);
        assert!(names(&sheets).contains(&"Site_inputs"));
        assert!(names(&sheets).contains(&"PV_outputs"));
    }

    #[test]
    fn duplicate_descriptions_get_distinct_time_series_sheets() {
        let responses = vec![Some(response(1.0, None)), Some(response(2.0, None))];
        let descriptions = vec!["same".to_string(), "same".to_string()];

        let sheets = build_sheets(&responses, &descriptions, ApiVersion::Legacy);
        let series: Vec<&str> = names(&sheets)
            .into_iter()
            .filter(|n| n.contains("_time_series"))
            .collect();

        assert_eq!(series, vec!["same_time_series", "same_time_series_2"]);
    }

    #[tokio::test]
    async fn writes_one_file_per_sheet() {
        let dir = tempfile::tempdir().expect("tempdir");
        let written = write_category_sheets(
            dir.path(),
            &[Some(response(1.0, None))],
            &["my site".to_string()],
            ApiVersion::Legacy,
        )
        .await
        .expect("write");

        assert_eq!(written, 6);
        assert!(dir.path().join("Sites.csv").exists());
        assert!(dir.path().join("my_site_time_series.csv").exists());
    }
}
