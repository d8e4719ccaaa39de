//! 汇总表
//!
//! 模板 CSV 的首行列出需要的输出字段：
//! - `类别|字段`：直接读取该类别下的字段
//! - 裸字段名：按键名顺序在各个类别中查找，取第一个命中
//!
//! 输入 CSV 的前 N 列原样复制到汇总表最前面。

use super::{cell_text, write_csv};
use crate::error::{AppError, AppResult};
use crate::models::{lookup, ApiVersion, InputTable, PIPE};
use serde_json::Value as JsonValue;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// 从结果文档中取出一个输出字段
pub fn get_nested_output<'a>(
    key: &str,
    response: &'a JsonValue,
    version: ApiVersion,
) -> Option<&'a JsonValue> {
    let root = lookup(response, version.output_root())?.as_object()?;

    match key.split_once(PIPE) {
        Some((category, name)) => root.get(category)?.get(name),
        None => {
            let mut categories: Vec<(&String, &JsonValue)> = root
                .iter()
                .filter(|(category, _)| category.starts_with(|c: char| c.is_ascii_uppercase()))
                .collect();
            categories.sort_by(|a, b| a.0.cmp(b.0));
            categories
                .into_iter()
                .find_map(|(_, outputs)| outputs.as_object()?.get(key))
        }
    }
}

/// 读取模板首行
pub async fn read_template_header(path: &Path) -> AppResult<Vec<String>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header = match reader.records().next() {
        Some(record) => record?
            .iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect(),
        None => Vec::new(),
    };
    Ok(header)
}

/// 生成汇总表的表头和数据行
///
/// 每个结果一行；结果为 `None` 的场景输出字段全部为空
pub fn summary_table(
    outputs: &[String],
    inputs: &InputTable,
    n_custom_columns: usize,
    responses: &[Option<JsonValue>],
    version: ApiVersion,
) -> (Vec<String>, Vec<Vec<String>>) {
    let n_custom = n_custom_columns.min(inputs.headers.len());

    let header = inputs.headers[..n_custom]
        .iter()
        .chain(outputs)
        .cloned()
        .collect();

    let rows = responses
        .iter()
        .enumerate()
        .map(|(i, response)| {
            let custom = (0..n_custom).map(|col| {
                inputs
                    .raw_rows
                    .get(i)
                    .and_then(|cells| cells.get(col))
                    .cloned()
                    .unwrap_or_default()
            });
            let values = outputs.iter().map(|key| {
                cell_text(
                    response
                        .as_ref()
                        .and_then(|r| get_nested_output(key, r, version)),
                )
            });
            custom.chain(values).collect()
        })
        .collect();

    (header, rows)
}

/// 按模板写出汇总表
pub async fn write_summary_csv(
    template: &Path,
    output: &Path,
    inputs: &InputTable,
    n_custom_columns: usize,
    responses: &[Option<JsonValue>],
    version: ApiVersion,
) -> AppResult<()> {
    let outputs = read_template_header(template).await?;
    if outputs.is_empty() {
        warn!("⚠️ 汇总模板没有任何字段: {}", template.display());
    }

    let (header, rows) = summary_table(&outputs, inputs, n_custom_columns, responses, version);
    write_csv(output, &header, &rows).await?;

    info!("📊 汇总表已写入 {} ({} 行)", output.display(), rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_scenarios_csv;
    use serde_json::json;

    fn legacy_response(npv: f64) -> JsonValue {
        json!({
            "outputs": {"Scenario": {
                "status": "optimal",
                "Site": {
                    "lcc_us_dollars": 1.0,
                    "Financial": {"npv_us_dollars": npv, "lcc_us_dollars": 900.0},
                    "PV": {"size_kw": 120.0},
                    "Storage": {"size_kw": 30.0, "size_kwh": 60.0}
                }
            }}
        })
    }

    #[test]
    fn piped_key_reads_category_field() {
        let response = legacy_response(10.0);
        assert_eq!(
            get_nested_output("Storage|size_kw", &response, ApiVersion::Legacy),
            Some(&json!(30.0))
        );
        assert_eq!(get_nested_output("Wind|size_kw", &response, ApiVersion::Legacy), None);
    }

    #[test]
    fn bare_key_searches_categories_in_key_order() {
        let response = legacy_response(10.0);
        // PV 排在 Storage 前面
        assert_eq!(
            get_nested_output("size_kw", &response, ApiVersion::Legacy),
            Some(&json!(120.0))
        );
        // 站点自身的小写字段不参与查找
        assert_eq!(
            get_nested_output("lcc_us_dollars", &response, ApiVersion::Legacy),
            Some(&json!(900.0))
        );
        assert_eq!(get_nested_output("missing", &response, ApiVersion::Legacy), None);
    }

    #[test]
    fn current_protocol_reads_top_level_outputs() {
        let response = json!({"status": "optimal", "outputs": {"PV": {"size_kw": 5}}});
        assert_eq!(
            get_nested_output("PV|size_kw", &response, ApiVersion::Current),
            Some(&json!(5))
        );
    }

    #[test]
    fn table_copies_custom_columns_and_blanks_missing_responses() {
        let inputs =
            parse_scenarios_csv("site_number,description,PV|max_kw\n1,a,10\n2,b,20\n").expect("csv");
        let outputs = vec!["PV|size_kw".to_string(), "npv_us_dollars".to_string()];
        let responses = vec![Some(legacy_response(42.5)), None];

        let (header, rows) = summary_table(&outputs, &inputs, 2, &responses, ApiVersion::Legacy);

        assert_eq!(header, vec!["site_number", "description", "PV|size_kw", "npv_us_dollars"]);
        assert_eq!(rows[0], vec!["1", "a", "120.0", "42.5"]);
        assert_eq!(rows[1], vec!["2", "b", "", ""]);
    }

    #[tokio::test]
    async fn writes_summary_from_template() {
        let dir = tempfile::tempdir().expect("tempdir");
        let template = dir.path().join("results_template.csv");
        std::fs::write(&template, "PV|size_kw,Storage|size_kwh\n").expect("template");
        let output = dir.path().join("out").join("results_summary.csv");
        let inputs = parse_scenarios_csv("description\noffice\n").expect("csv");

        write_summary_csv(
            &template,
            &output,
            &inputs,
            1,
            &[Some(legacy_response(0.0))],
            ApiVersion::Legacy,
        )
        .await
        .expect("write");

        let content = std::fs::read_to_string(&output).expect("read");
        assert_eq!(content, "description,PV|size_kw,Storage|size_kwh\noffice,120.0,60.0\n");
    }
}
