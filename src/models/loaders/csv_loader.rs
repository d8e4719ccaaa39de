use crate::error::{AppError, AppResult};
use crate::models::FlatRow;
use phf::phf_set;
use serde_json::{Number, Value};
use std::path::Path;
use tokio::fs;

/// 视为空单元格的文本
static NA_MARKERS: phf::Set<&'static str> = phf_set! {
    "", "NA", "N/A", "NaN", "nan", "null", "None",
};

/// 场景输入表
///
/// 同时保留原始文本（用于把自定义列原样复制到汇总表）和类型化后的行
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub raw_rows: Vec<Vec<String>>,
    pub rows: Vec<FlatRow>,
}

impl InputTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 每行的场景描述，缺失时用序号代替
    pub fn descriptions(&self) -> Vec<String> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| row_description(row, i + 1))
            .collect()
    }
}

/// 场景描述：`description` 列，缺失时为 `scenario_<序号>`
pub fn row_description(row: &FlatRow, row_number: usize) -> String {
    row.text("description")
        .unwrap_or_else(|| format!("scenario_{}", row_number))
}

/// 从 CSV 文件加载场景输入
///
/// # 参数
/// - `path`: CSV 文件路径，首行为列名
/// - `n_sites`: 只保留前 N 行
pub async fn load_scenarios_csv(path: &Path, n_sites: Option<usize>) -> AppResult<InputTable> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::io(path, e))?;

    let mut table = parse_scenarios_csv(&content)?;
    if let Some(n) = n_sites {
        table.raw_rows.truncate(n);
        table.rows.truncate(n);
    }

    tracing::info!(
        "成功加载 {} 个场景: {}",
        table.rows.len(),
        path.display()
    );
    Ok(table)
}

/// 解析 CSV 文本
///
/// 按列推断类型：整列都是整数则为整数，都是数字则为浮点数，
/// 都是 true/false 则为布尔值，否则保留为字符串。
pub fn parse_scenarios_csv(content: &str) -> AppResult<InputTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut raw_rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut cells: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        cells.resize(headers.len(), String::new());
        raw_rows.push(cells);
    }

    let column_types: Vec<ColumnType> = (0..headers.len())
        .map(|col| ColumnType::infer(raw_rows.iter().map(|r| r[col].as_str())))
        .collect();

    let rows = raw_rows
        .iter()
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .zip(&column_types)
                .map(|((header, cell), ty)| (header.clone(), ty.convert(cell)))
                .collect::<FlatRow>()
        })
        .collect();

    Ok(InputTable {
        headers,
        raw_rows,
        rows,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnType {
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let present: Vec<&str> = cells.filter(|c| !is_na(c)).collect();
        if present.is_empty() {
            return ColumnType::Text;
        }
        if present.iter().all(|c| c.parse::<i64>().is_ok()) {
            ColumnType::Int
        } else if present.iter().all(|c| parse_float(c).is_some()) {
            ColumnType::Float
        } else if present.iter().all(|c| parse_bool(c).is_some()) {
            ColumnType::Bool
        } else {
            ColumnType::Text
        }
    }

    fn convert(self, cell: &str) -> Option<Value> {
        if is_na(cell) {
            return None;
        }
        match self {
            ColumnType::Int => cell.parse::<i64>().ok().map(Value::from),
            ColumnType::Float => parse_float(cell).map(Value::Number),
            ColumnType::Bool => parse_bool(cell).map(Value::Bool),
            ColumnType::Text => Some(Value::String(cell.to_string())),
        }
    }
}

fn is_na(cell: &str) -> bool {
    NA_MARKERS.contains(cell)
}

fn parse_float(cell: &str) -> Option<Number> {
    cell.parse::<f64>().ok().and_then(Number::from_f64)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CSV: &str = "\
site_number,description,Site|latitude,PV|max_kw,Storage|can_grid_charge,load_file
1,office, 34.5,100,true,
2,2,-20,,FALSE,site2.csv
";

    #[test]
    fn infers_types_per_column() {
        let table = parse_scenarios_csv(CSV).expect("parse");
        assert_eq!(table.len(), 2);

        let first = &table.rows[0];
        assert_eq!(first.value("site_number"), Some(&json!(1)));
        assert_eq!(first.value("description"), Some(&json!("office")));
        assert_eq!(first.value("Site|latitude"), Some(&json!(34.5)));
        assert_eq!(first.value("PV|max_kw"), Some(&json!(100)));
        assert_eq!(first.value("Storage|can_grid_charge"), Some(&json!(true)));
        assert!(first.contains("load_file"));
        assert_eq!(first.value("load_file"), None);

        let second = &table.rows[1];
        // 该列混有文本，数字也保留为字符串
        assert_eq!(second.value("description"), Some(&json!("2")));
        assert_eq!(second.value("Site|latitude"), Some(&json!(-20.0)));
        assert_eq!(second.value("PV|max_kw"), None);
        assert_eq!(second.value("Storage|can_grid_charge"), Some(&json!(false)));
        assert_eq!(second.value("load_file"), Some(&json!("site2.csv")));
    }

    #[test]
    fn keeps_raw_text_and_headers() {
        let table = parse_scenarios_csv(CSV).expect("parse");
        assert_eq!(table.headers[2], "Site|latitude");
        assert_eq!(table.raw_rows[0][2], "34.5");
        assert_eq!(table.descriptions(), vec!["office", "2"]);
    }

    #[test]
    fn short_records_are_padded() {
        let table = parse_scenarios_csv("a,b,c\n1\n").expect("parse");
        assert_eq!(table.raw_rows[0], vec!["1", "", ""]);
        assert_eq!(table.rows[0].value("c"), None);
        assert_eq!(table.descriptions(), vec!["scenario_1"]);
    }

    #[tokio::test]
    async fn load_truncates_to_n_sites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scenarios.csv");
        std::fs::write(&path, CSV).expect("write csv");

        let table = load_scenarios_csv(&path, Some(1)).await.expect("load");
        assert_eq!(table.len(), 1);
        assert_eq!(table.raw_rows.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = load_scenarios_csv(Path::new("no/such/file.csv"), None)
            .await
            .expect_err("missing file");
        assert!(matches!(err, AppError::Io { .. }));
    }
}
