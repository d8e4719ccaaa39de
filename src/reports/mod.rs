//! 报表层（Reports）
//!
//! 把结果集合整理成表格：
//!
//! - `summary_csv` - 按模板列出关键指标的汇总表
//! - `category_sheets` - 分类别的输入/输出表和逐时序列表
//! - `input_template` - 由输入定义生成的输入模板

pub mod category_sheets;
pub mod input_template;
pub mod summary_csv;

pub use category_sheets::{build_sheets, write_category_sheets, Sheet};
pub use input_template::{build_input_template, write_input_template};
pub use summary_csv::{get_nested_output, read_template_header, summary_table, write_summary_csv};

use crate::error::{AppError, AppResult};
use serde_json::Value as JsonValue;
use std::path::Path;
use tokio::fs;

/// 单元格文本：字符串去掉引号，`null` 为空
pub(crate) fn cell_text(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// 写出一个 CSV 文件，必要时创建上级目录
pub(crate) async fn write_csv(
    path: &Path,
    header: &[String],
    rows: &[Vec<String>],
) -> AppResult<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::io(path, e.into_error()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::io(parent, e))?;
    }
    fs::write(path, bytes)
        .await
        .map_err(|e| AppError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cell_text_unquotes_strings() {
        assert_eq!(cell_text(Some(&json!("optimal"))), "optimal");
        assert_eq!(cell_text(Some(&json!(12.5))), "12.5");
        assert_eq!(cell_text(Some(&json!(null))), "");
        assert_eq!(cell_text(None), "");
    }

    #[tokio::test]
    async fn write_csv_creates_parent_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a").join("b.csv");

        write_csv(
            &path,
            &["x".to_string(), "y".to_string()],
            &[vec!["1".to_string(), "has,comma".to_string()]],
        )
        .await
        .expect("write");

        let content = std::fs::read_to_string(&path).expect("read");
        assert_eq!(content, "x,y\n1,\"has,comma\"\n");
    }
}
