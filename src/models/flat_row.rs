//! 单个场景的扁平输入行
//!
//! 键为 `类别|参数`（管道键）或裸参数名，值为空表示"使用默认值"。

use serde_json::Value;

/// 管道键分隔符
pub const PIPE: char = '|';

/// 拼接管道键
pub fn piped_key(category: &str, parameter: &str) -> String {
    format!("{}{}{}", category, PIPE, parameter)
}

/// 保持列插入顺序的扁平行
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatRow {
    cells: Vec<(String, Option<Value>)>,
}

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置单元格；键已存在时原位替换，不改变列顺序
    pub fn set(&mut self, key: impl Into<String>, value: Option<Value>) {
        let key = key.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, cell)) => *cell = value,
            None => self.cells.push((key, value)),
        }
    }

    /// 把某列移动到最前面
    pub fn move_to_front(&mut self, key: &str) {
        if let Some(pos) = self.cells.iter().position(|(k, _)| k == key) {
            let cell = self.cells.remove(pos);
            self.cells.insert(0, cell);
        }
    }

    /// 列是否存在（不论是否为空）
    pub fn contains(&self, key: &str) -> bool {
        self.cells.iter().any(|(k, _)| k == key)
    }

    /// 取单元格原值；列不存在时为 `None`
    pub fn cell(&self, key: &str) -> Option<&Option<Value>> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 取非空的单元格值
    ///
    /// 缺失、`null` 和空字符串都视为空
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.cell(key)?.as_ref().filter(|v| !is_blank(v))
    }

    /// 非空单元格的文本形式
    pub fn text(&self, key: &str) -> Option<String> {
        self.value(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<Value>)> for FlatRow {
    fn from_iter<I: IntoIterator<Item = (K, Option<Value>)>>(iter: I) -> Self {
        let mut row = FlatRow::new();
        for (key, value) in iter {
            row.set(key, value);
        }
        row
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_replaces_in_place() {
        let mut row = FlatRow::new();
        row.set("description", Some(json!("a")));
        row.set("PV|max_kw", None);
        row.set("description", Some(json!("b")));

        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["description", "PV|max_kw"]);
        assert_eq!(row.value("description"), Some(&json!("b")));
    }

    #[test]
    fn blank_cells_have_no_value() {
        let row: FlatRow = [
            ("a", None),
            ("b", Some(Value::Null)),
            ("c", Some(json!(""))),
            ("d", Some(json!(0))),
        ]
        .into_iter()
        .collect();

        assert!(row.contains("a"));
        assert_eq!(row.value("a"), None);
        assert_eq!(row.value("b"), None);
        assert_eq!(row.value("c"), None);
        assert_eq!(row.value("d"), Some(&json!(0)));
        assert_eq!(row.text("d").as_deref(), Some("0"));
    }

    #[test]
    fn move_to_front_reorders() {
        let mut row: FlatRow = [("x", None), ("site_number", Some(json!(1)))]
            .into_iter()
            .collect();
        row.move_to_front("site_number");
        assert_eq!(row.keys().next(), Some("site_number"));
    }
}
