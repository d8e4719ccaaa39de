//! 输入定义（help 接口返回的嵌套文档）的类型化表示
//!
//! 原始文档靠键名首字母大小写区分"类别"和"参数"：
//! - 大写开头、值为对象且含有对象子项 → 类别（如 `Site`、`PV`）
//! - 小写开头、值为对象 → 参数定义，可能带有 `default`
//!
//! 这里在解析时一次性完成判断，之后的展开/还原只需匹配 [`SchemaNode`]。

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 键按字典序排列，保证展开后的列顺序稳定
pub type SchemaTree = BTreeMap<String, SchemaNode>;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// 子类别
    Category(SchemaTree),
    /// 参数定义
    Leaf { default: Option<Value> },
    /// 既不是参数也不是类别的值，原样保留到请求中
    Opaque(Value),
}

/// 完整的输入定义
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputSchema {
    root: SchemaTree,
}

impl InputSchema {
    /// 从 help 接口的 JSON 构建
    ///
    /// 顶层不是对象时得到空定义
    pub fn from_value(document: &Value) -> Self {
        let root = document.as_object().map(parse_tree).unwrap_or_default();
        Self { root }
    }

    pub fn root(&self) -> &SchemaTree {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

fn parse_tree(map: &Map<String, Value>) -> SchemaTree {
    map.iter()
        .map(|(key, value)| (key.clone(), classify(key, value)))
        .collect()
}

fn classify(key: &str, value: &Value) -> SchemaNode {
    match value.as_object() {
        Some(descriptor) if starts_lowercase(key) => SchemaNode::Leaf {
            default: descriptor.get("default").cloned(),
        },
        Some(children) if children.values().any(Value::is_object) => {
            SchemaNode::Category(parse_tree(children))
        }
        _ => SchemaNode::Opaque(value.clone()),
    }
}

fn starts_lowercase(key: &str) -> bool {
    key.chars().next().is_some_and(char::is_lowercase)
}
