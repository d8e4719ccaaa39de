//! 输入定义展开/还原服务 - 业务能力层
//!
//! - `flatten`：输入定义 → 一行默认值（用于生成输入模板）
//! - `unflatten`：一行用户输入 + 输入定义 → 可提交的请求文档
//!
//! 列名规则：
//! - 顶层参数，以及旧版外层 `Scenario` 下的参数使用裸参数名
//! - 其余参数（包括新版的顶层类别 `PV`、`Site` 等）使用 `直接所属类别|参数名`

use crate::models::{piped_key, FlatRow, InputSchema, SchemaNode, SchemaTree};
use phf::phf_set;
use serde_json::{Map, Value};
use tracing::debug;

/// 默认值随上下文变化的参数，从不自动填入默认值
///
/// `tilt` 的默认值是站点纬度，由远程服务自行计算
static CONTEXT_DEPENDENT_DEFAULTS: phf::Set<&'static str> = phf_set! {
    "tilt",
};

/// 旧版输入定义的外层类别，其下参数不加类别前缀
const SCENARIO_WRAPPER: &str = "Scenario";

/// 当前遍历位置
#[derive(Debug, Clone, Copy)]
struct Scope<'a> {
    category: Option<&'a str>,
    /// 位于旧版外层 `Scenario` 下
    wrapper: bool,
}

const TOP: Scope<'static> = Scope {
    category: None,
    wrapper: false,
};

impl<'a> Scope<'a> {
    fn child(self, name: &'a str) -> Scope<'a> {
        Scope {
            category: Some(name),
            wrapper: self.category.is_none() && name == SCENARIO_WRAPPER,
        }
    }

    /// 展开时使用的列名
    fn column(self, parameter: &str) -> String {
        match self.category {
            Some(category) if !self.wrapper => piped_key(category, parameter),
            _ => parameter.to_string(),
        }
    }

    /// 还原时第二优先的列名
    fn piped(self, parameter: &str) -> Option<String> {
        self.category.map(|category| piped_key(category, parameter))
    }
}

/// 展开输入定义，得到每个参数的默认值
///
/// 每一层按键名排序深度优先遍历，列顺序稳定。
/// 没有默认值的参数和 `tilt` 记录为空。
pub fn flatten(schema: &InputSchema) -> FlatRow {
    let mut row = FlatRow::new();
    flatten_tree(schema.root(), TOP, &mut row);
    row
}

fn flatten_tree(tree: &SchemaTree, scope: Scope<'_>, row: &mut FlatRow) {
    for (key, node) in tree {
        match node {
            SchemaNode::Leaf { default } => {
                row.set(scope.column(key), schema_default(key, default));
            }
            SchemaNode::Category(children) => flatten_tree(children, scope.child(key), row),
            SchemaNode::Opaque(_) => {}
        }
    }
}

/// 用一行输入填充输入定义，生成请求文档
///
/// 每个参数先找裸参数名列，再找 `类别|参数` 列；找到的列非空则使用该值，
/// 为空或两列都不存在时使用默认值，没有默认值（以及 `tilt`）则省略该键，
/// 交给远程服务决定。
///
/// 输入定义本身不会被修改，每次调用都生成一份新文档。
pub fn unflatten(row: &FlatRow, schema: &InputSchema) -> Value {
    Value::Object(build_object(schema.root(), TOP, row))
}

fn build_object(tree: &SchemaTree, scope: Scope<'_>, row: &FlatRow) -> Map<String, Value> {
    let mut object = Map::new();
    for (key, node) in tree {
        match node {
            SchemaNode::Leaf { default } => {
                if let Some(value) = leaf_value(key, default, scope, row) {
                    object.insert(key.clone(), value);
                }
            }
            SchemaNode::Category(children) => {
                let child = build_object(children, scope.child(key), row);
                object.insert(key.clone(), Value::Object(child));
            }
            SchemaNode::Opaque(value) => {
                object.insert(key.clone(), value.clone());
            }
        }
    }
    object
}

fn leaf_value(key: &str, default: &Option<Value>, scope: Scope<'_>, row: &FlatRow) -> Option<Value> {
    // 以列是否存在决定使用哪一列，不因单元格为空而回退到另一列
    let column = if row.contains(key) {
        Some(key.to_string())
    } else {
        scope.piped(key).filter(|piped| row.contains(piped))
    };

    match column.as_deref().and_then(|c| row.value(c)) {
        Some(value) => Some(value.clone()),
        None => {
            let fallback = schema_default(key, default);
            if fallback.is_none() {
                debug!("参数 {} 没有默认值，交给远程服务决定", scope.column(key));
            }
            fallback
        }
    }
}

fn schema_default(key: &str, default: &Option<Value>) -> Option<Value> {
    if CONTEXT_DEPENDENT_DEFAULTS.contains(key) {
        None
    } else {
        default.clone()
    }
}
