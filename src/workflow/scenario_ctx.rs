//! 场景处理上下文
//!
//! 封装"我正在处理第几个场景"这一信息

use std::fmt::Display;

/// 场景处理上下文
///
/// 只用于日志前缀，不参与业务判断
#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    /// 场景序号（从1开始）
    pub row_number: usize,

    /// 场景总数
    pub total: usize,

    /// 场景描述
    pub description: String,
}

impl ScenarioCtx {
    pub fn new(row_number: usize, total: usize, description: impl Into<String>) -> Self {
        Self {
            row_number,
            total,
            description: description.into(),
        }
    }
}

impl Display for ScenarioCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[场景 {}/{} {}]",
            self.row_number, self.total, self.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_log_prefix() {
        let ctx = ScenarioCtx::new(2, 5, "office");
        assert_eq!(ctx.to_string(), "[场景 2/5 office]");
    }
}
