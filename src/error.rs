use thiserror::Error;

/// 应用程序错误类型
///
/// 单行（单个场景）内的错误由编排层捕获并记录，不会中断整个批次；
/// 只有 `SchemaFetchFailed` 和输出文件的 I/O 错误会终止运行。
#[derive(Debug, Error)]
pub enum AppError {
    /// 提交接口返回非 2xx 状态码
    #[error("任务提交失败 ({url}): HTTP {status}, 响应: {body}")]
    SubmissionFailed {
        url: String,
        status: u16,
        body: String,
    },

    /// 提交成功但响应中没有任务 ID
    #[error("响应格式异常 ({url}): 缺少字段 {field}, 响应: {body}")]
    MalformedResponse {
        url: String,
        field: &'static str,
        body: String,
    },

    /// 轮询期间状态字段缺失次数超过阈值
    #[error("轮询中止 ({url}): 状态字段缺失 {missing} 次")]
    PollingAborted { url: String, missing: usize },

    /// 获取输入定义（help 接口）失败，整个批次无法继续
    #[error("获取输入定义失败 ({url}): {reason}")]
    SchemaFetchFailed { url: String, reason: String },

    /// 网络请求失败
    #[error("HTTP 请求失败 ({url}): {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 负荷曲线采样点数量不合法
    #[error("负荷曲线 {path} 包含 {len} 个采样点，应为 8760、17520 或 35040")]
    InvalidLoadProfile { path: String, len: usize },

    /// 负荷曲线中存在无法解析的数值
    #[error("负荷曲线 {path} 第 {line} 行无法解析为数值: {value}")]
    LoadProfileValue {
        path: String,
        line: usize,
        value: String,
    },

    /// 文件读写失败
    #[error("文件操作失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV 读写失败
    #[error("CSV处理失败: {0}")]
    Csv(#[from] csv::Error),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读写错误
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// 创建网络请求错误
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Transport {
            url: url.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_failed_message_keeps_status_and_body() {
        let err = AppError::SubmissionFailed {
            url: "https://api/job/".to_string(),
            status: 400,
            body: "bad input".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("bad input"));
    }

    #[test]
    fn io_error_carries_path() {
        let err = AppError::io("outputs/site1.json", std::io::Error::other("disk full"));
        assert!(err.to_string().contains("outputs/site1.json"));
    }
}
