//! REopt 协议版本
//!
//! 旧版（v1/v2）和新版（v3/stable）接口在结果 URL、状态字段位置和文档布局上不同。
//! 版本在批次开始时选定一次，之后所有组件只通过 [`ApiVersion`] 查询差异。

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

/// 任务仍在运行时的状态值
pub const IN_PROGRESS_STATUS: &str = "Optimizing...";

/// 提交响应中的任务 ID 字段
pub const JOB_ID_FIELD: &str = "run_uuid";

/// 协议版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// v1 / v2：状态位于 `outputs.Scenario.status`
    Legacy,
    /// v3 / stable：状态位于顶层 `status`
    Current,
}

impl ApiVersion {
    /// 根据 API 根地址推断版本
    pub fn detect(api_root: &str) -> Self {
        if api_root.contains("stable") || api_root.contains("v3") {
            ApiVersion::Current
        } else {
            ApiVersion::Legacy
        }
    }

    pub fn status_path(self) -> &'static [&'static str] {
        match self {
            ApiVersion::Legacy => &["outputs", "Scenario", "status"],
            ApiVersion::Current => &["status"],
        }
    }

    /// 从结果文档中取出状态字段
    pub fn status(self, document: &Value) -> Option<&Value> {
        lookup(document, self.status_path())
    }

    /// 自定义负荷曲线在请求文档中的位置
    pub fn load_profile_path(self) -> &'static [&'static str] {
        match self {
            ApiVersion::Legacy => &["Scenario", "Site", "LoadProfile", "loads_kw"],
            ApiVersion::Current => &["ElectricLoad", "loads_kw"],
        }
    }

    /// 负荷参数所属的类别
    pub fn load_category(self) -> &'static str {
        match self {
            ApiVersion::Legacy => "LoadProfile",
            ApiVersion::Current => "ElectricLoad",
        }
    }

    /// 各类别输出所在的节点
    pub fn output_root(self) -> &'static [&'static str] {
        match self {
            ApiVersion::Legacy => &["outputs", "Scenario", "Site"],
            ApiVersion::Current => &["outputs"],
        }
    }

    /// 各类别输入所在的节点
    pub fn input_root(self) -> &'static [&'static str] {
        match self {
            ApiVersion::Legacy => &["inputs", "Scenario", "Site"],
            ApiVersion::Current => &["inputs"],
        }
    }

    /// 场景级与站点级标量输入所在的节点
    pub fn scenario_input_roots(self) -> [&'static [&'static str]; 2] {
        match self {
            ApiVersion::Legacy => [&["inputs", "Scenario"], &["inputs", "Scenario", "Site"]],
            ApiVersion::Current => [&["inputs"], &["inputs", "Site"]],
        }
    }

    /// 错误信息所在的节点
    pub fn error_message_path(self) -> &'static [&'static str] {
        match self {
            ApiVersion::Legacy => &["messages", "error"],
            ApiVersion::Current => &["messages", "errors"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ApiVersion::Legacy => "legacy",
            ApiVersion::Current => "current",
        }
    }
}

impl FromStr for ApiVersion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "v1" | "v2" => Ok(ApiVersion::Legacy),
            "current" | "v3" | "stable" => Ok(ApiVersion::Current),
            other => Err(AppError::Config(format!("未知的协议版本: {}", other))),
        }
    }
}

impl Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 提交接口返回的任务 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 远程服务的三个接口地址
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    root: String,
    api_key: String,
    version: ApiVersion,
}

impl ApiEndpoints {
    pub fn new(root: &str, api_key: &str, version: ApiVersion) -> Self {
        Self {
            root: root.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            version,
        }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `POST {root}/job/?api_key=KEY`
    pub fn submit_url(&self) -> String {
        format!("{}/job/?api_key={}", self.root, self.api_key)
    }

    /// 旧版带 `api_key` 查询参数，新版不带
    pub fn results_url(&self, job: &JobHandle) -> String {
        match self.version {
            ApiVersion::Legacy => format!(
                "{}/job/{}/results/?api_key={}",
                self.root, job, self.api_key
            ),
            ApiVersion::Current => format!("{}/job/{}/results", self.root, job),
        }
    }

    /// `GET {root}/help?api_key=KEY`
    pub fn help_url(&self) -> String {
        format!("{}/help?api_key={}", self.root, self.api_key)
    }
}

/// 沿着对象键路径查找节点
pub fn lookup<'a>(document: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(document, |node, key| node.as_object()?.get(*key))
}
