//! HTTP 传输 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端，只暴露"发请求、拿到状态码和响应体"的能力

use crate::error::{AppError, AppResult};
use crate::utils::logging::{redact_api_key, truncate_text};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

/// 原始 HTTP 响应
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 便于测试：以 JSON 值构造 200 响应
    pub fn ok_json(body: &JsonValue) -> Self {
        Self::new(200, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// 截断后的响应体，用于日志和错误信息
    pub fn snippet(&self) -> String {
        truncate_text(&self.body, 500)
    }
}

/// HTTP 传输能力
///
/// 职责：
/// - 发送 GET / POST(JSON) 请求
/// - 不认识任务、状态、输入定义
/// - 非 2xx 不视为错误，交给调用方判断
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn get(&self, url: &str) -> AppResult<HttpReply>;

    async fn post_json(&self, url: &str, body: &JsonValue) -> AppResult<HttpReply>;
}

/// 基于 reqwest 的实现
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// 创建客户端
    ///
    /// 每个请求都会带上 `X-Api-Key` 请求头
    pub fn new(api_key: &str, timeout: Duration) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| AppError::Config(format!("API 密钥包含非法字符: {}", e)))?;
        headers.insert("X-Api-Key", key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self { client })
    }

    async fn read(url: &str, response: reqwest::Response) -> AppResult<HttpReply> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::transport(redact_api_key(url), e))?;
        debug!("HTTP {} <- {}", status, redact_api_key(url));
        Ok(HttpReply { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> AppResult<HttpReply> {
        debug!("GET {}", redact_api_key(url));
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::transport(redact_api_key(url), e))?;
        Self::read(url, response).await
    }

    async fn post_json(&self, url: &str, body: &JsonValue) -> AppResult<HttpReply> {
        debug!("POST {}", redact_api_key(url));
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::transport(redact_api_key(url), e))?;
        Self::read(url, response).await
    }
}
