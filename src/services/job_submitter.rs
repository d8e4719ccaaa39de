//! 任务提交服务 - 业务能力层
//!
//! 只负责"提交一个请求文档、拿到任务 ID"，不重试

use crate::error::{AppError, AppResult};
use crate::infrastructure::HttpTransport;
use crate::models::{ApiEndpoints, JobHandle, JOB_ID_FIELD};
use crate::utils::logging::redact_api_key;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

/// 任务提交服务
pub struct JobSubmitter<'a, T> {
    transport: &'a T,
    endpoints: &'a ApiEndpoints,
}

impl<'a, T: HttpTransport> JobSubmitter<'a, T> {
    pub fn new(transport: &'a T, endpoints: &'a ApiEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// 提交请求文档
    ///
    /// # 返回
    /// - 非 2xx：`SubmissionFailed`，带状态码和响应体
    /// - 2xx 但没有 `run_uuid`：`MalformedResponse`
    pub async fn submit(&self, request: &JsonValue) -> AppResult<JobHandle> {
        let url = self.endpoints.submit_url();
        let shown_url = redact_api_key(&url);

        let reply = self.transport.post_json(&url, request).await?;

        if !reply.is_success() {
            return Err(AppError::SubmissionFailed {
                url: shown_url,
                status: reply.status,
                body: reply.snippet(),
            });
        }

        info!("✓ 提交成功: {}", shown_url);

        let run_uuid = reply
            .json()
            .ok()
            .as_ref()
            .and_then(|body| body.get(JOB_ID_FIELD))
            .and_then(JsonValue::as_str)
            .map(JobHandle::new);

        match run_uuid {
            Some(job) => {
                debug!("任务 ID: {}", job);
                Ok(job)
            }
            None => Err(AppError::MalformedResponse {
                url: shown_url,
                field: JOB_ID_FIELD,
                body: reply.snippet(),
            }),
        }
    }
}
