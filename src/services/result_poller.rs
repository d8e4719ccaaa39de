//! 结果轮询服务 - 业务能力层
//!
//! 状态机：
//!
//! ```text
//! Pending ──状态为 "Optimizing..."──▶ 等待 interval ──▶ Pending
//!    │
//!    ├──其他任何状态──────────────▶ Done（原样返回文档）
//!    │
//!    └──状态字段缺失累计超过阈值──▶ Aborted（返回最后一次解析到的文档）
//! ```
//!
//! 缺失计数在整个轮询过程中累计，拿到状态也不会清零。
//! 没有总超时，也没有退避，只能由操作者中断进程。

use crate::error::AppResult;
use crate::infrastructure::HttpTransport;
use crate::models::{ApiVersion, IN_PROGRESS_STATUS};
use crate::utils::logging::{redact_api_key, truncate_text};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// 轮询状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// 任务仍在求解
    Pending,
    /// 拿到终止状态（成功或失败由调用方判断）
    Done,
    /// 状态字段缺失次数超过阈值
    Aborted,
}

/// 一次完整轮询的结果
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub state: PollState,
    /// `Done` 时为最终文档；`Aborted` 时为最后一次成功解析的文档（从未解析成功则为 `null`）
    pub document: JsonValue,
    /// 请求次数
    pub fetches: usize,
    /// 状态字段缺失次数
    pub missing_status: usize,
    /// 轮询的结果地址（已隐藏 api_key）
    pub url: String,
}

/// 结果轮询服务
pub struct ResultPoller<'a, T> {
    transport: &'a T,
    version: ApiVersion,
    interval: Duration,
    missing_threshold: usize,
}

impl<'a, T: HttpTransport> ResultPoller<'a, T> {
    pub fn new(
        transport: &'a T,
        version: ApiVersion,
        interval: Duration,
        missing_threshold: usize,
    ) -> Self {
        Self {
            transport,
            version,
            interval,
            missing_threshold,
        }
    }

    /// 轮询结果地址直到任务结束
    ///
    /// 只有网络请求本身失败才返回错误
    pub async fn poll(&self, url: &str) -> AppResult<PollOutcome> {
        let shown_url = redact_api_key(url);
        info!(
            "⏳ 轮询 {} 获取结果，间隔 {} 秒...",
            shown_url,
            self.interval.as_secs_f64()
        );

        let mut state = PollState::Pending;
        let mut status = JsonValue::from(IN_PROGRESS_STATUS);
        let mut document = JsonValue::Null;
        let mut fetches = 0;
        let mut missing_status = 0;

        while state == PollState::Pending {
            let reply = self.transport.get(url).await?;
            fetches += 1;

            let found = match reply.json() {
                Ok(parsed) => {
                    document = parsed;
                    match self.version.status(&document) {
                        Some(current) => {
                            status = current.clone();
                            true
                        }
                        None => false,
                    }
                }
                Err(e) => {
                    warn!(
                        "结果响应无法解析为 JSON (HTTP {}): {} | {}",
                        reply.status,
                        e,
                        reply.snippet()
                    );
                    false
                }
            };

            if !found {
                missing_status += 1;
                info!("状态字段缺失次数: {}", missing_status);
                if missing_status > self.missing_threshold {
                    warn!(
                        "⚠️ 状态字段缺失次数超过阈值 {}，停止轮询",
                        self.missing_threshold
                    );
                    state = PollState::Aborted;
                    continue;
                }
            }

            if status == IN_PROGRESS_STATUS {
                debug!("第 {} 次查询: 仍在求解", fetches);
                sleep(self.interval).await;
            } else {
                info!(
                    "✓ 任务结束，状态: {}",
                    truncate_text(&status_text(&status), 120)
                );
                state = PollState::Done;
            }
        }

        Ok(PollOutcome {
            state,
            document,
            fetches,
            missing_status,
            url: shown_url,
        })
    }
}

fn status_text(status: &JsonValue) -> String {
    match status {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
