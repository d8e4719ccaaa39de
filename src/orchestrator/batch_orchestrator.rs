//! 批量场景编排 - 编排层
//!
//! 按输入顺序逐个处理场景，一次只有一个请求在途。
//! 单个场景的失败只记录日志并占一个空位，不会中断整个批次。

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::HttpTransport;
use crate::models::{row_description, ApiEndpoints, FlatRow, InputSchema};
use crate::services::{PollOutcome, PollState, ResultStore};
use crate::utils::logging::log_row_start;
use crate::workflow::{ScenarioCtx, ScenarioFlow};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use tracing::{error, info, info_span, warn, Instrument};

/// 与输入行一一对应的结果，拿不到结果的场景为 `None`
pub type ResponseSet = Vec<Option<JsonValue>>;

/// 批次统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub success: usize,
    pub aborted: usize,
    pub failed: usize,
}

/// 批量场景编排器
pub struct BatchOrchestrator<'a, T> {
    flow: ScenarioFlow<'a, T>,
    store: Option<ResultStore>,
}

impl<'a, T: HttpTransport> BatchOrchestrator<'a, T> {
    pub fn new(transport: &'a T, endpoints: &'a ApiEndpoints, config: &Config) -> Self {
        Self {
            flow: ScenarioFlow::new(transport, endpoints, config),
            store: config
                .persist_results
                .then(|| ResultStore::new(config.outputs_dir.clone())),
        }
    }

    /// 处理全部场景
    ///
    /// # 返回
    /// 结果数量始终等于输入行数；没有结果的场景会删除上一次保存的同名结果。
    /// 只有读写结果文件失败才返回错误
    pub async fn run(
        &self,
        rows: &[FlatRow],
        schema: &InputSchema,
    ) -> AppResult<(ResponseSet, BatchStats)> {
        let total = rows.len();
        let mut responses = Vec::with_capacity(total);
        let mut stats = BatchStats::default();
        let mut seen = HashSet::new();

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            let ctx = ScenarioCtx::new(row_number, total, row_description(row, row_number));
            log_row_start(row_number, total, &ctx.description);
            if !seen.insert(ctx.description.clone()) {
                warn!("{} ⚠️ 场景描述重复，保存的结果会覆盖前面同名场景", ctx);
            }

            let span = info_span!("scenario", row = row_number);
            let result = self.flow.run(row, schema, &ctx).instrument(span).await;

            let document = match result {
                Ok(outcome) => self.accept(outcome, &ctx, &mut stats),
                Err(e) => {
                    error!("{} ❌ 处理失败: {}", ctx, e);
                    stats.failed += 1;
                    None
                }
            };

            if let Some(store) = &self.store {
                match &document {
                    Some(document) => {
                        store.save(&ctx.description, document).await?;
                    }
                    None => {
                        store.remove(&ctx.description).await?;
                    }
                }
            }
            responses.push(document);
        }

        Ok((responses, stats))
    }

    fn accept(
        &self,
        outcome: PollOutcome,
        ctx: &ScenarioCtx,
        stats: &mut BatchStats,
    ) -> Option<JsonValue> {
        if outcome.state != PollState::Aborted {
            info!("{} ✅ 场景完成", ctx);
            stats.success += 1;
            return Some(outcome.document);
        }

        let err = AppError::PollingAborted {
            url: outcome.url,
            missing: outcome.missing_status,
        };
        warn!("{} ⚠️ {}，保留最后一次响应", ctx, err);
        stats.aborted += 1;
        (!outcome.document.is_null()).then_some(outcome.document)
    }
}
