//! 场景处理流程 - 流程层
//!
//! 核心职责：定义"一个场景"的完整处理流程
//!
//! 流程顺序：
//! 1. 输入行 + 输入定义 → 请求文档
//! 2. 写入自定义负荷曲线（如果有）
//! 3. 提交任务
//! 4. 轮询结果

use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::HttpTransport;
use crate::models::{ApiEndpoints, FlatRow, InputSchema};
use crate::services::{unflatten, JobSubmitter, LoadProfileLoader, PollOutcome, ResultPoller};
use crate::workflow::scenario_ctx::ScenarioCtx;

/// 场景处理流程
///
/// - 不持有 HTTP 客户端，只借用传输层
/// - 只依赖业务能力（services）
/// - 出错直接返回，由编排层决定如何记录
pub struct ScenarioFlow<'a, T> {
    endpoints: &'a ApiEndpoints,
    submitter: JobSubmitter<'a, T>,
    poller: ResultPoller<'a, T>,
    load_profiles: LoadProfileLoader,
}

impl<'a, T: HttpTransport> ScenarioFlow<'a, T> {
    /// 创建新的场景处理流程
    pub fn new(transport: &'a T, endpoints: &'a ApiEndpoints, config: &Config) -> Self {
        let version = endpoints.version();
        Self {
            endpoints,
            submitter: JobSubmitter::new(transport, endpoints),
            poller: ResultPoller::new(
                transport,
                version,
                config.poll_interval(),
                config.missing_status_threshold,
            ),
            load_profiles: LoadProfileLoader::new(config.load_profiles_dir.clone(), version),
        }
    }

    pub async fn run(
        &self,
        row: &FlatRow,
        schema: &InputSchema,
        ctx: &ScenarioCtx,
    ) -> AppResult<PollOutcome> {
        // 每行都从输入定义重新生成一份请求
        let mut request = unflatten(row, schema);

        if self
            .load_profiles
            .add_load_profile_inputs(row, &mut request)
            .await?
        {
            info!("{} 📈 已写入自定义负荷曲线", ctx);
        }

        info!("{} 📤 正在提交任务...", ctx);
        let job = self.submitter.submit(&request).await?;
        info!("{} ✓ 任务已创建: {}", ctx, job);

        let results_url = self.endpoints.results_url(&job);
        let outcome = self.poller.poll(&results_url).await?;
        info!("{} 共查询 {} 次: {}", ctx, outcome.fetches, outcome.url);

        Ok(outcome)
    }
}
