//! 批量场景处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责三条命令的调度和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：输出启动信息、创建 HTTP 客户端
//! 2. **run**：加载场景 → 获取输入定义 → 逐个提交并轮询 → 生成报表
//! 3. **render**：读取已保存的结果，重新生成报表
//! 4. **template**：由输入定义生成输入模板
//! 5. **全局统计**：汇总所有场景的处理结果
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 HTTP 客户端的模块
//! - **向下委托**：单个场景交给 `BatchOrchestrator` 和 `ScenarioFlow`

use crate::config::Config;
use crate::infrastructure::ReqwestTransport;
use crate::models::{load_scenarios_csv, ApiEndpoints, InputTable};
use crate::orchestrator::batch_orchestrator::{BatchOrchestrator, ResponseSet};
use crate::reports;
use crate::services::{fetch_schema, ResultStore};
use crate::utils::logging::{log_rows_loaded, log_startup, print_final_stats};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    endpoints: ApiEndpoints,
    transport: ReqwestTransport,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let transport = ReqwestTransport::new(&config.api_key, config.http_timeout())
            .context("无法创建 HTTP 客户端")?;
        let endpoints = config.endpoints();

        Ok(Self {
            config,
            endpoints,
            transport,
        })
    }

    /// 提交全部场景并生成报表
    pub async fn run(&self) -> Result<()> {
        let inputs = self.load_inputs().await?;

        if inputs.is_empty() {
            warn!("⚠️ 没有找到待处理的场景，程序结束");
            return Ok(());
        }

        log_rows_loaded(inputs.len());

        let (schema, _) = fetch_schema(&self.transport, &self.endpoints)
            .await
            .context("无法获取输入定义，批次终止")?;

        let orchestrator = BatchOrchestrator::new(&self.transport, &self.endpoints, &self.config);
        let (responses, stats) = orchestrator
            .run(&inputs.rows, &schema)
            .await
            .context("保存结果失败，批次终止")?;

        self.write_reports(&inputs, &responses).await?;

        print_final_stats(stats.success, stats.failed, stats.aborted, &self.config.log_file);
        Ok(())
    }

    /// 用已保存的结果重新生成报表
    pub async fn render(&self) -> Result<()> {
        let inputs = self.load_inputs().await?;
        let store = ResultStore::new(self.config.outputs_dir.clone());

        let mut responses = ResponseSet::with_capacity(inputs.len());
        for description in inputs.descriptions() {
            let response = store
                .load(&description)
                .await
                .with_context(|| format!("无法读取场景 {} 的结果", description))?;
            if response.is_none() {
                warn!("⚠️ 场景 {} 没有已保存的结果", description);
            }
            responses.push(response);
        }

        let found = responses.iter().filter(|r| r.is_some()).count();
        info!("✓ 读取到 {}/{} 个场景的结果", found, responses.len());

        self.write_reports(&inputs, &responses).await
    }

    /// 生成输入模板
    pub async fn template(&self) -> Result<()> {
        let (schema, _) = fetch_schema(&self.transport, &self.endpoints)
            .await
            .context("无法获取输入定义")?;

        reports::write_input_template(
            &self.config.input_template,
            &schema,
            self.endpoints.version(),
        )
        .await
        .with_context(|| format!("无法写入输入模板: {}", self.config.input_template.display()))?;
        Ok(())
    }

    /// 加载场景
    async fn load_inputs(&self) -> Result<InputTable> {
        info!("\n📁 正在读取场景输入: {}", self.config.inputs_csv.display());
        load_scenarios_csv(&self.config.inputs_csv, self.config.n_sites)
            .await
            .context("无法读取场景输入")
    }

    /// 生成汇总表和分类别表
    async fn write_reports(
        &self,
        inputs: &InputTable,
        responses: &[Option<serde_json::Value>],
    ) -> Result<()> {
        let version = self.endpoints.version();

        if self.config.output_template.exists() {
            reports::write_summary_csv(
                &self.config.output_template,
                &self.config.summary_csv,
                inputs,
                self.config.n_custom_columns,
                responses,
                version,
            )
            .await
            .context("无法写入汇总表")?;
        } else {
            warn!(
                "⚠️ 汇总模板不存在，跳过汇总表: {}",
                self.config.output_template.display()
            );
        }

        reports::write_category_sheets(
            &self.config.sheets_dir,
            responses,
            &inputs.descriptions(),
            version,
        )
        .await
        .context("无法写入分类别表")?;

        Ok(())
    }
}
