//! # REopt Batch
//!
//! 批量提交 REopt 优化场景、轮询结果并整理成表格的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 客户端，只暴露 get / post 能力
//! - `ReqwestTransport` - 唯一的客户端 owner
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个场景
//! - `schema_flattener` - 输入定义的展开/还原
//! - `JobSubmitter` / `ResultPoller` - 提交任务、轮询结果
//! - `LoadProfileLoader` / `ResultStore` - 负荷曲线、结果保存
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个场景"的完整处理流程
//! - `ScenarioCtx` - 上下文封装（序号 + 描述）
//! - `ScenarioFlow` - 流程编排（unflatten → 负荷曲线 → submit → poll）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 应用入口，管理资源和命令
//! - `orchestrator/batch_orchestrator` - 按顺序处理全部场景
//!
//! 报表（`reports/`）只读取结果集合，不参与请求。
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod reports;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{HttpTransport, ReqwestTransport};
pub use models::{ApiVersion, FlatRow, InputSchema};
pub use orchestrator::{App, BatchOrchestrator, ResponseSet};
pub use workflow::{ScenarioCtx, ScenarioFlow};
