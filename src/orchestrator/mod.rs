//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用入口
//! - 管理应用生命周期，持有 HTTP 客户端
//! - 调度 run / render / template 三条命令
//! - 输出全局统计信息
//!
//! ### `batch_orchestrator` - 场景批次
//! - 按顺序遍历所有场景（`Vec<FlatRow>`）
//! - 创建并复用 `ScenarioFlow`
//! - 单个场景失败时记录日志并留空位
//! - 保存每个场景的原始结果
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (命令)
//!     ↓
//! batch_orchestrator (处理 Vec<FlatRow>)
//!     ↓
//! workflow::ScenarioFlow (处理单个场景)
//!     ↓
//! services (能力层：flatten / submit / poll / store)
//!     ↓
//! infrastructure (基础设施：HttpTransport)
//! ```

pub mod batch_orchestrator;
pub mod batch_processor;

pub use batch_orchestrator::{BatchOrchestrator, BatchStats, ResponseSet};
pub use batch_processor::App;
