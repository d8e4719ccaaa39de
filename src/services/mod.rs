//! 业务能力层（Services）
//!
//! 每个服务只描述一种能力，不持有 HTTP 客户端，也不关心批次和统计：
//!
//! - `schema_client` - 获取输入定义
//! - `schema_flattener` - 输入定义与单行输入之间的展开/还原
//! - `load_profile` - 把自定义负荷曲线写入请求
//! - `job_submitter` - 提交任务
//! - `result_poller` - 轮询任务结果
//! - `result_store` - 保存/读取原始结果

pub mod job_submitter;
pub mod load_profile;
pub mod result_poller;
pub mod result_store;
pub mod schema_client;
pub mod schema_flattener;

pub use job_submitter::JobSubmitter;
pub use load_profile::{read_load_profile, LoadProfileLoader, LOAD_FILE_COLUMN};
pub use result_poller::{PollOutcome, PollState, ResultPoller};
pub use result_store::ResultStore;
pub use schema_client::fetch_schema;
pub use schema_flattener::{flatten, unflatten};
