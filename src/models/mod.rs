pub mod flat_row;
pub mod loaders;
pub mod protocol;
pub mod schema;

pub use flat_row::{piped_key, FlatRow, PIPE};
pub use loaders::{load_scenarios_csv, parse_scenarios_csv, row_description, InputTable};
pub use protocol::{lookup, ApiEndpoints, ApiVersion, JobHandle, IN_PROGRESS_STATUS, JOB_ID_FIELD};
pub use schema::{InputSchema, SchemaNode, SchemaTree};
