pub mod file_names;
pub mod logging;

pub use file_names::file_stem;
pub use logging::{redact_api_key, truncate_text};
