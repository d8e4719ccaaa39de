pub mod csv_loader;

pub use csv_loader::{load_scenarios_csv, parse_scenarios_csv, row_description, InputTable};
