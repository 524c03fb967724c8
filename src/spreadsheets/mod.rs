pub mod export_csv;
pub mod export_xlsx;

pub use export_csv::{export_buyers_csv, export_file_name};
pub use export_xlsx::export_buyers_xlsx;
