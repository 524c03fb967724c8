pub mod dedup;
pub mod multipart;
pub mod orchestrator;
pub mod parse;
pub mod template;

pub use orchestrator::{import_csv, ImportError, ImportReport, ImportSettings};
pub use parse::FileError;
