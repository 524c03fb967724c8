pub mod home;
pub mod import;

pub use home::home_page;
pub use import::{import_errors_page, import_page, import_result_page};
