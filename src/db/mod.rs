pub mod buyers;
pub mod connection;
pub mod history;
pub mod store;
pub mod users;

pub use connection::{init_db, Database};
pub use store::{BuyerStore, SqliteStorage, Storage, StoreError, TxOptions};
