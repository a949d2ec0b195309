//! Native storage: filesystem content store, SQLite-backed history and platform links.

pub mod sqlite;
pub mod local_fs;
pub mod history_db;
pub mod platform_db;

pub use history_db::SqliteHistory;
pub use local_fs::LocalFsStore;
pub use platform_db::SqlitePlatforms;
pub use sqlite::SqliteDb;
