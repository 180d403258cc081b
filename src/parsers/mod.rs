pub mod browser;
pub mod dialect;
pub mod labels;
pub mod sqlite_db;
pub mod time;
