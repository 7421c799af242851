pub mod health;
pub mod write;
pub mod get;
pub mod query;

pub use health::health_handler;
pub use write::write_handler;
pub use get::get_handler;
pub use query::query_handler;
