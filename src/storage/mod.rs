pub mod db;
pub mod error;
pub mod kv;
pub(crate) mod schema;
