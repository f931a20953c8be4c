pub mod backup;
pub mod cli;
pub mod config;
pub mod domain;
pub mod host;
pub mod http;
pub mod ports;
pub mod storage;
pub mod store;
