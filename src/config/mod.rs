pub mod config_manager;

pub use config_manager::{AdapterConfig, HttpConfig};
