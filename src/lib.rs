// src/lib.rs

pub mod bidding;
pub mod config;
pub mod error;
pub mod logging;
pub mod mock_endpoint;
pub mod model;
pub mod openrtb;

pub use bidding::ConversantAdapter;
pub use error::{AdapterError, Result};
