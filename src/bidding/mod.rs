pub mod adapter;
pub mod endpoint_client;
pub mod imp_map;
pub mod merger;
pub mod reconciler;

pub use adapter::{ConversantAdapter, UsersyncInfo, ADAPTER_NAME, FAMILY_NAME};
