pub mod api_client;
pub mod config_store;
