pub mod credential_resolver;
pub mod request;
pub mod response;
pub mod service;
