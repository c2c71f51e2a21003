pub mod backend;
pub mod client;
pub mod endpoints;
pub mod models;
pub mod retry;

pub use backend::CharityBackend;
pub use client::BackendClient;
pub use retry::Retrying;
