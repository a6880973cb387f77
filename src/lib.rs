pub mod ai;
pub mod composer;
pub mod config;
pub mod engagement;
pub mod error;
pub mod events;
pub mod facade;
pub mod feed;
pub mod messages;
pub mod models;
pub mod openapi;
pub mod repo;
pub mod routes;
pub mod session;
pub mod store;

// Re-export commonly used items for tests / external users
pub use routes::{config, AppState};
pub use facade::StorageService;
pub use session::SessionStore;
