// Library exports for integration tests
pub mod app_state;
pub mod config;
pub mod handlers;
pub mod listing;
pub mod server;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use app_state::AppState;
pub use config::{BackendConfig, Config};
pub use storage::{InMemoryStore, ObjectStore, S3Backend};

// Re-export server creation function
pub use server::create_app;
