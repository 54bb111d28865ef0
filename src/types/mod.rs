pub mod error;
mod models;

pub use models::{ListDirPage, ObjectMetadata, ObjectSummary};
