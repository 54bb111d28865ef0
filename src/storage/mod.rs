mod backend;
mod in_memory;
mod s3;

pub use backend::{ObjectStore, ObjectStream};
pub use in_memory::InMemoryStore;
pub use s3::S3Backend;
