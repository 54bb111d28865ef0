mod index;

pub use index::serve_path;
