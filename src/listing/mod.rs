//! On-demand HTML directory listings over a delimited object-store view.

mod entry;
mod enumerate;
mod render;
mod template;

pub use entry::{Entry, pretty_size};
pub use enumerate::{list_dir, normalize_prefix};
pub use render::{OUTPUT_FILE_NAME, RenderedListing, render_listing};
