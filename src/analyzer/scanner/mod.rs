pub mod walker;

pub use walker::{IgnoreWalker, relative_parent, relative_path};
