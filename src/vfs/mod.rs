mod entry;
mod handle;
mod node;
mod options;
mod tree_fs;
pub mod walk;

pub use entry::{Entry, EntryType};
pub use handle::{CursorState, Handle, ReadHandle, WriteHandle};
pub use node::{Directory, File, Recursion};
pub use options::{ConflictPolicy, FindOptions, FindResult, MatchAnchor, WriteMode};
pub use tree_fs::TreeFS;
