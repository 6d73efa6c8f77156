//! An in-memory, non-persistent hierarchical namespace for Rust.
//! Directories and files are addressed by POSIX-like paths and support
//! create, remove, move, copy and search operations, plus cursor-based
//! reading and writing of file content. Ideal for testing path semantics or
//! teaching filesystem concepts without touching the disk.
//!
//! ### Overview
//!
//! The [`FsBackend`] trait describes the namespace operations and [`TreeFS`]
//! implements them over an owned tree of [`Directory`] and [`File`] nodes.
//!
//! **Key ideas**:
//! - **Tree ownership**: parents own their children; upward links are weak, so
//!   detaching a node drops its whole subtree.
//! - **Strict paths**: `..` above the root fails instead of clamping, and a
//!   failed operation leaves the tree as it was.
//! - **Handles**: any number of independent readers, one exclusive writer.
//! - **Conflict policies**: moves and copies can override, back up or refuse
//!   to replace an existing destination.
//!
//! ### Example
//!
//! ```
//! use tree_vfs::{FsBackend, TreeFS, WriteMode};
//!
//! let mut fs = TreeFS::new();
//! fs.mkfile("/docs/note.txt", true).unwrap();
//! fs.write_file("/docs/note.txt", "Hello", WriteMode::Overwrite).unwrap();
//! fs.changedir("docs").unwrap();
//! assert_eq!(fs.read_file("note.txt").unwrap(), "Hello");
//! ```

mod core;
mod error;
pub mod path;
mod vfs;

pub use crate::core::{FsBackend, Result};
pub use error::FsError;
pub use vfs::walk;
pub use vfs::{
    ConflictPolicy, CursorState, Directory, Entry, EntryType, File, FindOptions, FindResult,
    Handle, MatchAnchor, ReadHandle, Recursion, TreeFS, WriteHandle, WriteMode,
};
