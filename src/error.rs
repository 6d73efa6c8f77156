use thiserror::Error;

/// Failure kinds reported by namespace operations.
///
/// Operations return [`crate::Result`], so callers that need to branch on the
/// kind recover it with `err.downcast_ref::<FsError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    /// A directory component does not exist (and creation was not requested),
    /// `..` was used at the root, or the path is otherwise unusable.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A create-style call got a path ending in a separator.
    #[error("no name specified: {0}")]
    NoNameSpecified(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} does not exist")]
    NotFound(String),

    /// A write handle was requested while another one is open on the file.
    #[error("{0} is already open for writing")]
    HandleConflict(String),

    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl FsError {
    /// Extracts the failure kind from an operation error, if it carries one.
    pub fn of(err: &anyhow::Error) -> Option<&FsError> {
        err.downcast_ref::<FsError>()
    }
}
