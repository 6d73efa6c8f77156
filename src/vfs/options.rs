//! Options accepted by namespace operations.

/// What a move or copy does when the destination name is already taken.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Replace the existing entry.
    #[default]
    Override,
    /// Keep a copy of the existing entry as `~<name>`, then replace it.
    Backup,
    /// Fail and leave both source and destination untouched.
    NoOverride,
}

impl ConflictPolicy {
    pub const BACKUP_PREFIX: &'static str = "~";

    pub fn backup_name(name: &str) -> String {
        format!("{}{name}", Self::BACKUP_PREFIX)
    }
}

/// How [`crate::FsBackend::write_file`] combines new text with existing content.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    Overwrite,
    /// Append on a new line.
    AppendLine,
    /// Append directly, without a separator.
    Concat,
}

/// How much of a name a `find` pattern must match.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum MatchAnchor {
    /// The pattern must match at the start of the name; the rest of the name
    /// is free (`a` matches `abc`).
    #[default]
    Prefix,
    /// The pattern must match the whole name.
    Full,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Search the whole subtree instead of direct children only.
    pub recursive: bool,
    pub anchor: MatchAnchor,
}

impl FindOptions {
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            ..Self::default()
        }
    }

    pub fn with_anchor(mut self, anchor: MatchAnchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// Full paths of the entries matched by `find`, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindResult {
    pub files: Vec<String>,
    pub folders: Vec<String>,
}
