use crate::vfs::{
    ConflictPolicy, Directory, File, FindOptions, FindResult, ReadHandle, WriteHandle, WriteMode,
};

/// Operations of a hierarchical namespace addressed by `/`-separated paths.
///
/// Paths starting with `/` are absolute; all others are resolved against the
/// current directory. `.` is a no-op segment and `..` the parent; going above
/// the root fails rather than clamping.
///
/// Failures carry an [`crate::FsError`] kind.
pub trait FsBackend {
    fn current_path(&self) -> String;
    fn changedir(&mut self, path: &str) -> Result<()>;
    fn list_folders(&self) -> Vec<String>;
    fn list_files(&self) -> Vec<String>;

    fn exists(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;
    fn is_file(&self, path: &str) -> bool;

    fn mkdir(&mut self, path: &str, create_parents: bool) -> Result<Directory>;
    fn mkfile(&mut self, path: &str, create_parents: bool) -> Result<File>;
    fn remove_dir(&mut self, path: &str) -> Result<Directory>;
    fn remove_file(&mut self, path: &str) -> Result<File>;

    fn open_read_handle(&self, path: &str) -> Result<ReadHandle>;
    fn open_write_handle(&self, path: &str) -> Result<WriteHandle>;
    fn read_file(&self, path: &str) -> Result<String>;
    fn write_file(&mut self, path: &str, content: &str, mode: WriteMode) -> Result<()>;

    fn move_file(
        &mut self,
        source: &str,
        dest: &str,
        policy: ConflictPolicy,
        create_parents: bool,
    ) -> Result<()>;
    fn copy_file(
        &mut self,
        source: &str,
        dest: &str,
        policy: ConflictPolicy,
        create_parents: bool,
    ) -> Result<()>;
    fn move_dir(
        &mut self,
        source: &str,
        dest: &str,
        policy: ConflictPolicy,
        create_parents: bool,
    ) -> Result<()>;
    fn copy_dir(
        &mut self,
        source: &str,
        dest: &str,
        policy: ConflictPolicy,
        create_parents: bool,
    ) -> Result<()>;

    fn find(&self, pattern: &str, path: &str, options: FindOptions) -> Result<FindResult>;
}

pub type Result<T> = std::result::Result<T, anyhow::Error>;
