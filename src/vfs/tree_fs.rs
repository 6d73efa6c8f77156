//! This module provides the namespace operations over an in-memory tree of
//! directories and files.

use regex::Regex;
use tracing::debug;

use crate::core::{FsBackend, Result};
use crate::error::FsError;
use crate::path::{self, CURRENT_DIR, NamedPath, PARENT_DIR};
use crate::vfs::walk::{self, Probe};
use crate::vfs::{
    ConflictPolicy, Directory, Entry, File, FindOptions, FindResult, MatchAnchor, ReadHandle,
    WriteHandle, WriteMode,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Transfer {
    Move,
    Copy,
}

/// A virtual file system that keeps a tree of directories and files in memory.
///
/// ### Internal state
///
/// * `root` — The root directory, path `/`. It owns the whole tree: every
///   reachable node hangs from it through owned child links.
/// * `cwd` — Current Working Directory. Relative paths are resolved against it.
///   Starts at the root and changes through `changedir()`.
///
/// ### Invariants
///
/// 1. **Single parent**: every node except the root is linked under exactly one
///    directory; the tree has no cycles.
/// 2. **Unique names**: within one directory, subfolder names are unique and
///    file names are unique. A file and a subfolder may share a name.
/// 3. **Live paths**: paths are derived from the parent chain when asked for,
///    so they stay correct after a node is moved.
/// 4. **Reachable cwd**: `cwd` is always part of the tree. Removing or
///    replacing a subtree that contains it moves `cwd` to the directory the
///    subtree was detached from.
///
/// ### Thread Safety
///
/// Nodes are shared through `Rc`, so `TreeFS` is neither `Send` nor `Sync`.
/// Several independent instances may coexist.
///
/// ### Example
///
/// ```
/// use tree_vfs::{ConflictPolicy, FsBackend, TreeFS};
///
/// let mut fs = TreeFS::new();
/// fs.mkfile("/docs/note.txt", true).unwrap();
/// fs.move_file("/docs/note.txt", "/", ConflictPolicy::Override, false).unwrap();
///
/// assert!(fs.is_file("/note.txt"));
/// assert!(!fs.is_file("/docs/note.txt"));
/// ```
pub struct TreeFS {
    root: Directory,
    cwd: Directory,
}

impl TreeFS {
    /// Creates an empty namespace. The current directory is the root.
    pub fn new() -> Self {
        let root = Directory::root();
        Self {
            cwd: root.clone(),
            root,
        }
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    pub fn current_dir(&self) -> &Directory {
        &self.cwd
    }

    fn start_dir(&self, is_absolute: bool) -> &Directory {
        if is_absolute { &self.root } else { &self.cwd }
    }

    /// Resolves a path whose segments are all directories.
    fn resolve_dir(&self, dir_path: &str) -> Result<Directory> {
        let parsed = path::parse(dir_path);
        walk::walk(self.start_dir(parsed.is_absolute), &parsed.components, false)
            .ok_or_else(|| FsError::InvalidPath(dir_path.to_owned()).into())
    }

    /// Resolves the directory holding the trailing name of `named`.
    fn containing_dir(&self, named: &NamedPath, raw: &str) -> Result<Directory> {
        walk::walk(self.start_dir(named.is_absolute), &named.components, false)
            .ok_or_else(|| FsError::InvalidPath(raw.to_owned()).into())
    }

    /// Resolves the directory an entity is about to be created in.
    ///
    /// `check` runs before anything is created. It gets the directory the walk
    /// lands on and whether that directory already exists; when it does not,
    /// the directory passed is the existing one the new chain would hang from.
    fn target_dir<F>(
        &self,
        named: &NamedPath,
        raw: &str,
        create_parents: bool,
        check: F,
    ) -> Result<Directory>
    where
        F: FnOnce(&Directory, bool) -> Result<()>,
    {
        let start = self.start_dir(named.is_absolute);
        let invalid = || -> anyhow::Error { FsError::InvalidPath(raw.to_owned()).into() };
        match walk::probe(start, &named.components) {
            Probe::Unreachable => Err(invalid()),
            Probe::Existing { dir, creates: false } => {
                check(&dir, true)?;
                Ok(dir)
            }
            Probe::Existing { creates: true, .. } | Probe::New { .. } if !create_parents => {
                Err(invalid())
            }
            Probe::Existing { dir, creates: true } => {
                check(&dir, true)?;
                walk::walk(start, &named.components, true).ok_or_else(invalid)
            }
            Probe::New { anchor } => {
                check(&anchor, false)?;
                walk::walk(start, &named.components, true).ok_or_else(invalid)
            }
        }
    }

    fn resolve_file(&self, file_path: &str) -> Result<File> {
        let named = path::parse_with_trailing_name(file_path);
        if !named.has_name() {
            return Err(FsError::NotFound(file_path.to_owned()).into());
        }
        let dir = self.containing_dir(&named, file_path)?;
        dir.get_file(&named.name)
            .ok_or_else(|| FsError::NotFound(path::join(&dir.path(), &named.name)).into())
    }

    /// Moves `cwd` to `fallback` if it lies inside the detached subtree.
    fn relocate_cwd(&mut self, detached: &Directory, fallback: &Directory) {
        if self.cwd.is_within(detached) {
            debug!(from = %self.cwd.path(), to = %fallback.path(), "current directory detached");
            self.cwd = fallback.clone();
        }
    }

    fn transfer_file(
        &mut self,
        source: &str,
        dest: &str,
        policy: ConflictPolicy,
        create_parents: bool,
        transfer: Transfer,
    ) -> Result<()> {
        let file = self.resolve_file(source)?;

        let dest_named = path::parse_with_trailing_name(dest);
        let name = if dest_named.has_name() {
            dest_named.name.clone()
        } else {
            file.name()
        };
        check_name(&name, dest)?;
        let backup_name = ConflictPolicy::backup_name(&name);

        let dest_dir = self.target_dir(&dest_named, dest, create_parents, |dir, exists| {
            if !exists {
                return Ok(());
            }
            let Some(existing) = dir.get_file(&name) else {
                return Ok(());
            };
            match policy {
                ConflictPolicy::NoOverride => Err(FsError::AlreadyExists(existing.path()).into()),
                ConflictPolicy::Backup if dir.get_file(&backup_name).as_ref() == Some(&file) => {
                    Err(FsError::AlreadyExists(path::join(&dir.path(), &backup_name)).into())
                }
                _ => Ok(()),
            }
        })?;

        if policy == ConflictPolicy::Backup {
            if let Some(existing) = dest_dir.get_file(&name) {
                let backup = existing.copy_into(&dest_dir, &backup_name);
                debug!(backup = %backup.path(), "backed up conflicting file");
            }
        }

        let from = file.path();
        let placed = match transfer {
            Transfer::Move => {
                if let Some(old_parent) = file.parent() {
                    old_parent.remove_file(&file.name());
                }
                file.set_name(&name);
                dest_dir.add_existing_file(&file);
                file
            }
            Transfer::Copy => file.copy_into(&dest_dir, &name),
        };
        debug!(?transfer, %from, to = %placed.path(), ?policy, "file transferred");
        Ok(())
    }

    fn transfer_dir(
        &mut self,
        source: &str,
        dest: &str,
        policy: ConflictPolicy,
        create_parents: bool,
        transfer: Transfer,
    ) -> Result<()> {
        let dir = self.resolve_dir(source)?;
        if dir.is_root() {
            return Err(FsError::InvalidPath(format!("{source}: the root cannot be moved")).into());
        }

        let dest_named = path::parse_with_trailing_name(dest);
        let name = if dest_named.has_name() {
            dest_named.name.clone()
        } else {
            dir.name()
        };
        check_name(&name, dest)?;
        let backup_name = ConflictPolicy::backup_name(&name);

        let dest_dir = self.target_dir(&dest_named, dest, create_parents, |landing, exists| {
            if landing.is_within(&dir) {
                return Err(FsError::InvalidPath(format!(
                    "{dest}: cannot place {} inside itself",
                    dir.path()
                ))
                .into());
            }
            if !exists {
                return Ok(());
            }
            let Some(existing) = landing.get_subfolder(&name) else {
                return Ok(());
            };
            match policy {
                ConflictPolicy::NoOverride => Err(FsError::AlreadyExists(existing.path()).into()),
                ConflictPolicy::Backup
                    if landing.get_subfolder(&backup_name).as_ref() == Some(&dir) =>
                {
                    Err(FsError::AlreadyExists(path::join(&landing.path(), &backup_name)).into())
                }
                _ => Ok(()),
            }
        })?;

        if policy == ConflictPolicy::Backup {
            if let Some(existing) = dest_dir.get_subfolder(&name) {
                let replaced = dest_dir.get_subfolder(&backup_name);
                let backup = existing.deep_copy(&dest_dir, &backup_name);
                // a cwd inside a moved source follows it, even out of the old backup
                let follows_source = transfer == Transfer::Move && self.cwd.is_within(&dir);
                if let Some(old) = replaced.filter(|_| !follows_source) {
                    self.relocate_cwd(&old, &dest_dir);
                }
                debug!(backup = %backup.path(), "backed up conflicting directory");
            }
        }

        let from = dir.path();
        let replaced = dest_dir
            .get_subfolder(&name)
            .filter(|d| transfer == Transfer::Copy || *d != dir);
        let placed = match transfer {
            Transfer::Move => {
                if let Some(old_parent) = dir.parent() {
                    old_parent.remove_subfolder(&dir.name());
                }
                dir.set_name(&name);
                dest_dir.add_existing_subfolder(&dir);
                dir
            }
            Transfer::Copy => dir.deep_copy(&dest_dir, &name),
        };
        if let Some(old) = replaced {
            self.relocate_cwd(&old, &dest_dir);
        }
        debug!(?transfer, %from, to = %placed.path(), ?policy, "directory transferred");
        Ok(())
    }
}

impl Default for TreeFS {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects names that path resolution would never reach.
fn check_name(name: &str, raw: &str) -> Result<()> {
    if name == CURRENT_DIR || name == PARENT_DIR {
        return Err(FsError::InvalidPath(format!("{raw}: `{name}` cannot be used as a name")).into());
    }
    Ok(())
}

fn compile_pattern(pattern: &str, anchor: MatchAnchor) -> Result<Regex> {
    let anchored = match anchor {
        MatchAnchor::Prefix => format!("^(?:{pattern})"),
        MatchAnchor::Full => format!("^(?:{pattern})$"),
    };
    Regex::new(&anchored).map_err(|e| {
        FsError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: e.to_string(),
        }
        .into()
    })
}

impl FsBackend for TreeFS {
    /// Returns the absolute path of the current working directory.
    fn current_path(&self) -> String {
        self.cwd.path()
    }

    /// Changes the current working directory.
    /// * `path` can be in relative or absolute form; every segment must be an
    /// existing directory.
    ///
    /// On error the current directory is left unchanged.
    fn changedir(&mut self, path: &str) -> Result<()> {
        let target = self.resolve_dir(path)?;
        debug!(from = %self.cwd.path(), to = %target.path(), "changed directory");
        self.cwd = target;
        Ok(())
    }

    /// Names of the subfolders of the current directory, in creation order.
    fn list_folders(&self) -> Vec<String> {
        self.cwd.list_folders()
    }

    /// Names of the files of the current directory, in creation order.
    fn list_files(&self) -> Vec<String> {
        self.cwd.list_files()
    }

    fn exists(&self, path: &str) -> bool {
        self.is_dir(path) || self.is_file(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.resolve_dir(path).is_ok()
    }

    fn is_file(&self, path: &str) -> bool {
        self.resolve_file(path).is_ok()
    }

    /// Creates a directory and returns it.
    ///
    /// # Arguments
    /// * `path` - absolute or relative path; its last segment is the new name.
    /// * `create_parents` - create missing intermediate directories.
    ///
    /// # Errors
    /// * `NoNameSpecified` - the path ends in a separator.
    /// * `InvalidPath` - an intermediate directory is missing (and
    ///   `create_parents` is off) or the path goes above the root.
    /// * `AlreadyExists` - a subfolder of that name exists.
    ///
    /// Nothing is created when an error is returned.
    fn mkdir(&mut self, path: &str, create_parents: bool) -> Result<Directory> {
        let named = path::parse_with_trailing_name(path);
        if !named.has_name() {
            return Err(FsError::NoNameSpecified(path.to_owned()).into());
        }
        check_name(&named.name, path)?;

        let parent = self.target_dir(&named, path, create_parents, |dir, exists| {
            match dir.get_subfolder(&named.name) {
                Some(existing) if exists => Err(FsError::AlreadyExists(existing.path()).into()),
                _ => Ok(()),
            }
        })?;
        let created = parent.new_subfolder(&named.name);
        debug!(path = %created.path(), "directory created");
        Ok(created)
    }

    /// Creates an empty file and returns it. Same rules as `mkdir()`, with
    /// the collision check against the files of the target directory.
    fn mkfile(&mut self, path: &str, create_parents: bool) -> Result<File> {
        let named = path::parse_with_trailing_name(path);
        if !named.has_name() {
            return Err(FsError::NoNameSpecified(path.to_owned()).into());
        }
        check_name(&named.name, path)?;

        let parent = self.target_dir(&named, path, create_parents, |dir, exists| {
            match dir.get_file(&named.name) {
                Some(existing) if exists => Err(FsError::AlreadyExists(existing.path()).into()),
                _ => Ok(()),
            }
        })?;
        let created = parent.new_file(&named.name);
        debug!(path = %created.path(), "file created");
        Ok(created)
    }

    /// Detaches a directory together with everything below it and returns it.
    ///
    /// If the current directory was inside the removed subtree, it moves to
    /// the directory the subtree was removed from.
    fn remove_dir(&mut self, path: &str) -> Result<Directory> {
        let named = path::parse_with_trailing_name(path);
        let parent = self.containing_dir(&named, path)?;
        let removed = parent
            .remove_subfolder(&named.name)
            .ok_or_else(|| FsError::NotFound(path::join(&parent.path(), &named.name)))?;
        self.relocate_cwd(&removed, &parent);
        debug!(path = %path::join(&parent.path(), &named.name), "directory removed");
        Ok(removed)
    }

    /// Detaches a file and returns it. Open handles on it stay usable.
    fn remove_file(&mut self, path: &str) -> Result<File> {
        let named = path::parse_with_trailing_name(path);
        let parent = self.containing_dir(&named, path)?;
        let removed = parent
            .remove_file(&named.name)
            .ok_or_else(|| FsError::NotFound(path::join(&parent.path(), &named.name)))?;
        debug!(path = %path::join(&parent.path(), &named.name), "file removed");
        Ok(removed)
    }

    /// Opens a read handle on an existing file. Never conflicts with other
    /// handles.
    fn open_read_handle(&self, path: &str) -> Result<ReadHandle> {
        let file = self.resolve_file(path)?;
        Ok(ReadHandle::open_on(&file))
    }

    /// Opens the write handle of an existing file.
    /// Fails with `HandleConflict` while another write handle is open.
    fn open_write_handle(&self, path: &str) -> Result<WriteHandle> {
        let file = self.resolve_file(path)?;
        WriteHandle::open_on(&file)
    }

    /// Reads the entire content of a file.
    fn read_file(&self, path: &str) -> Result<String> {
        let handle = self.open_read_handle(path)?;
        Ok(handle.read())
    }

    /// Writes to an existing file.
    ///
    /// # Arguments
    /// * `mode` - `Overwrite` replaces the content, `AppendLine` appends after
    ///   a newline, `Concat` appends directly.
    ///
    /// # Errors
    /// * `InvalidPath` / `NotFound` - the file does not exist (use `mkfile()`).
    /// * `HandleConflict` - a write handle is open on the file.
    fn write_file(&mut self, path: &str, content: &str, mode: WriteMode) -> Result<()> {
        let mut handle = self.open_write_handle(path)?;
        match mode {
            WriteMode::Overwrite => handle.write(content),
            WriteMode::AppendLine => handle.concat(&format!("\n{content}")),
            WriteMode::Concat => handle.concat(content),
        }
        debug!(path, ?mode, "file written");
        Ok(())
    }

    /// Moves a file, optionally renaming it.
    ///
    /// # Arguments
    /// * `source` - path of an existing file.
    /// * `dest` - destination directory, optionally followed by a new name.
    ///   A trailing separator keeps the source name.
    /// * `policy` - what to do if the destination name is taken.
    /// * `create_parents` - create missing destination directories.
    ///
    /// # Notes
    /// - The file keeps its identity: handles and `File` references held by
    ///   callers follow it to its new place.
    /// - With `ConflictPolicy::Backup`, the replaced file survives as
    ///   `~<name>`. If that slot is taken by the source itself, the move fails
    ///   and nothing changes.
    fn move_file(
        &mut self,
        source: &str,
        dest: &str,
        policy: ConflictPolicy,
        create_parents: bool,
    ) -> Result<()> {
        self.transfer_file(source, dest, policy, create_parents, Transfer::Move)
    }

    /// Copies a file. Same rules as `move_file()`, except that the source is
    /// left in place and a new file with the same content is linked at the
    /// destination.
    fn copy_file(
        &mut self,
        source: &str,
        dest: &str,
        policy: ConflictPolicy,
        create_parents: bool,
    ) -> Result<()> {
        self.transfer_file(source, dest, policy, create_parents, Transfer::Copy)
    }

    /// Moves a directory with its subtree. Same rules as `move_file()`;
    /// additionally the destination may not lie inside the moved directory,
    /// and the root cannot be moved.
    fn move_dir(
        &mut self,
        source: &str,
        dest: &str,
        policy: ConflictPolicy,
        create_parents: bool,
    ) -> Result<()> {
        self.transfer_dir(source, dest, policy, create_parents, Transfer::Move)
    }

    /// Copies a directory with its subtree. File contents are duplicated;
    /// open handles are not.
    fn copy_dir(
        &mut self,
        source: &str,
        dest: &str,
        policy: ConflictPolicy,
        create_parents: bool,
    ) -> Result<()> {
        self.transfer_dir(source, dest, policy, create_parents, Transfer::Copy)
    }

    /// Finds files and folders whose names match a regular expression.
    ///
    /// # Arguments
    /// * `pattern` - regular expression, matched against bare names.
    /// * `path` - directory to search (`.` for the current one).
    /// * `options` - `recursive` searches the whole subtree instead of the
    ///   direct children; `anchor` chooses between prefix and full-name
    ///   matching (prefix by default: `a` matches `abc`).
    ///
    /// # Returns
    /// * `Ok(FindResult)` - full paths of matching files and folders, in
    ///   traversal order (a directory's files first, then each subfolder
    ///   followed by its own subtree).
    /// * `Err(anyhow::Error)` - `InvalidPath` or `InvalidPattern`.
    fn find(&self, pattern: &str, path: &str, options: FindOptions) -> Result<FindResult> {
        let regex = compile_pattern(pattern, options.anchor)?;
        let start = self.resolve_dir(path)?;

        let result = if options.recursive {
            let output = start.recurse(&mut |entry: &Entry| regex.is_match(&entry.name()));
            FindResult {
                files: keep_matches(output.files),
                folders: keep_matches(output.folders),
            }
        } else {
            FindResult {
                files: start
                    .files()
                    .iter()
                    .filter(|f| regex.is_match(&f.name()))
                    .map(File::path)
                    .collect(),
                folders: start
                    .subfolders()
                    .iter()
                    .filter(|d| regex.is_match(&d.name()))
                    .map(Directory::path)
                    .collect(),
            }
        };
        debug!(
            pattern,
            start = %start.path(),
            files = result.files.len(),
            folders = result.folders.len(),
            "find finished"
        );
        Ok(result)
    }
}

fn keep_matches(output: Vec<(String, bool)>) -> Vec<String> {
    output
        .into_iter()
        .filter_map(|(path, matched)| matched.then_some(path))
        .collect()
}
