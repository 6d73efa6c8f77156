//! Directory and file nodes of the namespace tree.
//!
//! Ownership runs strictly downwards: a directory holds `Rc`s to its children,
//! a child holds only a `Weak` back-reference to its parent. Detaching a child
//! from its parent's map therefore drops the whole subtree unless a caller
//! still holds one of its nodes.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::path::{self, SEPARATOR};
use crate::vfs::Entry;

/// Name → node map that keeps insertion order. Replacing an existing name
/// keeps its original slot.
///
/// Lookups scan the entries linearly. A `BTreeMap` would order children by
/// name and lose their creation order.
#[derive(Debug)]
pub(crate) struct NameMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for NameMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> NameMap<T> {
    pub(crate) fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub(crate) fn insert(&mut self, name: String, value: T) -> Option<T> {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<T> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }
}

#[derive(Debug)]
struct DirData {
    name: String,
    is_root: bool,
    parent: Weak<RefCell<DirData>>,
    subfolders: NameMap<Directory>,
    files: NameMap<File>,
}

/// Shared reference to a directory node. Cloning is cheap and yields the same
/// node; equality is node identity.
#[derive(Clone)]
pub struct Directory(Rc<RefCell<DirData>>);

#[derive(Debug)]
pub(crate) struct FileData {
    pub(crate) name: String,
    pub(crate) content: String,
    parent: Weak<RefCell<DirData>>,
    pub(crate) readers: BTreeSet<u64>,
    pub(crate) writer: Option<u64>,
    next_handle_id: u64,
}

impl FileData {
    pub(crate) fn next_handle_id(&mut self) -> u64 {
        self.next_handle_id += 1;
        self.next_handle_id
    }
}

/// Shared reference to a file node. Cloning is cheap and yields the same
/// node; equality is node identity.
#[derive(Clone)]
pub struct File(pub(crate) Rc<RefCell<FileData>>);

/// Results of [`Directory::recurse`], keyed by full path in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct Recursion<T> {
    pub files: Vec<(String, T)>,
    pub folders: Vec<(String, T)>,
}

impl Directory {
    /// Creates a detached root directory (empty name, path `/`).
    pub fn root() -> Self {
        Directory(Rc::new(RefCell::new(DirData {
            name: String::new(),
            is_root: true,
            parent: Weak::new(),
            subfolders: NameMap::default(),
            files: NameMap::default(),
        })))
    }

    fn child_of(parent: &Directory, name: &str) -> Self {
        Directory(Rc::new(RefCell::new(DirData {
            name: name.to_owned(),
            is_root: false,
            parent: Rc::downgrade(&parent.0),
            subfolders: NameMap::default(),
            files: NameMap::default(),
        })))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub(crate) fn set_name(&self, name: &str) {
        self.0.borrow_mut().name = name.to_owned();
    }

    pub fn is_root(&self) -> bool {
        self.0.borrow().is_root
    }

    /// Parent directory; `None` for the root or when the parent is gone.
    pub fn parent(&self) -> Option<Directory> {
        self.0.borrow().parent.upgrade().map(Directory)
    }

    /// Absolute path, derived from the current parent chain on every call.
    pub fn path(&self) -> String {
        if self.is_root() {
            return SEPARATOR.to_string();
        }
        let name = self.name();
        match self.parent() {
            Some(parent) => path::join(&parent.path(), &name),
            None => name,
        }
    }

    pub fn get_subfolder(&self, name: &str) -> Option<Directory> {
        self.0.borrow().subfolders.get(name).cloned()
    }

    pub fn get_file(&self, name: &str) -> Option<File> {
        self.0.borrow().files.get(name).cloned()
    }

    /// Creates and links a child directory. Callers check for collisions
    /// first; an existing subfolder of the same name is replaced.
    pub fn new_subfolder(&self, name: &str) -> Directory {
        let child = Directory::child_of(self, name);
        self.0
            .borrow_mut()
            .subfolders
            .insert(name.to_owned(), child.clone());
        child
    }

    /// Creates and links an empty file. Callers check for collisions first;
    /// an existing file of the same name is replaced.
    pub fn new_file(&self, name: &str) -> File {
        let file = File::new(name, Rc::downgrade(&self.0));
        self.0
            .borrow_mut()
            .files
            .insert(name.to_owned(), file.clone());
        file
    }

    /// Links an existing file under its current name and points its parent
    /// reference here. The file is not unlinked from its previous parent.
    pub fn add_existing_file(&self, file: &File) {
        file.0.borrow_mut().parent = Rc::downgrade(&self.0);
        let name = file.name();
        self.0.borrow_mut().files.insert(name, file.clone());
    }

    /// Directory counterpart of [`Directory::add_existing_file`].
    pub fn add_existing_subfolder(&self, dir: &Directory) {
        dir.0.borrow_mut().parent = Rc::downgrade(&self.0);
        let name = dir.name();
        self.0.borrow_mut().subfolders.insert(name, dir.clone());
    }

    pub fn remove_subfolder(&self, name: &str) -> Option<Directory> {
        self.0.borrow_mut().subfolders.remove(name)
    }

    pub fn remove_file(&self, name: &str) -> Option<File> {
        self.0.borrow_mut().files.remove(name)
    }

    pub fn list_folders(&self) -> Vec<String> {
        self.0.borrow().subfolders.names().map(str::to_owned).collect()
    }

    pub fn list_files(&self) -> Vec<String> {
        self.0.borrow().files.names().map(str::to_owned).collect()
    }

    pub fn subfolders(&self) -> Vec<Directory> {
        self.0.borrow().subfolders.values().cloned().collect()
    }

    pub fn files(&self) -> Vec<File> {
        self.0.borrow().files.values().cloned().collect()
    }

    /// True if `self` is `ancestor` or lies somewhere below it.
    pub fn is_within(&self, ancestor: &Directory) -> bool {
        let mut current = Some(self.clone());
        while let Some(dir) = current {
            if dir == *ancestor {
                return true;
            }
            current = dir.parent();
        }
        false
    }

    /// Duplicates this subtree (directories and file contents, no handles)
    /// and links the copy under `parent` as `name`.
    pub fn deep_copy(&self, parent: &Directory, name: &str) -> Directory {
        let copy = parent.new_subfolder(name);
        for file in self.files() {
            file.copy_into(&copy, &file.name());
        }
        for sub in self.subfolders() {
            sub.deep_copy(&copy, &sub.name());
        }
        copy
    }

    /// Applies `visitor` to every file and directory below this one,
    /// depth-first: a directory's files, then each subfolder followed by its
    /// own subtree. The directory itself is not visited.
    pub fn recurse<T, F>(&self, visitor: &mut F) -> Recursion<T>
    where
        F: FnMut(&Entry) -> T,
    {
        let mut output = Recursion {
            files: Vec::new(),
            folders: Vec::new(),
        };
        self.recurse_into(visitor, &mut output);
        output
    }

    fn recurse_into<T, F>(&self, visitor: &mut F, output: &mut Recursion<T>)
    where
        F: FnMut(&Entry) -> T,
    {
        for file in self.files() {
            let entry = Entry::File(file);
            output.files.push((entry.path(), visitor(&entry)));
        }
        for dir in self.subfolders() {
            let entry = Entry::Directory(dir.clone());
            output.folders.push((entry.path(), visitor(&entry)));
            dir.recurse_into(visitor, output);
        }
    }
}

impl PartialEq for Directory {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Directory {}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directory")
            .field("path", &self.path())
            .finish()
    }
}

impl File {
    fn new(name: &str, parent: Weak<RefCell<DirData>>) -> Self {
        File(Rc::new(RefCell::new(FileData {
            name: name.to_owned(),
            content: String::new(),
            parent,
            readers: BTreeSet::new(),
            writer: None,
            next_handle_id: 0,
        })))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub(crate) fn set_name(&self, name: &str) {
        self.0.borrow_mut().name = name.to_owned();
    }

    pub fn parent(&self) -> Option<Directory> {
        self.0.borrow().parent.upgrade().map(Directory)
    }

    /// Absolute path, derived from the current parent chain.
    pub fn path(&self) -> String {
        let name = self.name();
        match self.parent() {
            Some(parent) => path::join(&parent.path(), &name),
            None => name,
        }
    }

    pub fn content(&self) -> String {
        self.0.borrow().content.clone()
    }

    /// Content length in characters.
    pub fn len(&self) -> usize {
        self.0.borrow().content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().content.is_empty()
    }

    pub fn open_readers(&self) -> usize {
        self.0.borrow().readers.len()
    }

    pub fn has_writer(&self) -> bool {
        self.0.borrow().writer.is_some()
    }

    /// Creates a fresh file with the same content, linked into `dir` as
    /// `name`. Open handles are not carried over.
    pub fn copy_into(&self, dir: &Directory, name: &str) -> File {
        let copy = dir.new_file(name);
        copy.0.borrow_mut().content = self.content();
        copy
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for File {}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds `/` -> `file1`, `dir1`; `/dir1` -> `file2`, `sub`; `/dir1/sub` -> `file3`.
    fn setup_test_tree() -> Directory {
        let root = Directory::root();
        root.new_file("file1");
        let dir1 = root.new_subfolder("dir1");
        dir1.new_file("file2");
        let sub = dir1.new_subfolder("sub");
        sub.new_file("file3");
        root
    }

    mod name_map {
        use super::*;

        #[test]
        fn test_insertion_order_is_kept() {
            let mut map = NameMap::default();
            map.insert("b".to_string(), 1);
            map.insert("a".to_string(), 2);
            map.insert("c".to_string(), 3);
            assert_eq!(map.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        }

        #[test]
        fn test_replace_keeps_slot() {
            let mut map = NameMap::default();
            map.insert("a".to_string(), 1);
            map.insert("b".to_string(), 2);
            assert_eq!(map.insert("a".to_string(), 3), Some(1));
            assert_eq!(map.names().collect::<Vec<_>>(), vec!["a", "b"]);
            assert_eq!(map.get("a"), Some(&3));
        }

        #[test]
        fn test_remove() {
            let mut map = NameMap::default();
            map.insert("a".to_string(), 1);
            map.insert("b".to_string(), 2);
            assert_eq!(map.remove("a"), Some(1));
            assert_eq!(map.remove("a"), None);
            assert_eq!(map.values().collect::<Vec<_>>(), vec![&2]);
        }
    }

    mod paths {
        use super::*;

        #[test]
        fn test_root_path() {
            let root = Directory::root();
            assert!(root.is_root());
            assert_eq!(root.name(), "");
            assert_eq!(root.path(), "/");
            assert!(root.parent().is_none());
        }

        #[test]
        fn test_nested_paths() {
            let root = setup_test_tree();
            let dir1 = root.get_subfolder("dir1").unwrap();
            let sub = dir1.get_subfolder("sub").unwrap();
            assert_eq!(dir1.path(), "/dir1");
            assert_eq!(sub.path(), "/dir1/sub");
            assert_eq!(root.get_file("file1").unwrap().path(), "/file1");
            assert_eq!(sub.get_file("file3").unwrap().path(), "/dir1/sub/file3");
        }

        #[test]
        fn test_paths_follow_reparenting() {
            let root = setup_test_tree();
            let dir1 = root.get_subfolder("dir1").unwrap();
            let sub = dir1.remove_subfolder("sub").unwrap();
            let other = root.new_subfolder("other");
            other.add_existing_subfolder(&sub);

            assert_eq!(sub.path(), "/other/sub");
            assert_eq!(sub.get_file("file3").unwrap().path(), "/other/sub/file3");
        }

        #[test]
        fn test_file_path_follows_relink() {
            let root = setup_test_tree();
            let file = root.remove_file("file1").unwrap();
            let dir1 = root.get_subfolder("dir1").unwrap();
            dir1.add_existing_file(&file);
            assert_eq!(file.path(), "/dir1/file1");
            assert_eq!(dir1.get_file("file1"), Some(file));
        }
    }

    mod mutation {
        use super::*;

        #[test]
        fn test_file_and_folder_namespaces_are_independent() {
            let root = Directory::root();
            root.new_file("name");
            root.new_subfolder("name");
            assert_eq!(root.list_files(), vec!["name"]);
            assert_eq!(root.list_folders(), vec!["name"]);
        }

        #[test]
        fn test_remove_missing_is_noop() {
            let root = Directory::root();
            assert!(root.remove_file("nope").is_none());
            assert!(root.remove_subfolder("nope").is_none());
        }

        #[test]
        fn test_removed_subtree_is_dropped() {
            let root = setup_test_tree();
            let weak_sub = {
                let dir1 = root.get_subfolder("dir1").unwrap();
                Rc::downgrade(&dir1.get_subfolder("sub").unwrap().0)
            };
            assert!(root.remove_subfolder("dir1").is_some());
            assert!(weak_sub.upgrade().is_none());
        }

        #[test]
        fn test_is_within() {
            let root = setup_test_tree();
            let dir1 = root.get_subfolder("dir1").unwrap();
            let sub = dir1.get_subfolder("sub").unwrap();
            assert!(sub.is_within(&dir1));
            assert!(sub.is_within(&sub));
            assert!(sub.is_within(&root));
            assert!(!dir1.is_within(&sub));
        }

        #[test]
        fn test_copy_into() {
            let root = Directory::root();
            let file = root.new_file("file");
            file.0.borrow_mut().content = "data".to_string();

            let backup = file.copy_into(&root, "~file");
            assert_ne!(backup, file);
            assert_eq!(backup.content(), "data");
            assert_eq!(backup.path(), "/~file");
            assert_eq!(root.list_files(), vec!["file", "~file"]);
        }

        #[test]
        fn test_deep_copy() {
            let root = setup_test_tree();
            let dir1 = root.get_subfolder("dir1").unwrap();
            dir1.get_file("file2").unwrap().0.borrow_mut().content = "two".to_string();

            let copy = dir1.deep_copy(&root, "dir2");
            assert_eq!(copy.path(), "/dir2");
            assert_eq!(copy.get_file("file2").unwrap().content(), "two");
            assert_ne!(copy.get_file("file2"), dir1.get_file("file2"));
            assert_eq!(
                copy.get_subfolder("sub").unwrap().get_file("file3").unwrap().path(),
                "/dir2/sub/file3"
            );
        }
    }

    mod recurse {
        use super::*;

        #[test]
        fn test_recurse_visits_entire_subtree_in_order() {
            let root = setup_test_tree();
            let output = root.recurse(&mut |entry: &Entry| entry.name());

            assert_eq!(
                output.files,
                vec![
                    ("/file1".to_string(), "file1".to_string()),
                    ("/dir1/file2".to_string(), "file2".to_string()),
                    ("/dir1/sub/file3".to_string(), "file3".to_string()),
                ]
            );
            assert_eq!(
                output.folders,
                vec![
                    ("/dir1".to_string(), "dir1".to_string()),
                    ("/dir1/sub".to_string(), "sub".to_string()),
                ]
            );
        }

        #[test]
        fn test_recurse_from_subdirectory() {
            let root = setup_test_tree();
            let dir1 = root.get_subfolder("dir1").unwrap();
            let output = dir1.recurse(&mut |entry: &Entry| entry.is_file());
            assert_eq!(output.files.len(), 2);
            assert_eq!(output.folders, vec![("/dir1/sub".to_string(), false)]);
        }

        #[test]
        fn test_recurse_empty() {
            let root = Directory::root();
            let output = root.recurse(&mut |_: &Entry| ());
            assert!(output.files.is_empty());
            assert!(output.folders.is_empty());
        }
    }
}
