use crate::vfs::{Directory, File};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// A node of the namespace tree, as handed to [`Directory::recurse`] visitors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(File),
    Directory(Directory),
}

impl Entry {
    pub fn entry_type(&self) -> EntryType {
        match self {
            Entry::File(_) => EntryType::File,
            Entry::Directory(_) => EntryType::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.entry_type() == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type() == EntryType::Directory
    }

    /// Bare name, without any parent components.
    pub fn name(&self) -> String {
        match self {
            Entry::File(file) => file.name(),
            Entry::Directory(dir) => dir.name(),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Entry::File(file) => file.path(),
            Entry::Directory(dir) => dir.path(),
        }
    }
}

impl From<File> for Entry {
    fn from(file: File) -> Self {
        Entry::File(file)
    }
}

impl From<Directory> for Entry {
    fn from(dir: Directory) -> Self {
        Entry::Directory(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kinds() {
        let root = Directory::root();
        let file: Entry = root.new_file("f").into();
        let dir: Entry = root.new_subfolder("d").into();

        assert!(file.is_file());
        assert!(!file.is_dir());
        assert_eq!(file.entry_type(), EntryType::File);
        assert_eq!(file.path(), "/f");

        assert!(dir.is_dir());
        assert_eq!(dir.entry_type(), EntryType::Directory);
        assert_eq!(dir.name(), "d");
    }
}
