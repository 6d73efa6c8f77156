//! Resolution of directory components against a starting directory.

use tracing::trace;

use crate::path::{CURRENT_DIR, PARENT_DIR};
use crate::vfs::Directory;

/// Outcome of walking a path without touching the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The walk ends on an existing directory. `creates` is set when it passes
    /// through directories that would have to be created on the way.
    Existing { dir: Directory, creates: bool },
    /// The walk ends in a directory that does not exist yet; it would be
    /// created somewhere below `anchor`.
    New { anchor: Directory },
    /// The walk goes above the root or meets an empty component.
    Unreachable,
}

/// Walks `components` from `start` and returns the directory reached.
///
/// * `..` moves to the parent; the walk fails at the root instead of clamping.
/// * `.` is a no-op.
/// * an empty component (`a//b`) always fails; only the root has an empty name.
/// * any other name must be an existing subfolder, unless `create_missing` is
///   set, in which case the missing subfolder is created. Only children of
///   directories on the walk are ever created.
///
/// With `create_missing`, a walk that would fail creates nothing.
pub fn walk(start: &Directory, components: &[String], create_missing: bool) -> Option<Directory> {
    if create_missing && probe(start, components) == Probe::Unreachable {
        trace!(start = %start.path(), ?components, "walk would fail, nothing created");
        return None;
    }

    let mut current = start.clone();
    for component in components {
        match component.as_str() {
            CURRENT_DIR => {}
            "" => {
                trace!(at = %current.path(), "empty path component");
                return None;
            }
            PARENT_DIR => match current.parent() {
                Some(parent) => current = parent,
                None => {
                    trace!(at = %current.path(), "walk went above the root");
                    return None;
                }
            },
            name => {
                current = match current.get_subfolder(name) {
                    Some(next) => next,
                    None if create_missing => {
                        trace!(parent = %current.path(), name, "creating missing directory");
                        current.new_subfolder(name)
                    }
                    None => {
                        trace!(parent = %current.path(), name, "no such directory");
                        return None;
                    }
                };
            }
        }
    }
    Some(current)
}

/// Dry run of a creating walk. Directories that would be created are only
/// counted, so the only possible failures are `..` above the root and an
/// empty component.
pub fn probe(start: &Directory, components: &[String]) -> Probe {
    let mut current = start.clone();
    let mut pending = 0usize;
    let mut creates = false;
    for component in components {
        match component.as_str() {
            CURRENT_DIR => {}
            "" => return Probe::Unreachable,
            PARENT_DIR if pending > 0 => pending -= 1,
            PARENT_DIR => match current.parent() {
                Some(parent) => current = parent,
                None => return Probe::Unreachable,
            },
            _ if pending > 0 => pending += 1,
            name => match current.get_subfolder(name) {
                Some(next) => current = next,
                None => {
                    pending = 1;
                    creates = true;
                }
            },
        }
    }
    if pending > 0 {
        Probe::New { anchor: current }
    } else {
        Probe::Existing {
            dir: current,
            creates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(path: &str) -> Vec<String> {
        crate::path::parse(path).components
    }

    /// `/home/user`, `/etc`
    fn setup_test_tree() -> Directory {
        let root = Directory::root();
        root.new_subfolder("home").new_subfolder("user");
        root.new_subfolder("etc");
        root
    }

    mod walk {
        use super::*;

        #[test]
        fn test_walk_existing() {
            let root = setup_test_tree();
            let user = walk(&root, &components("home/user"), false).unwrap();
            assert_eq!(user.path(), "/home/user");
        }

        #[test]
        fn test_walk_dots() {
            let root = setup_test_tree();
            let etc = walk(&root, &components("./home/user/../.././etc"), false).unwrap();
            assert_eq!(etc.path(), "/etc");
        }

        #[test]
        fn test_walk_empty_component_fails() {
            let root = setup_test_tree();
            let parts = vec!["home".to_string(), String::new(), "user".to_string()];
            assert!(walk(&root, &parts, false).is_none());
            assert!(walk(&root, &parts, true).is_none());

            let home = root.get_subfolder("home").unwrap();
            assert_eq!(home.list_folders(), vec!["user"]);
        }

        #[test]
        fn test_walk_empty_returns_start() {
            let root = setup_test_tree();
            let home = root.get_subfolder("home").unwrap();
            assert_eq!(walk(&home, &[], false), Some(home));
        }

        #[test]
        fn test_walk_above_root_fails() {
            let root = setup_test_tree();
            let home = root.get_subfolder("home").unwrap();
            assert!(walk(&root, &components(".."), false).is_none());
            assert!(walk(&home, &components("../../../.."), false).is_none());
        }

        #[test]
        fn test_walk_missing_fails_without_create() {
            let root = setup_test_tree();
            assert!(walk(&root, &components("home/guest/docs"), false).is_none());
            let home = root.get_subfolder("home").unwrap();
            assert!(home.get_subfolder("guest").is_none());
        }

        #[test]
        fn test_walk_creates_missing() {
            let root = setup_test_tree();
            let docs = walk(&root, &components("home/guest/docs"), true).unwrap();
            assert_eq!(docs.path(), "/home/guest/docs");
            let home = root.get_subfolder("home").unwrap();
            assert_eq!(home.list_folders(), vec!["user", "guest"]);
        }

        #[test]
        fn test_walk_create_does_not_duplicate() {
            let root = Directory::root();
            let dir3 = walk(&root, &components("dir2/../dir2/dir3"), true).unwrap();
            assert_eq!(dir3.path(), "/dir2/dir3");
            assert_eq!(root.list_folders(), vec!["dir2"]);
        }

        #[test]
        fn test_failed_create_walk_creates_nothing() {
            let root = Directory::root();
            assert!(walk(&root, &components("a/../../x"), true).is_none());
            assert!(root.list_folders().is_empty());
        }
    }

    mod probe {
        use super::*;

        #[test]
        fn test_probe_existing() {
            let root = setup_test_tree();
            let user = root.get_subfolder("home").unwrap().get_subfolder("user").unwrap();
            assert_eq!(
                probe(&root, &components("home/user")),
                Probe::Existing {
                    dir: user,
                    creates: false
                }
            );
        }

        #[test]
        fn test_probe_existing_through_missing() {
            let root = setup_test_tree();
            assert_eq!(
                probe(&root, &components("x/../etc/..")),
                Probe::Existing {
                    dir: root.clone(),
                    creates: true
                }
            );
            assert!(root.get_subfolder("x").is_none());
        }

        #[test]
        fn test_probe_new() {
            let root = setup_test_tree();
            let home = root.get_subfolder("home").unwrap();
            assert_eq!(
                probe(&root, &components("home/guest/docs")),
                Probe::New { anchor: home }
            );
        }

        #[test]
        fn test_probe_unreachable() {
            let root = Directory::root();
            assert_eq!(probe(&root, &components("a/b/../../..")), Probe::Unreachable);
            assert!(probe(&root, &components("a/b/../..")) != Probe::Unreachable);
            assert!(matches!(
                probe(&root, &components("a/b/../c")),
                Probe::New { .. }
            ));
        }

        #[test]
        fn test_probe_empty_component() {
            let root = setup_test_tree();
            let parts = vec!["home".to_string(), String::new()];
            assert_eq!(probe(&root, &parts), Probe::Unreachable);
            let parts = vec!["missing".to_string(), String::new()];
            assert_eq!(probe(&root, &parts), Probe::Unreachable);
        }
    }
}
