//! Path decomposition. Pure string handling, no tree access.

pub const SEPARATOR: char = '/';
pub const CURRENT_DIR: &str = ".";
pub const PARENT_DIR: &str = "..";

/// A path split into directory components, for paths where every segment is
/// a directory to traverse (e.g. `cd`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirPath {
    pub components: Vec<String>,
    pub is_absolute: bool,
}

/// A path split into the directories leading to an entity and the entity's
/// own (trailing) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPath {
    pub components: Vec<String>,
    /// Empty when the path ends in a separator.
    pub name: String,
    pub is_absolute: bool,
}

impl NamedPath {
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

/// `/a/b/c/` -> `([a, b, c], true)`, `a//b` -> `([a, b], false)`.
pub fn parse(path: &str) -> DirPath {
    let path = path.trim();
    DirPath {
        components: path
            .split(SEPARATOR)
            .filter(|part| !part.is_empty())
            .map(str::to_owned)
            .collect(),
        is_absolute: path.starts_with(SEPARATOR),
    }
}

/// `/a/b/file` -> `([a, b], "file", true)`, `a/c/` -> `([a, c], "", false)`.
pub fn parse_with_trailing_name(path: &str) -> NamedPath {
    let path = path.trim();
    let is_absolute = path.starts_with(SEPARATOR);
    let body = if is_absolute { &path[1..] } else { path };

    let mut parts: Vec<String> = body.split(SEPARATOR).map(str::to_owned).collect();
    // `split` always yields at least one element
    let name = parts.pop().unwrap_or_default();
    NamedPath {
        components: parts,
        name,
        is_absolute,
    }
}

/// Joins a directory path and a child name without doubling the separator
/// under the root.
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with(SEPARATOR) {
        format!("{dir}{name}")
    } else {
        format!("{dir}{SEPARATOR}{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    mod parse {
        use super::*;

        #[test]
        fn test_parse_absolute() {
            let parsed = parse("/a/b/c/");
            assert_eq!(parsed.components, strings(&["a", "b", "c"]));
            assert!(parsed.is_absolute);
        }

        #[test]
        fn test_parse_relative_drops_empty_components() {
            let parsed = parse("a//b/../c//");
            assert_eq!(parsed.components, strings(&["a", "b", "..", "c"]));
            assert!(!parsed.is_absolute);
        }

        #[test]
        fn test_parse_root_and_empty() {
            let root = parse("/");
            assert!(root.components.is_empty());
            assert!(root.is_absolute);

            let empty = parse("");
            assert!(empty.components.is_empty());
            assert!(!empty.is_absolute);
        }

        #[test]
        fn test_parse_trims_whitespace() {
            let parsed = parse("  /a/b \n");
            assert_eq!(parsed.components, strings(&["a", "b"]));
            assert!(parsed.is_absolute);
        }
    }

    mod parse_with_trailing_name {
        use super::*;

        #[test]
        fn test_absolute_with_name() {
            let parsed = parse_with_trailing_name("/a/b/c/file_name");
            assert_eq!(parsed.components, strings(&["a", "b", "c"]));
            assert_eq!(parsed.name, "file_name");
            assert!(parsed.is_absolute);
            assert!(parsed.has_name());
        }

        #[test]
        fn test_relative_with_trailing_separator() {
            let parsed = parse_with_trailing_name("a/c/");
            assert_eq!(parsed.components, strings(&["a", "c"]));
            assert_eq!(parsed.name, "");
            assert!(!parsed.is_absolute);
            assert!(!parsed.has_name());
        }

        #[test]
        fn test_single_name() {
            let parsed = parse_with_trailing_name("file");
            assert!(parsed.components.is_empty());
            assert_eq!(parsed.name, "file");
            assert!(!parsed.is_absolute);
        }

        #[test]
        fn test_root_only() {
            let parsed = parse_with_trailing_name("/");
            assert!(parsed.components.is_empty());
            assert_eq!(parsed.name, "");
            assert!(parsed.is_absolute);
        }

        #[test]
        fn test_empty_string() {
            let parsed = parse_with_trailing_name("");
            assert!(parsed.components.is_empty());
            assert_eq!(parsed.name, "");
            assert!(!parsed.is_absolute);
        }

        #[test]
        fn test_keeps_empty_components() {
            let parsed = parse_with_trailing_name("a//b");
            assert_eq!(parsed.components, strings(&["a", ""]));
            assert_eq!(parsed.name, "b");
        }
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
    }
}
