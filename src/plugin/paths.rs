//! Lexical path helpers for generated code

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // Nothing above the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Forward-slash form used inside generated import statements
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Directory holding a descriptor file
pub fn descriptor_dir(file_path: &Path) -> &Path {
    file_path.parent().unwrap_or_else(|| Path::new(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_resolves_dots() {
        assert_eq!(
            normalize_path(Path::new("/app/src/modules/cart/./hooks/../static")),
            PathBuf::from("/app/src/modules/cart/static")
        );
    }

    #[test]
    fn test_normalize_keeps_leading_parent() {
        assert_eq!(normalize_path(Path::new("../a/b")), PathBuf::from("../a/b"));
        assert_eq!(normalize_path(Path::new("../../a")), PathBuf::from("../../a"));
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_normalize_stops_at_root() {
        assert_eq!(normalize_path(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("a\\b/c")), "a/b/c");
    }

    #[test]
    fn test_descriptor_dir() {
        assert_eq!(
            descriptor_dir(Path::new("/app/src/modules/cart/module.json")),
            Path::new("/app/src/modules/cart")
        );
    }
}
