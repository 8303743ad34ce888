//! Path utilities for SFTP operations
//!
//! Remote SFTP paths always use `/` as separator, whatever the local OS.

use std::path::Path;

/// Check if a remote SFTP path is absolute.
pub fn is_absolute_remote_path(path: &str) -> bool {
    path.starts_with('/')
}

/// Join remote SFTP path components using `/` separator.
pub fn join_remote_path(base: &str, component: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, component)
    } else {
        format!("{}/{}", base, component)
    }
}

/// Resolve `path` against the remote working directory `cwd`
///
/// Absolute paths are kept, relative ones are appended to `cwd`; `.` and
/// `..` components are folded. An empty path is `cwd` itself.
pub fn resolve_remote_path(cwd: &str, path: &str) -> String {
    let joined = if is_absolute_remote_path(path) {
        path.to_string()
    } else {
        join_remote_path(cwd, path)
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    if is_absolute_remote_path(&joined) {
        format!("/{}", parts.join("/"))
    } else if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Render a local relative path with `/` separators
///
/// The empty path (the walk root) becomes `.`.
pub fn to_posix_relative(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Every ancestor of an absolute remote path, shortest first, root excluded
///
/// `/a/b/c` gives `/a`, `/a/b`, `/a/b/c`.
pub fn remote_ancestors(path: &str) -> Vec<String> {
    let mut current = String::new();
    path.split('/')
        .filter(|p| !p.is_empty())
        .map(|part| {
            current.push('/');
            current.push_str(part);
            current.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_is_absolute_remote_path() {
        assert!(is_absolute_remote_path("/home/user"));
        assert!(is_absolute_remote_path("/"));
        assert!(!is_absolute_remote_path("relative/path"));
        assert!(!is_absolute_remote_path("C:\\Windows")); // Not a remote absolute path
    }

    #[test]
    fn test_join_remote_path() {
        assert_eq!(join_remote_path("/home", "file.txt"), "/home/file.txt");
        assert_eq!(join_remote_path("/home/", "file.txt"), "/home/file.txt");
        assert_eq!(join_remote_path("/", "home"), "/home");
    }

    #[test]
    fn test_resolve_remote_path() {
        assert_eq!(resolve_remote_path("/home/u", "app"), "/home/u/app");
        assert_eq!(resolve_remote_path("/home/u", "/srv/app/"), "/srv/app");
        assert_eq!(resolve_remote_path("/app", "."), "/app");
        assert_eq!(resolve_remote_path("/app", ""), "/app");
        assert_eq!(resolve_remote_path("/app", "a/./b/../c"), "/app/a/c");
        assert_eq!(resolve_remote_path("/", ".."), "/");
    }

    #[test]
    fn test_to_posix_relative() {
        assert_eq!(to_posix_relative(Path::new("")), ".");
        let nested: PathBuf = ["a", "b", "c"].iter().collect();
        assert_eq!(to_posix_relative(&nested), "a/b/c");
    }

    #[test]
    fn test_remote_ancestors() {
        assert_eq!(remote_ancestors("/a/b/c"), vec!["/a", "/a/b", "/a/b/c"]);
        assert!(remote_ancestors("/").is_empty());
    }
}
