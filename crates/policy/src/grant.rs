use crate::Endpoint;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Grant kinds the builder can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    NetworkListen,
    NetworkConnect,
    FileReadOnly,
    FileReadWriteDelete,
}

impl GrantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantKind::NetworkListen => "listen",
            GrantKind::NetworkConnect => "connect",
            GrantKind::FileReadOnly => "read",
            GrantKind::FileReadWriteDelete => "read,write,delete",
        }
    }
}

/// What a grant applies to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    /// A host and port.
    Socket(Endpoint),
    /// A file or directory. With `recursive` set the target is everything
    /// beneath `path`, but not `path` itself.
    Path { path: PathBuf, recursive: bool },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Socket(endpoint) => write!(f, "{endpoint}"),
            Target::Path {
                path,
                recursive: false,
            } => write!(f, "{}", path.display()),
            Target::Path {
                path,
                recursive: true,
            } => write!(f, "{}", path.join("**").display()),
        }
    }
}

/// A single capability granted to the sandboxed process.
///
/// Grants are built through the kind-specific constructors, which keeps
/// socket targets on network kinds and path targets on file kinds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Grant {
    kind: GrantKind,
    target: Target,
}

impl Grant {
    pub fn listen(endpoint: Endpoint) -> Self {
        Self {
            kind: GrantKind::NetworkListen,
            target: Target::Socket(endpoint),
        }
    }

    pub fn connect(endpoint: Endpoint) -> Self {
        Self {
            kind: GrantKind::NetworkConnect,
            target: Target::Socket(endpoint),
        }
    }

    pub fn read_only(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: GrantKind::FileReadOnly,
            target: Target::Path {
                path: path.into(),
                recursive: false,
            },
        }
    }

    pub fn read_write_delete(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: GrantKind::FileReadWriteDelete,
            target: Target::Path {
                path: path.into(),
                recursive: false,
            },
        }
    }

    /// Read, write and delete anything below `dir`, recursively.
    pub fn read_write_delete_tree(dir: impl Into<PathBuf>) -> Self {
        Self {
            kind: GrantKind::FileReadWriteDelete,
            target: Target::Path {
                path: dir.into(),
                recursive: true,
            },
        }
    }

    pub fn kind(&self) -> GrantKind {
        self.kind
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        match &self.target {
            Target::Socket(endpoint) => Some(endpoint),
            Target::Path { .. } => None,
        }
    }

    /// Whether the file target of this grant includes `path`.
    pub fn covers_path(&self, path: &Path) -> bool {
        match &self.target {
            Target::Path {
                path: granted,
                recursive: false,
            } => path == granted,
            Target::Path {
                path: granted,
                recursive: true,
            } => path != granted && path.starts_with(granted),
            Target::Socket(_) => false,
        }
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<17} {}", self.kind.as_str(), self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_pair_kind_and_target() {
        let grant = Grant::listen(Endpoint::new("localhost", 8000));
        assert_eq!(grant.kind(), GrantKind::NetworkListen);
        assert_eq!(grant.endpoint(), Some(&Endpoint::new("localhost", 8000)));

        let grant = Grant::read_only("/srv/app/local.ssl.jks");
        assert_eq!(grant.kind(), GrantKind::FileReadOnly);
        assert!(grant.endpoint().is_none());
    }

    #[test]
    fn test_display() {
        let tree = Grant::read_write_delete_tree("/srv/app/.hsql");
        assert_eq!(tree.target().to_string(), "/srv/app/.hsql/**");

        let connect = Grant::connect(Endpoint::new("auth.example.com", 443));
        assert_eq!(connect.to_string(), "connect           auth.example.com:443");
    }

    #[test]
    fn test_exact_path_coverage() {
        let grant = Grant::read_write_delete("/srv/app/.hsql");
        assert!(grant.covers_path(Path::new("/srv/app/.hsql")));
        assert!(!grant.covers_path(Path::new("/srv/app/.hsql/db.data")));
    }

    #[test]
    fn test_tree_coverage_excludes_root() {
        let grant = Grant::read_write_delete_tree("/srv/app/.hsql");
        assert!(grant.covers_path(Path::new("/srv/app/.hsql/db.data")));
        assert!(grant.covers_path(Path::new("/srv/app/.hsql/tmp/x.lck")));
        assert!(!grant.covers_path(Path::new("/srv/app/.hsql")));
        // Component-wise, not a string prefix.
        assert!(!grant.covers_path(Path::new("/srv/app/.hsqlx/db.data")));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(Grant::read_only("/srv/app/local.jwt.jceks")).unwrap();
        assert_eq!(json["kind"], "file_read_only");
        assert_eq!(json["target"]["type"], "path");
        assert_eq!(json["target"]["recursive"], false);
    }
}
