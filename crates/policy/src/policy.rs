//! The built grant set and the hand-off to enforcement.

use crate::{Endpoint, Grant, GrantKind};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// The complete, ordered set of grants for one process.
///
/// Only [`build`](crate::build) creates one, and nothing mutates it
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PolicySpec {
    grants: Vec<Grant>,
}

/// Something the sandboxed process might attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Listen(Endpoint),
    Connect(Endpoint),
    Read(PathBuf),
    Write(PathBuf),
    Delete(PathBuf),
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Listen(endpoint) => write!(f, "listen on {endpoint}"),
            Access::Connect(endpoint) => write!(f, "connect to {endpoint}"),
            Access::Read(path) => write!(f, "read {}", path.display()),
            Access::Write(path) => write!(f, "write {}", path.display()),
            Access::Delete(path) => write!(f, "delete {}", path.display()),
        }
    }
}

/// Result of a coverage check.
#[derive(Debug, Clone)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// The enforcement side of the sandbox.
///
/// The host calls [`install`](Enforcer::install) once, after the policy
/// is built. Implementations translate each grant into whatever their
/// platform understands and then turn enforcement on.
pub trait Enforcer {
    type Error: std::error::Error;

    fn install(&mut self, policy: &PolicySpec) -> Result<(), Self::Error>;
}

impl PolicySpec {
    pub(crate) fn new(grants: Vec<Grant>) -> Self {
        Self { grants }
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Grant> {
        self.grants.iter()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn contains(&self, grant: &Grant) -> bool {
        self.grants.contains(grant)
    }

    /// The grants as a set, for order-independent comparison.
    pub fn grant_set(&self) -> BTreeSet<&Grant> {
        self.grants.iter().collect()
    }

    /// Check whether some grant covers `access`.
    ///
    /// This answers questions about the policy; it is not an enforcement
    /// mechanism.
    pub fn permits(&self, access: &Access) -> Decision {
        let allowed = match access {
            Access::Listen(endpoint) => self.has_socket(GrantKind::NetworkListen, endpoint),
            Access::Connect(endpoint) => self.has_socket(GrantKind::NetworkConnect, endpoint),
            Access::Read(path) => self.grants.iter().any(|g| {
                matches!(
                    g.kind(),
                    GrantKind::FileReadOnly | GrantKind::FileReadWriteDelete
                ) && g.covers_path(path)
            }),
            Access::Write(path) | Access::Delete(path) => self
                .grants
                .iter()
                .any(|g| g.kind() == GrantKind::FileReadWriteDelete && g.covers_path(path)),
        };

        if allowed {
            Decision::Allow
        } else {
            Decision::Deny {
                reason: format!("no grant allows {access}"),
            }
        }
    }

    fn has_socket(&self, kind: GrantKind, endpoint: &Endpoint) -> bool {
        self.grants
            .iter()
            .any(|g| g.kind() == kind && g.endpoint().is_some_and(|e| e.matches(endpoint)))
    }
}

impl<'a> IntoIterator for &'a PolicySpec {
    type Item = &'a Grant;
    type IntoIter = std::slice::Iter<'a, Grant>;

    fn into_iter(self) -> Self::IntoIter {
        self.grants.iter()
    }
}
