//! Sandbox grant policy.
//!
//! Core principle: **the sandboxed server gets exactly the grants its
//! configuration calls for, computed once before enforcement begins.**
//!
//! [`build`] reads a [`ConfigSource`] and returns a [`PolicySpec`], an
//! ordered list of [`Grant`]s. The host then hands that spec to an
//! [`Enforcer`], which owns everything platform specific.
//!
//! ```
//! use policy::{Access, Endpoint};
//! use std::collections::BTreeMap;
//!
//! let mut config = BTreeMap::new();
//! config.insert("listen.url".to_string(), "http://localhost:9090".to_string());
//!
//! let spec = policy::build(&config, "/srv/app")?;
//! assert!(spec.permits(&Access::Listen(Endpoint::new("localhost", 9090))).is_allowed());
//! # Ok::<(), policy::Error>(())
//! ```

mod builder;
mod config;
mod endpoint;
mod error;
mod grant;
mod policy;

pub use builder::{
    AUTH_SERVER_BASE_URI, DATABASE_URL, DEFAULT_LISTEN_URL, EMBEDDED_DATABASE_DIR,
    EMBEDDED_DATABASE_PREFIX, INSECURE_FAKE_SECURITY, JWT_KEY_STORE, LISTEN_URL, SSL_KEY_STORE,
    build,
};
pub use config::ConfigSource;
pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use grant::{Grant, GrantKind, Target};
pub use policy::{Access, Decision, Enforcer, PolicySpec};
