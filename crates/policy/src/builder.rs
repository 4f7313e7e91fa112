//! Derives the grant set from configuration.
//!
//! Nothing in here may log, touch the network or read files: the policy is
//! computed before the sandbox exists, and anything it needed would have
//! to be granted by the policy being computed.

use crate::{ConfigSource, Endpoint, Error, Grant, PolicySpec, Result};
use std::path::Path;

pub const LISTEN_URL: &str = "listen.url";
pub const DEFAULT_LISTEN_URL: &str = "http://localhost:8000";
pub const INSECURE_FAKE_SECURITY: &str = "insecure.fake.security";
pub const AUTH_SERVER_BASE_URI: &str = "auth.server.base.uri";
pub const DATABASE_URL: &str = "database.url";

/// Database URLs with this prefix keep their files under `<work dir>/.hsql`.
pub const EMBEDDED_DATABASE_PREFIX: &str = "jdbc:hsqldb:file:.hsql/";
pub const EMBEDDED_DATABASE_DIR: &str = ".hsql";

pub const JWT_KEY_STORE: &str = "local.jwt.jceks";
pub const SSL_KEY_STORE: &str = "local.ssl.jks";

/// Build the grant set for a server configured by `config` and running in
/// `work_dir`.
///
/// Fails on the first malformed URL; no partial policy is returned.
pub fn build(config: &dyn ConfigSource, work_dir: impl AsRef<Path>) -> Result<PolicySpec> {
    let work_dir = work_dir.as_ref();
    let mut grants = Vec::new();

    let listen = parse_url(LISTEN_URL, config.string_or(LISTEN_URL, DEFAULT_LISTEN_URL))?;
    let listen_port = listen.port();
    grants.push(Grant::listen(listen));

    // Fake security authenticates against the server's own embedded endpoint
    if config.bool_or_false(INSECURE_FAKE_SECURITY) {
        grants.push(Grant::connect(Endpoint::new("localhost", listen_port)));
    }

    if let Some(uri) = config.string(AUTH_SERVER_BASE_URI) {
        grants.push(Grant::connect(parse_url(AUTH_SERVER_BASE_URI, uri)?));
    }

    if config
        .string_or(DATABASE_URL, "")
        .starts_with(EMBEDDED_DATABASE_PREFIX)
    {
        let dir = work_dir.join(EMBEDDED_DATABASE_DIR);
        grants.push(Grant::read_write_delete(&dir));
        grants.push(Grant::read_write_delete_tree(dir));
    }

    // TODO: read the key stores before installing the sandbox and drop these grants.
    grants.push(Grant::read_only(work_dir.join(JWT_KEY_STORE)));
    grants.push(Grant::read_only(work_dir.join(SSL_KEY_STORE)));

    Ok(PolicySpec::new(grants))
}

fn parse_url(key: &'static str, value: String) -> Result<Endpoint> {
    Endpoint::from_url(&value).map_err(|reason| Error::InvalidUrl { key, value, reason })
}
