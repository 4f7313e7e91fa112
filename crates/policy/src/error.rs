//! Policy error types.

use thiserror::Error;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A configuration value used as a grant target is not a usable URL.
    ///
    /// Building a policy aborts on the first such value; there is no
    /// partially built policy.
    #[error("invalid URL in {key} ({value:?}): {reason}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
