//! Error types for the matching core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    /// The composite key is structurally invalid: a `<THAT>`/`<TOPIC>`
    /// separator is missing, duplicated, or out of order.
    #[error("malformed composite key `{key}`: {reason}")]
    MalformedKey { key: String, reason: String },

    /// The composite key has more tokens than the configured limit.
    #[error("composite key of {length} tokens exceeds the limit of {limit}")]
    PathTooLong { length: usize, limit: usize },
}

impl GraphError {
    pub(crate) fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedKey { key: key.into(), reason: reason.into() }
    }
}
