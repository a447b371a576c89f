use thiserror::Error;

/// Top-level error type for the `octomux-api` crate.
///
/// Covers every failure mode at the device boundary: port validation,
/// HTTP transport, and payload parsing. `octomux-core` maps these into
/// its own caller-facing taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Validation ──────────────────────────────────────────────────
    /// Port number outside the matrix's fixed 1-8 domain.
    #[error("invalid port {value} (valid range {min}-{max})")]
    InvalidPort { value: u8, min: u8, max: u8 },

    // ── Transport ───────────────────────────────────────────────────
    /// The matrix answered with a non-success HTTP status.
    #[error("matrix returned HTTP {status}")]
    Http { status: u16 },

    /// Connection-level failure (refused, DNS, reset, etc.)
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// URL parsing or endpoint construction error.
    #[error("invalid matrix URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Data ────────────────────────────────────────────────────────
    /// The matrix answered 2xx but the payload was not the expected
    /// shape. Carries the raw body for debugging.
    #[error("unexpected matrix response: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Http { status } => *status >= 500,
            _ => false,
        }
    }
}
