// ── Core error types ──
//
// Caller-facing errors from octomux-core. Consumers never see reqwest
// errors directly; the `From<octomux_api::Error>` impl translates
// transport-layer failures into this taxonomy.

use thiserror::Error;

use crate::model::PortKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Caller errors ────────────────────────────────────────────────
    /// Port identifier outside the matrix's fixed 1-8 domain.
    #[error("invalid {kind} number: {value} (must be 1-8)")]
    InvalidPort { kind: PortKind, value: i64 },

    /// A name identifier matched none of the device's configured names.
    #[error("{kind} name \"{value}\" not found. Available {kind}s: {}", quoted(.available))]
    NameNotFound {
        kind: PortKind,
        value: String,
        available: Vec<String>,
    },

    // ── Lifecycle errors ─────────────────────────────────────────────
    /// The client was used before `start()` or after `stop()`.
    #[error("matrix client not initialized")]
    NotInitialized,

    // ── Transport errors (environmental, retryable) ──────────────────
    /// The matrix answered with a non-success HTTP status.
    #[error("matrix returned HTTP {status}")]
    Http { status: u16 },

    /// Connection-level failure (refused, DNS, reset, etc.)
    #[error("matrix request failed: {reason}")]
    Network { reason: String },

    /// Request exceeded the configured timeout.
    #[error("matrix request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` for environmental failures worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::Http { status: 500..=599 }
        )
    }

    /// Returns `true` for errors caused by the caller's request
    /// (rejectable without touching the device).
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidPort { .. } | Self::NameNotFound { .. })
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("\"{n}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<octomux_api::Error> for CoreError {
    fn from(err: octomux_api::Error) -> Self {
        match err {
            octomux_api::Error::Http { status } => Self::Http { status },
            octomux_api::Error::Network(e) => Self::Network {
                reason: e.to_string(),
            },
            octomux_api::Error::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            octomux_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid URL: {e}"),
            },
            octomux_api::Error::ClientBuild(reason) => Self::Config {
                message: format!("failed to build HTTP client: {reason}"),
            },
            // Commands are encoded from already-resolved port numbers, so
            // these two only surface through direct octomux-api use.
            octomux_api::Error::InvalidPort { .. } | octomux_api::Error::Deserialization { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_not_found_lists_available_names() {
        let err = CoreError::NameNotFound {
            kind: PortKind::Input,
            value: "Betamax".into(),
            available: vec!["Apple TV".into(), "PlayStation 5".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"Betamax\""), "got: {msg}");
        assert!(msg.contains("\"Apple TV\", \"PlayStation 5\""), "got: {msg}");
    }

    #[test]
    fn invalid_port_names_the_kind() {
        let err = CoreError::InvalidPort {
            kind: PortKind::Output,
            value: 42,
        };
        assert_eq!(err.to_string(), "invalid output number: 42 (must be 1-8)");
    }
}
