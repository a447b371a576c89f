// ── Runtime connection configuration ──
//
// Describes *how* to reach the matrix. Built by the binary from loaded
// settings and handed in; core never reads files or the environment.

use std::time::Duration;

use url::Url;

use crate::error::CoreError;

/// Configuration for a single matrix session.
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    /// Device web-interface root, scheme included.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Verify TLS certificates (only meaningful behind an HTTPS proxy).
    pub verify_tls: bool,
    /// Interval between background health probes. Zero disables the
    /// monitor.
    pub health_interval: Duration,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://192.168.1.50").expect("default URL is valid"),
            timeout: Duration::from_secs(5),
            verify_tls: false,
            health_interval: Duration::from_secs(30),
        }
    }
}

impl MatrixConfig {
    /// Build a config for the given address with default tuning.
    pub fn for_url(raw: &str) -> Result<Self, CoreError> {
        Ok(Self {
            base_url: normalize_url(raw)?,
            ..Self::default()
        })
    }
}

/// Normalize a user-supplied matrix address into a full base URL.
///
/// Bare hosts get an `http://` scheme; trailing slashes are dropped so
/// endpoint joining stays uniform.
pub fn normalize_url(raw: &str) -> Result<Url, CoreError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };

    Url::parse(&with_scheme).map_err(|e| CoreError::Config {
        message: format!("invalid matrix URL \"{raw}\": {e}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_scheme() {
        let url = normalize_url("matrix.local").unwrap();
        assert_eq!(url.as_str(), "http://matrix.local/");
    }

    #[test]
    fn existing_scheme_is_kept() {
        let url = normalize_url("https://matrix.local").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let url = normalize_url("http://matrix.local/").unwrap();
        assert_eq!(url.join("form-system-cmd.cgi").unwrap().path(), "/form-system-cmd.cgi");
    }

    #[test]
    fn garbage_is_a_config_error() {
        let err = normalize_url("http://").unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }
}
