// Raw HTTP client for the matrix CGI endpoints
//
// Wraps `reqwest::Client` with endpoint construction, form encoding, and
// lenient payload parsing. This layer is stateless: connection tracking
// and fallback behavior live in `octomux-core`.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::command::PORT_MAX;
use crate::error::Error;
use crate::transport::TransportConfig;

/// CGI endpoint accepting a `cmd` form field to perform a switch.
const CMD_ENDPOINT: &str = "form-system-cmd.cgi";
/// CGI endpoint answering name/status queries with a small JSON object.
const INFO_ENDPOINT: &str = "form-system-info.cgi";

/// Raw HTTP client for the matrix's CGI control plane.
///
/// Cheap to clone; the underlying `reqwest::Client` is connection-pooled
/// and tolerates concurrent in-flight requests.
#[derive(Debug, Clone)]
pub struct MatrixDevice {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl MatrixDevice {
    /// Create a new device client from a [`TransportConfig`].
    ///
    /// The `base_url` should be the device web-interface root
    /// (e.g. `http://192.168.1.50`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a device client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
        }
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send a raw command string and return the device's response body.
    ///
    /// `POST form-system-cmd.cgi` with form field `cmd`. Any non-2xx
    /// status is an [`Error::Http`]; connection failures map to
    /// [`Error::Network`] or [`Error::Timeout`].
    pub async fn send_command(&self, cmd: &str) -> Result<String, Error> {
        let url = self.endpoint(CMD_ENDPOINT)?;
        debug!(%cmd, %url, "sending matrix command");

        let resp = self
            .http
            .post(url)
            .form(&[("cmd", cmd)])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| self.request_error(e))
    }

    /// Lightweight reachability probe: GET the device base address.
    pub async fn probe(&self) -> Result<(), Error> {
        let resp = self
            .http
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Http {
                status: status.as_u16(),
            })
        }
    }

    // ── Info queries ─────────────────────────────────────────────────

    /// Fetch the configured input names, in port order.
    ///
    /// `POST form-system-info.cgi` with `in_name=0`, answered as
    /// `{"in_name": ["name1", ...]}`.
    pub async fn input_names(&self) -> Result<Vec<String>, Error> {
        self.name_list("in_name").await
    }

    /// Fetch the configured output names, in port order.
    pub async fn output_names(&self) -> Result<Vec<String>, Error> {
        self.name_list("out_name").await
    }

    async fn name_list(&self, field: &str) -> Result<Vec<String>, Error> {
        let body = self.info_query(field).await?;

        let value: Value = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })?;

        let Some(list) = value.get(field).and_then(Value::as_array) else {
            return Err(Error::Deserialization {
                message: format!("missing `{field}` list"),
                body,
            });
        };

        debug!(field, count = list.len(), "retrieved name list");
        Ok(list
            .iter()
            .take(usize::from(PORT_MAX))
            .map(|v| v.as_str().unwrap_or_default().to_owned())
            .collect())
    }

    /// Best-effort routing-table query.
    ///
    /// Returns the `data.video.vsw` array (0-indexed input per output)
    /// when the firmware exposes it, `None` when it does not. The request
    /// field mirrors the verified name queries; unconfirmed on hardware.
    pub async fn video_status(&self) -> Result<Option<Vec<i64>>, Error> {
        let body = self.info_query("vsw").await?;

        let value: Value = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })?;

        Ok(value
            .pointer("/data/video/vsw")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_i64).collect()))
    }

    async fn info_query(&self, field: &str) -> Result<String, Error> {
        let url = self.endpoint(INFO_ENDPOINT)?;
        debug!(field, %url, "querying matrix info");

        let resp = self
            .http
            .post(url)
            .form(&[(field, "0")])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| self.request_error(e))
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn endpoint(&self, name: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(name)?)
    }

    fn request_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Network(err)
        }
    }
}
