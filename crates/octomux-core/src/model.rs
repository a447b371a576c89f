// ── Core domain types ──
//
// Connection tracking, port identity, and routing results. These are the
// types the REST layer serializes; keep field names stable.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use octomux_api::{PORT_MAX, PORT_MIN};

// ── ConnectionState ─────────────────────────────────────────────────

/// Matrix connection state observable by consumers.
///
/// Transitions only on transport outcomes (commands and health probes),
/// never directly by callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Never yet contacted.
    #[default]
    Disconnected,
    /// Last contact succeeded.
    Connected,
    /// Last contact failed.
    Error,
}

// ── LinkStatus ──────────────────────────────────────────────────────

/// The connection tracker triple.
///
/// Updated as a unit through a single `watch` write per transition, so
/// readers never observe a torn (state, timestamp, response) combination.
#[derive(Debug, Clone, Default)]
pub struct LinkStatus {
    pub state: ConnectionState,
    /// Timestamp of the last *successful command* (health probes do not
    /// count).
    pub last_command: Option<DateTime<Utc>>,
    /// Last raw response body from the matrix.
    pub last_response: Option<String>,
}

// ── PortKind ────────────────────────────────────────────────────────

/// Input or output side of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Input,
    Output,
}

impl PortKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }

    /// Synthesized display name used when the device's naming is
    /// unavailable.
    pub fn default_name(self, port: u8) -> String {
        match self {
            Self::Input => format!("HDMI {port}"),
            Self::Output => format!("Output {port}"),
        }
    }

    /// A full 1-8 name table of synthesized defaults.
    pub fn default_names(self) -> BTreeMap<u8, String> {
        (PORT_MIN..=PORT_MAX)
            .map(|port| (port, self.default_name(port)))
            .collect()
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── PortId ──────────────────────────────────────────────────────────

/// User-supplied port identifier: a port number or a device-assigned
/// name.
///
/// Untagged serde representation, so REST payloads accept `3` as well as
/// `"Apple TV"`. `Display` preserves the caller's spelling — batch
/// failures are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortId {
    Number(u8),
    Name(String),
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

impl From<u8> for PortId {
    fn from(n: u8) -> Self {
        Self::Number(n)
    }
}

impl From<String> for PortId {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

impl From<&str> for PortId {
    fn from(s: &str) -> Self {
        Self::Name(s.to_owned())
    }
}

// ── Routing results ─────────────────────────────────────────────────

/// One resolved routing edge, with display names for both ends.
#[derive(Debug, Clone, Serialize)]
pub struct RouteChange {
    pub output: u8,
    pub output_name: String,
    pub input: u8,
    pub input_name: String,
}

/// Aggregate status snapshot for the API surface.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixStatus {
    pub connection: ConnectionState,
    pub url: String,
    pub last_command: Option<DateTime<Utc>>,
    pub last_response: Option<String>,
}
