// REST request/response bodies.
//
// Field names are the public API contract; changing them breaks
// Home Assistant integrations built against this surface.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use octomux_core::{PortId, PresetOutcome, RouteChange};

/// Service info served at the root.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Readiness payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` (connected), `degraded` (not yet contacted), or `error`.
    pub status: &'static str,
    pub matrix_connected: bool,
    pub last_health_check: Option<DateTime<Utc>>,
    pub uptime_seconds: f64,
}

/// One port with its display name.
#[derive(Debug, Serialize)]
pub struct PortInfo {
    pub number: u8,
    pub name: String,
}

/// All inputs, plus a bare name list for dropdown options.
#[derive(Debug, Serialize)]
pub struct InputListResponse {
    pub inputs: Vec<PortInfo>,
    pub names: Vec<String>,
}

/// All outputs, plus a bare name list for dropdown options.
#[derive(Debug, Serialize)]
pub struct OutputListResponse {
    pub outputs: Vec<PortInfo>,
    pub names: Vec<String>,
}

/// Routing for a single output. `input` is absent when unknown.
#[derive(Debug, Serialize)]
pub struct OutputRouting {
    pub output: u8,
    pub output_name: Option<String>,
    pub input: Option<u8>,
    pub input_name: Option<String>,
}

/// Full routing table with the current name maps.
#[derive(Debug, Serialize)]
pub struct RoutingStateResponse {
    pub outputs: Vec<OutputRouting>,
    pub input_names: BTreeMap<u8, String>,
    pub output_names: BTreeMap<u8, String>,
}

/// Set routing for a single output; the input may be a number or a
/// configured name.
#[derive(Debug, Deserialize)]
pub struct SetRoutingRequest {
    pub input: PortId,
}

#[derive(Debug, Serialize)]
pub struct SetRoutingResponse {
    #[serde(flatten)]
    pub route: RouteChange,
    pub success: bool,
    pub message: String,
}

/// Batch routing request. Keys are output identifiers (number or name);
/// values are input identifiers.
#[derive(Debug, Deserialize)]
pub struct PresetRequest {
    pub mappings: BTreeMap<String, PortId>,
}

#[derive(Debug, Serialize)]
pub struct PresetResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: PresetOutcome,
}
