// octomux-core: Device control client and routing resolver.
//
// Owns the connection to the physical matrix, encodes and sends switch
// commands, tracks reachability over time, and reconciles user-supplied
// identifiers against the device's configured naming. The REST surface
// in the `octomux` binary is a thin consumer of this crate.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod preset;
pub mod resolve;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{MatrixConfig, normalize_url};
pub use octomux_api::{PORT_MAX, PORT_MIN};
pub use controller::MatrixController;
pub use error::CoreError;
pub use model::{ConnectionState, LinkStatus, MatrixStatus, PortId, PortKind, RouteChange};
pub use preset::PresetOutcome;
pub use resolve::resolve_port;
