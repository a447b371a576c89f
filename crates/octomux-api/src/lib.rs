// octomux-api: Async Rust client for the HDMI matrix's CGI control plane

pub mod command;
pub mod device;
pub mod error;
pub mod transport;

pub use command::{PORT_MAX, PORT_MIN, switch_command};
pub use device::MatrixDevice;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
