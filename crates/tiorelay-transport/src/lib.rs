//! Transport endpoints for the relay.
//!
//! Two local byte-stream endpoints are bridged by tiorelay:
//! - a serial line to the microcontroller ([`open_serial`])
//! - a Unix domain socket the GUI process connects to ([`UnixDomainSocket`])
//!
//! Both hand back tokio streams implementing `AsyncRead + AsyncWrite`, so
//! the relay layer treats them as opaque byte pipes.

pub mod error;
pub mod serial;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use serial::{open_serial, SerialConfig};

#[cfg(unix)]
pub use uds::UnixDomainSocket;
