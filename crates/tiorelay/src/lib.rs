//! Serial to Unix socket relay with message key translation.
//!
//! tiorelay sits between a microcontroller on a serial line and a GUI
//! process on a Unix domain socket, rewriting `key=value` message keys in
//! each direction from a translation file.
//!
//! # Crate Structure
//!
//! - [`transport`] — Serial and Unix domain socket endpoints
//! - [`map`] — Translation tables and the translation file loader
//! - [`relay`] — Readers, relay loops, connection supervisor, and [`relay::Bridge`]

/// Re-export transport types.
pub mod transport {
    pub use tiorelay_transport::*;
}

/// Re-export translation table types.
pub mod map {
    pub use tiorelay_map::*;
}

/// Re-export relay engine types.
pub mod relay {
    pub use tiorelay_relay::*;
}
