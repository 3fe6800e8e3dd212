//! Duplex relay between a serial-line microcontroller and a GUI process on a
//! Unix domain socket.
//!
//! ```text
//! serial reader -> serial relay --(serial->socket)--> socket relay -> micro table -> GUI
//! GUI reader    -> socket relay --(socket->serial)--> serial relay -> gui table   -> serial
//! ```
//!
//! Each side runs a [`RelayLoop`] fed by its own [`spawn_reader`] task. The
//! two sides hand raw chunks to each other over a pair of single-slot
//! directional channels; the receiving side translates before writing. The
//! [`ConnectionSupervisor`] owns the socket side, serving one GUI client at a
//! time and discarding serial traffic while nobody is attached.

pub mod bridge;
pub mod config;
pub mod error;
pub mod reader;
pub mod relay;
pub mod side;
pub mod supervisor;

pub use bridge::Bridge;
pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use reader::{spawn_reader, Chunk, ReaderExit};
pub use relay::{RelayExit, RelayLoop};
pub use side::Side;
pub use supervisor::ConnectionSupervisor;
