use crate::side::Side;

/// Errors that can occur while relaying.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A transport read failed with something other than end-of-stream.
    #[error("{side} read failed: {source}")]
    Read {
        side: Side,
        source: std::io::Error,
    },

    /// The startup greeting could not be written to the serial endpoint.
    #[error("failed to write greeting to serial endpoint: {0}")]
    Greeting(std::io::Error),

    /// The serial endpoint is gone; the relay cannot continue in this process.
    #[error("serial endpoint lost: {0}")]
    SerialLost(#[source] std::io::Error),

    /// A relay task panicked or was cancelled by the runtime.
    #[error("relay task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, RelayError>;
