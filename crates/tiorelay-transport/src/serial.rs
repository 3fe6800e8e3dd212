use std::time::Duration;

use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::info;

use crate::error::{Result, TransportError};

/// Serial line settings for the microcontroller endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttymxc1`.
    pub device: String,
    pub baud_rate: u32,
    /// Driver-level read timeout. Independent of the relay's select tick.
    pub read_timeout: Duration,
}

impl SerialConfig {
    pub const DEFAULT_DEVICE: &'static str = "/dev/ttymxc1";
    pub const DEFAULT_BAUD_RATE: u32 = 115_200;
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

    /// Settings for `device` with the default baud rate and read timeout.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: Self::DEFAULT_DEVICE.to_string(),
            baud_rate: Self::DEFAULT_BAUD_RATE,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Open the serial device as an async byte stream.
///
/// Must be called from within a tokio runtime; the stream registers with
/// the runtime's reactor. Closing the port is dropping the stream.
pub fn open_serial(config: &SerialConfig) -> Result<SerialStream> {
    let stream = tokio_serial::new(&config.device, config.baud_rate)
        .timeout(config.read_timeout)
        .open_native_async()
        .map_err(|source| TransportError::SerialOpen {
            device: config.device.clone(),
            source,
        })?;

    info!(
        device = %config.device,
        baud = config.baud_rate,
        "opened serial device"
    );
    Ok(stream)
}
