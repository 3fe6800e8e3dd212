use std::time::Duration;

/// Default relay select tick.
pub const DEFAULT_SELECT_TICK: Duration = Duration::from_millis(5);
/// Default bounded wait for a GUI client per accept attempt.
pub const DEFAULT_ACCEPT_DEADLINE: Duration = Duration::from_millis(100);
/// Default serial read chunk size.
pub const DEFAULT_SERIAL_READ_BUFFER: usize = 128;
/// Default socket read chunk size.
pub const DEFAULT_SOCKET_READ_BUFFER: usize = 512;
/// Default message written to the microcontroller on startup.
pub const DEFAULT_GREETING: &str = "Hello!";

/// Handoff channels hold at most one chunk; producers wait for the consumer.
pub(crate) const HANDOFF_CAPACITY: usize = 1;

/// Controls relay timing and buffer sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Upper bound on one relay select wait.
    pub select_tick: Duration,
    /// Upper bound on one accept wait while no client is attached.
    pub accept_deadline: Duration,
    pub serial_read_buffer: usize,
    pub socket_read_buffer: usize,
    /// Written once to the serial endpoint before relaying starts.
    pub greeting: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            select_tick: DEFAULT_SELECT_TICK,
            accept_deadline: DEFAULT_ACCEPT_DEADLINE,
            serial_read_buffer: DEFAULT_SERIAL_READ_BUFFER,
            socket_read_buffer: DEFAULT_SOCKET_READ_BUFFER,
            greeting: Some(DEFAULT_GREETING.to_string()),
        }
    }
}
