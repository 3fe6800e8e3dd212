use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use tiorelay_map::Direction;
use tiorelay_relay::config::DEFAULT_GREETING;
use tiorelay_transport::{SerialConfig, UnixDomainSocket};

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod check;
pub mod run;
pub mod send;
pub mod sweep;
pub mod translate;
pub mod version;

const DEFAULT_MAP_PATH: &str = "translate.txt";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Relay between the serial device and the GUI socket.
    Run(RunArgs),
    /// Load a translation file and print its tables.
    Check(CheckArgs),
    /// Translate one message with a translation file.
    Translate(TranslateArgs),
    /// Send a message to the relay socket as a GUI client.
    Send(SendArgs),
    /// Write slider ramps to a serial device.
    Sweep(SweepArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        Command::Check(args) => check::run(args, format),
        Command::Translate(args) => translate::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Sweep(args) => sweep::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Serial device to open.
    #[arg(long, default_value = SerialConfig::DEFAULT_DEVICE)]
    pub tty: String,
    /// Serial baud rate.
    #[arg(long, default_value_t = SerialConfig::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Serial driver read timeout (e.g. 500ms, 1s).
    #[arg(long, default_value = "500ms")]
    pub read_timeout: String,
    /// Translation file.
    #[arg(long, default_value = DEFAULT_MAP_PATH)]
    pub map: PathBuf,
    /// Socket path the GUI connects to.
    #[arg(long, default_value = UnixDomainSocket::DEFAULT_PATH)]
    pub socket: PathBuf,
    /// Written to the serial device on startup. Empty disables.
    #[arg(long, default_value = DEFAULT_GREETING)]
    pub greeting: String,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Translation file.
    #[arg(default_value = DEFAULT_MAP_PATH)]
    pub map: PathBuf,
}

#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Message to translate, e.g. `meter.value=5`.
    pub message: String,
    /// Which direction's table to apply.
    #[arg(long, short = 'd', value_enum, default_value = "gui")]
    pub direction: DirectionArg,
    /// Translation file.
    #[arg(long, default_value = DEFAULT_MAP_PATH)]
    pub map: PathBuf,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Raw message to write.
    pub message: String,
    /// Relay socket path.
    #[arg(long, default_value = UnixDomainSocket::DEFAULT_PATH)]
    pub socket: PathBuf,
    /// Wait for one reply chunk and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for a reply when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Serial device to open.
    #[arg(long, default_value = SerialConfig::DEFAULT_DEVICE)]
    pub tty: String,
    /// Serial baud rate.
    #[arg(long, default_value_t = SerialConfig::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Number of up/down ramps.
    #[arg(long, default_value_t = 10)]
    pub cycles: u32,
    /// Pause between messages (e.g. 50ms).
    #[arg(long, default_value = "50ms")]
    pub step_delay: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    /// GUI to microcontroller.
    Gui,
    /// Microcontroller to GUI.
    Micro,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Gui => Direction::Gui,
            DirectionArg::Micro => Direction::Micro,
        }
    }
}

/// Parse `500ms`, `2s`, or bare seconds.
pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

/// Runtime for commands that drive async transports.
pub(crate) fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("runtime setup failed", err))
}
