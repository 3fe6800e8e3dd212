use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Target prefix shared by every tiorelay crate.
const RELAY_TARGET: &str = "tiorelay";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// `level` applies to the relay crates. Serial driver and runtime crates stay
/// at warn unless tracing everything.
fn targets(level: LogLevel) -> Targets {
    let others = match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Error => LevelFilter::ERROR,
        _ => LevelFilter::WARN,
    };
    Targets::new()
        .with_default(others)
        .with_target(RELAY_TARGET, level.as_filter())
}

/// Install the stderr subscriber. Relay traffic is logged at debug, so the
/// default `info` level only shows lifecycle events.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let verbose = matches!(level, LogLevel::Debug | LogLevel::Trace);
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(verbose);
    let registry = tracing_subscriber::registry().with(targets(level));

    match format {
        LogFormat::Text => {
            let _ = registry.with(layer).try_init();
        }
        LogFormat::Json => {
            let _ = registry.with(layer.json()).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn relay_crates_follow_requested_level() {
        let filter = targets(LogLevel::Debug);
        assert!(filter.would_enable("tiorelay_relay::relay", &Level::DEBUG));
        assert!(filter.would_enable("tiorelay_map::table", &Level::DEBUG));
        assert!(!filter.would_enable("tiorelay_relay::reader", &Level::TRACE));
    }

    #[test]
    fn dependencies_stay_quiet_below_trace() {
        let filter = targets(LogLevel::Debug);
        assert!(!filter.would_enable("mio::poll", &Level::DEBUG));
        assert!(filter.would_enable("mio::poll", &Level::WARN));

        let filter = targets(LogLevel::Trace);
        assert!(filter.would_enable("mio::poll", &Level::TRACE));
    }

    #[test]
    fn error_level_silences_everything_else() {
        let filter = targets(LogLevel::Error);
        assert!(!filter.would_enable("tiorelay", &Level::WARN));
        assert!(!filter.would_enable("tokio_serial", &Level::WARN));
        assert!(filter.would_enable("tokio_serial", &Level::ERROR));
    }
}
