mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "tiorelay",
    version,
    about = "Relay between a serial microcontroller link and a GUI socket"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn run_defaults_match_device_setup() {
        let cli = Cli::try_parse_from(["tiorelay", "run"]).expect("run args should parse");
        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.tty, "/dev/ttymxc1");
        assert_eq!(args.baud, 115_200);
        assert_eq!(args.map, Path::new("translate.txt"));
        assert_eq!(args.socket, Path::new("/tmp/tioSocket"));
        assert_eq!(args.greeting, "Hello!");
    }

    #[test]
    fn parses_translate_with_direction() {
        let cli = Cli::try_parse_from([
            "tiorelay",
            "translate",
            "sl=10",
            "-d",
            "micro",
            "--map",
            "/etc/tio/translate.txt",
        ])
        .expect("translate args should parse");
        let Command::Translate(args) = cli.command else {
            panic!("expected translate subcommand");
        };
        assert_eq!(args.message, "sl=10");
        assert_eq!(args.direction, cmd::DirectionArg::Micro);
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = Cli::try_parse_from(["tiorelay", "translate", "x", "-d", "sideways"])
            .expect_err("unknown direction should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn parses_send_with_wait() {
        let cli = Cli::try_parse_from([
            "tiorelay",
            "send",
            "meter.value=5",
            "--socket",
            "/tmp/test.sock",
            "--wait",
            "--format",
            "json",
        ])
        .expect("send args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        let Command::Send(args) = cli.command else {
            panic!("expected send subcommand");
        };
        assert!(args.wait);
        assert_eq!(args.wait_timeout, "5s");
    }
}
