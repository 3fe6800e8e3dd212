use tiorelay_relay::config::DEFAULT_GREETING;
use tiorelay_transport::{SerialConfig, UnixDomainSocket};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("tiorelay {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    let build = |value: Option<&'static str>| value.unwrap_or("unknown");
    println!("target: {}", build(option_env!("TIORELAY_BUILD_TARGET")));
    println!("profile: {}", build(option_env!("TIORELAY_BUILD_PROFILE")));
    println!("default tty: {}", SerialConfig::DEFAULT_DEVICE);
    println!("default baud: {}", SerialConfig::DEFAULT_BAUD_RATE);
    println!("default socket: {}", UnixDomainSocket::DEFAULT_PATH);
    println!("default greeting: {DEFAULT_GREETING:?}");

    Ok(SUCCESS)
}
