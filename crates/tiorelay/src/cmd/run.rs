use tiorelay_map::{load_from_path, TranslationTables};
use tiorelay_relay::{Bridge, RelayConfig};
use tiorelay_transport::{open_serial, SerialConfig, UnixDomainSocket};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

use crate::cmd::{parse_duration, runtime, RunArgs};
use crate::exit::{io_error, map_error, relay_error, transport_error, CliResult, SUCCESS};

pub fn run(args: RunArgs) -> CliResult<i32> {
    let read_timeout = parse_duration(&args.read_timeout)?;
    // Refuse to start with no translation tables.
    let tables =
        load_from_path(&args.map).map_err(|err| map_error("translation map load failed", err))?;

    let serial = SerialConfig::new(args.tty.clone())
        .with_baud_rate(args.baud)
        .with_read_timeout(read_timeout);
    let config = RelayConfig {
        greeting: Some(args.greeting.clone()).filter(|g| !g.is_empty()),
        ..RelayConfig::default()
    };

    runtime()?.block_on(serve(args, serial, tables, config))
}

async fn serve(
    args: RunArgs,
    serial: SerialConfig,
    tables: TranslationTables,
    config: RelayConfig,
) -> CliResult<i32> {
    let serial = open_serial(&serial).map_err(|err| transport_error("serial open failed", err))?;
    let listener = UnixDomainSocket::bind(&args.socket)
        .map_err(|err| transport_error("socket bind failed", err))?;

    let shutdown = CancellationToken::new();
    install_signal_handler(shutdown.clone())?;

    Bridge::with_config(tables, config)
        .run(serial, listener, shutdown)
        .await
        .map_err(|err| relay_error("relay failed", err))?;

    Ok(SUCCESS)
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
fn install_signal_handler(shutdown: CancellationToken) -> CliResult<()> {
    let setup_err = |err: std::io::Error| io_error("signal handler setup failed", err);
    let mut interrupt = signal(SignalKind::interrupt()).map_err(setup_err)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(setup_err)?;

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
            _ = shutdown.cancelled() => return,
        };
        tracing::info!(signal = name, "closing up");
        shutdown.cancel();
    });
    Ok(())
}
