use std::io;
use std::sync::Arc;

use tiorelay_map::{TranslationTable, TranslationTables};
use tiorelay_transport::UnixDomainSocket;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::{RelayConfig, HANDOFF_CAPACITY};
use crate::error::{RelayError, Result};
use crate::reader::{spawn_reader, ReaderExit};
use crate::relay::{RelayExit, RelayLoop};
use crate::side::Side;
use crate::supervisor::ConnectionSupervisor;

/// The whole relay: serial side, socket side, and the supervisor between
/// them.
#[derive(Debug, Clone)]
pub struct Bridge {
    gui: Arc<TranslationTable>,
    micro: Arc<TranslationTable>,
    config: RelayConfig,
}

impl Bridge {
    pub fn with_config(tables: TranslationTables, config: RelayConfig) -> Self {
        Self {
            gui: Arc::new(tables.gui),
            micro: Arc::new(tables.micro),
            config,
        }
    }

    /// Relay between `serial` and clients of `listener` until `shutdown` is
    /// cancelled or the serial endpoint fails.
    ///
    /// Losing the serial endpoint returns [`RelayError::SerialLost`]. Either
    /// way the supervisor is stopped and the listener dropped before this
    /// returns, so the socket path is released.
    pub async fn run<S>(
        self,
        serial: S,
        listener: UnixDomainSocket,
        shutdown: CancellationToken,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (serial_read, mut serial_write) = tokio::io::split(serial);

        if let Some(greeting) = self.config.greeting.as_deref().filter(|g| !g.is_empty()) {
            serial_write
                .write_all(greeting.as_bytes())
                .await
                .map_err(RelayError::Greeting)?;
        }

        let (to_socket, from_serial) = mpsc::channel(HANDOFF_CAPACITY);
        let (to_serial, mut from_socket) = mpsc::channel(HANDOFF_CAPACITY);

        let (serial_chunks, serial_reader) =
            spawn_reader(Side::Serial, serial_read, self.config.serial_read_buffer);
        let serial_relay = RelayLoop::new(
            Side::Serial,
            serial_write,
            Arc::clone(&self.gui),
            serial_chunks,
            to_socket,
            self.config.select_tick,
            shutdown.clone(),
        );
        let mut serial_task =
            tokio::spawn(async move { serial_relay.run(&mut from_socket).await });

        let supervisor = ConnectionSupervisor::new(
            listener,
            Arc::clone(&self.micro),
            to_serial,
            from_serial,
            self.config.clone(),
            shutdown.clone(),
        );
        let supervisor_task = tokio::spawn(supervisor.run());
        info!("relay running");

        let finished = tokio::select! {
            exit = &mut serial_task => Some(exit),
            _ = shutdown.cancelled() => None,
        };
        shutdown.cancel();

        let serial_exit = match finished {
            Some(exit) => exit,
            None => serial_task.await,
        };
        let outcome = match serial_exit {
            Ok(RelayExit::LocalClosed) => Err(serial_loss(serial_reader).await),
            Ok(RelayExit::PeerClosed | RelayExit::Shutdown) => {
                serial_reader.abort();
                Ok(())
            }
            Err(join) => {
                serial_reader.abort();
                Err(RelayError::Task(join))
            }
        };

        if let Err(join) = supervisor_task.await {
            error!(error = %join, "connection supervisor failed");
        }
        match &outcome {
            Ok(()) => info!("relay stopped"),
            Err(err) => error!(error = %err, "relay stopped"),
        }
        outcome
    }
}

/// Turn a finished serial reader into the fatal error it represents.
async fn serial_loss(reader: JoinHandle<Result<ReaderExit>>) -> RelayError {
    match reader.await {
        Ok(Ok(_)) => RelayError::SerialLost(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "serial endpoint closed",
        )),
        Ok(Err(RelayError::Read { source, .. })) => RelayError::SerialLost(source),
        Ok(Err(other)) => other,
        Err(join) => RelayError::Task(join),
    }
}
