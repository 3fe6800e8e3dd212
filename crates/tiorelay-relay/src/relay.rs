use std::sync::Arc;
use std::time::Duration;

use tiorelay_map::TranslationTable;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::reader::Chunk;
use crate::side::Side;

/// Why a relay loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayExit {
    /// This side's reader stopped (end-of-stream or read error).
    LocalClosed,
    /// The opposite side dropped its end of a handoff channel.
    PeerClosed,
    /// The shutdown token was cancelled.
    Shutdown,
}

/// One side of the bridge: writes translated inbound messages to its own
/// transport and forwards raw local reads to the opposite side.
pub struct RelayLoop<W> {
    side: Side,
    writer: W,
    table: Arc<TranslationTable>,
    local: mpsc::Receiver<Chunk>,
    outbound: mpsc::Sender<Chunk>,
    tick: Duration,
    shutdown: CancellationToken,
}

impl<W> RelayLoop<W>
where
    W: AsyncWrite + Unpin,
{
    /// `table` must be the one for `side.direction()`.
    pub fn new(
        side: Side,
        writer: W,
        table: Arc<TranslationTable>,
        local: mpsc::Receiver<Chunk>,
        outbound: mpsc::Sender<Chunk>,
        tick: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        debug_assert_eq!(table.direction(), side.direction());
        Self {
            side,
            writer,
            table,
            local,
            outbound,
            tick,
            shutdown,
        }
    }

    /// Relay until this side's reader stops, the opposite side goes away,
    /// or shutdown is requested.
    ///
    /// `inbound` is borrowed so the socket side can hand it back to the
    /// supervisor between clients.
    pub async fn run(self, inbound: &mut mpsc::Receiver<Chunk>) -> RelayExit {
        let Self {
            side,
            mut writer,
            table,
            mut local,
            outbound,
            tick,
            shutdown,
        } = self;

        // A local chunk waiting for the opposite side. While it is held the
        // loop stops reading locally but keeps servicing `inbound`, so two
        // sides forwarding to each other at once cannot deadlock.
        let mut pending: Option<Chunk> = None;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return RelayExit::Shutdown,
                message = inbound.recv() => match message {
                    Some(message) => {
                        if !deliver(side, &mut writer, &table, &shutdown, &message).await {
                            return RelayExit::Shutdown;
                        }
                    }
                    None => return RelayExit::PeerClosed,
                },
                permit = outbound.reserve(), if pending.is_some() => match permit {
                    Ok(permit) => {
                        if let Some(chunk) = pending.take() {
                            trace!(%side, bytes = chunk.len(), "forwarding chunk");
                            permit.send(chunk);
                        }
                    }
                    Err(_) => return RelayExit::PeerClosed,
                },
                chunk = local.recv(), if pending.is_none() => match chunk {
                    Some(chunk) => pending = Some(chunk),
                    None => return RelayExit::LocalClosed,
                },
                _ = tokio::time::sleep(tick) => {}
            }
        }
    }
}

/// Translate and write one inbound message. Write failures are logged and
/// do not stop the loop.
///
/// Returns `false` if shutdown was requested before the write finished.
async fn deliver<W>(
    side: Side,
    writer: &mut W,
    table: &TranslationTable,
    shutdown: &CancellationToken,
    message: &[u8],
) -> bool
where
    W: AsyncWrite + Unpin,
{
    let translated = table.translate_bytes(message);
    debug!(
        %side,
        direction = %table.direction(),
        inbound = %String::from_utf8_lossy(message),
        translated = %String::from_utf8_lossy(&translated),
        "writing translated message"
    );

    let write = async {
        writer.write_all(&translated).await?;
        writer.flush().await
    };
    let written = tokio::select! {
        written = write => written,
        _ = shutdown.cancelled() => {
            debug!(%side, "shutdown while writing; message dropped");
            return false;
        }
    };
    if let Err(err) = written {
        warn!(%side, error = %err, "write failed; dropping message");
    }
    true
}
