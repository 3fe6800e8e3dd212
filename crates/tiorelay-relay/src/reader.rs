use std::io::ErrorKind;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::{RelayError, Result};
use crate::side::Side;

/// Raw bytes, exactly as one read returned them.
pub type Chunk = Bytes;

/// Why a reader task stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// The transport reported end-of-stream.
    Eof,
    /// Nobody is receiving chunks any more.
    ConsumerGone,
}

/// Spawn a read loop over `reader`, pushing each non-empty read onto a
/// private channel.
///
/// The task ends on end-of-stream or on the first read error that is not a
/// retryable interruption. What that means for the process is up to the
/// caller: the serial side treats either as fatal, the socket side only drops
/// the client.
pub fn spawn_reader<R>(
    side: Side,
    reader: R,
    buffer_size: usize,
) -> (mpsc::Receiver<Chunk>, JoinHandle<Result<ReaderExit>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    let task = tokio::spawn(read_loop(side, reader, buffer_size, tx));
    (rx, task)
}

async fn read_loop<R>(
    side: Side,
    mut reader: R,
    buffer_size: usize,
    tx: mpsc::Sender<Chunk>,
) -> Result<ReaderExit>
where
    R: AsyncRead + Unpin,
{
    let buffer_size = buffer_size.max(1);
    let mut buf = BytesMut::with_capacity(buffer_size);
    loop {
        buf.resize(buffer_size, 0);
        let read = match reader.read(&mut buf[..]).await {
            Ok(0) => {
                debug!(%side, "end of stream");
                return Ok(ReaderExit::Eof);
            }
            Ok(n) => n,
            Err(err) if is_retryable(err.kind()) => continue,
            Err(source) => return Err(RelayError::Read { side, source }),
        };

        let chunk = buf.split_to(read).freeze();
        trace!(%side, bytes = read, "read chunk");
        if tx.send(chunk).await.is_err() {
            return Ok(ReaderExit::ConsumerGone);
        }
    }
}

fn is_retryable(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock
    )
}
