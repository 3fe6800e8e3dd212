use std::sync::Arc;

use tiorelay_map::TranslationTable;
use tiorelay_transport::UnixDomainSocket;
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::reader::{spawn_reader, Chunk, ReaderExit};
use crate::relay::{RelayExit, RelayLoop};
use crate::side::Side;

/// Accepts GUI clients one at a time and runs the socket-side relay for
/// each.
///
/// While no client is attached, chunks the serial side forwards are
/// discarded so the serial relay never waits on a missing consumer.
pub struct ConnectionSupervisor {
    listener: UnixDomainSocket,
    table: Arc<TranslationTable>,
    to_serial: mpsc::Sender<Chunk>,
    from_serial: mpsc::Receiver<Chunk>,
    config: RelayConfig,
    shutdown: CancellationToken,
    next_client_id: u64,
}

impl ConnectionSupervisor {
    /// `table` is the microcontroller-to-GUI table.
    pub fn new(
        listener: UnixDomainSocket,
        table: Arc<TranslationTable>,
        to_serial: mpsc::Sender<Chunk>,
        from_serial: mpsc::Receiver<Chunk>,
        config: RelayConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            listener,
            table,
            to_serial,
            from_serial,
            config,
            shutdown,
            next_client_id: 1,
        }
    }

    /// Accept and serve clients until shutdown. The listener (and its socket
    /// file) is released when this returns.
    pub async fn run(mut self) {
        while !self.shutdown.is_cancelled() {
            let accepted = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                Some(chunk) = self.from_serial.recv() => {
                    debug!(bytes = chunk.len(), "no client attached; discarding serial data");
                    continue;
                }
                accepted = self.listener.accept_with_deadline(self.config.accept_deadline) => accepted,
            };

            match accepted {
                Ok(None) => continue,
                Ok(Some(stream)) => self.serve(stream).await,
                Err(err) => warn!(error = %err, "accept failed"),
            }
        }
        info!(path = ?self.listener.path(), "connection supervisor stopped");
    }

    /// Relay for one client until it disconnects. No other client is
    /// accepted meanwhile.
    async fn serve(&mut self, stream: UnixStream) {
        let client = self.next_client_id;
        self.next_client_id = self.next_client_id.saturating_add(1);
        info!(client, "gui client connected");

        let (read_half, write_half) = stream.into_split();
        let (chunks, reader) = spawn_reader(Side::Socket, read_half, self.config.socket_read_buffer);
        let relay = RelayLoop::new(
            Side::Socket,
            write_half,
            Arc::clone(&self.table),
            chunks,
            self.to_serial.clone(),
            self.config.select_tick,
            self.shutdown.clone(),
        );

        let exit = relay.run(&mut self.from_serial).await;
        if exit != RelayExit::LocalClosed {
            reader.abort();
        }

        match reader.await {
            Ok(Ok(ReaderExit::Eof)) => info!(client, "gui client disconnected"),
            Ok(Ok(ReaderExit::ConsumerGone)) => info!(client, ?exit, "gui client released"),
            Ok(Err(err)) => warn!(client, error = %err, "gui client connection dropped"),
            Err(join) if join.is_cancelled() => info!(client, ?exit, "gui client released"),
            Err(join) => warn!(client, error = %join, "gui client reader failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use bytes::Bytes;
    use tiorelay_map::Direction;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::time::timeout;

    use super::*;

    const WAIT: Duration = Duration::from_secs(3);

    fn make_sock_path(tag: &str) -> PathBuf {
        let dir = PathBuf::from(format!(
            "/tmp/tior-sup-{}-{}-{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir.join("gui.sock")
    }

    fn cleanup(sock_path: &Path) {
        if let Some(parent) = sock_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    struct Running {
        to_socket: mpsc::Sender<Chunk>,
        from_socket: mpsc::Receiver<Chunk>,
        shutdown: CancellationToken,
        task: tokio::task::JoinHandle<()>,
    }

    fn start(sock_path: &Path) -> Running {
        let listener = UnixDomainSocket::bind(sock_path).expect("listener should bind");
        let mut table = TranslationTable::new(Direction::Micro);
        table.add("sl", "slider");

        let (to_socket, from_serial) = mpsc::channel(1);
        let (to_serial, from_socket) = mpsc::channel(1);
        let shutdown = CancellationToken::new();
        let supervisor = ConnectionSupervisor::new(
            listener,
            Arc::new(table),
            to_serial,
            from_serial,
            RelayConfig::default(),
            shutdown.clone(),
        );

        Running {
            to_socket,
            from_socket,
            shutdown,
            task: tokio::spawn(supervisor.run()),
        }
    }

    #[tokio::test]
    async fn drains_serial_data_without_client() {
        let sock_path = make_sock_path("drain");
        let running = start(&sock_path);

        for i in 0..50 {
            timeout(WAIT, running.to_socket.send(Bytes::from(format!("sl={i}\n"))))
                .await
                .expect("idle supervisor must keep consuming")
                .unwrap();
        }

        running.shutdown.cancel();
        running.task.await.unwrap();
        cleanup(&sock_path);
    }

    #[tokio::test]
    async fn relays_both_directions_for_connected_client() {
        let sock_path = make_sock_path("relay");
        let mut running = start(&sock_path);

        let mut client = UnixDomainSocket::connect(&sock_path).await.unwrap();
        client.write_all(b"hello").await.unwrap();
        let from_gui = timeout(WAIT, running.from_socket.recv()).await.unwrap();
        assert_eq!(from_gui.as_deref(), Some(&b"hello"[..]));

        running.to_socket.send(Bytes::from_static(b"sl=70")).await.unwrap();
        let mut buf = [0u8; 9];
        timeout(WAIT, client.read_exact(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf, b"slider=70");

        running.shutdown.cancel();
        running.task.await.unwrap();
        assert!(!sock_path.exists(), "socket file should be removed");
        cleanup(&sock_path);
    }

    #[tokio::test]
    async fn second_client_waits_for_first_to_disconnect() {
        let sock_path = make_sock_path("single");
        let mut running = start(&sock_path);

        let mut first = UnixDomainSocket::connect(&sock_path).await.unwrap();
        first.write_all(b"first").await.unwrap();
        let got = timeout(WAIT, running.from_socket.recv()).await.unwrap();
        assert_eq!(got.as_deref(), Some(&b"first"[..]));

        let mut second = UnixDomainSocket::connect(&sock_path).await.unwrap();
        second.write_all(b"second").await.unwrap();
        assert!(
            timeout(Duration::from_millis(300), running.from_socket.recv())
                .await
                .is_err(),
            "second client must not be serviced while the first is attached"
        );

        drop(first);
        let got = timeout(WAIT, running.from_socket.recv()).await.unwrap();
        assert_eq!(got.as_deref(), Some(&b"second"[..]));

        running.shutdown.cancel();
        running.task.await.unwrap();
        cleanup(&sock_path);
    }

    #[tokio::test]
    async fn returns_to_accepting_after_disconnect() {
        let sock_path = make_sock_path("reaccept");
        let mut running = start(&sock_path);

        for name in ["one", "two"] {
            let mut client = UnixDomainSocket::connect(&sock_path).await.unwrap();
            client.write_all(name.as_bytes()).await.unwrap();
            let got = timeout(WAIT, running.from_socket.recv()).await.unwrap();
            assert_eq!(got.as_deref(), Some(name.as_bytes()));
        }

        running.shutdown.cancel();
        running.task.await.unwrap();
        cleanup(&sock_path);
    }

    #[tokio::test]
    async fn reset_connection_returns_to_accepting() {
        let sock_path = make_sock_path("reset");
        let mut running = start(&sock_path);

        let mut first = UnixDomainSocket::connect(&sock_path).await.unwrap();
        first.write_all(b"first").await.unwrap();
        let got = timeout(WAIT, running.from_socket.recv()).await.unwrap();
        assert_eq!(got.as_deref(), Some(&b"first"[..]));

        // Once the third send is accepted the first chunk has been written
        // to the client. Closing with it unread resets the connection.
        for chunk in ["sl=1", "sl=2", "sl=3"] {
            timeout(WAIT, running.to_socket.send(Bytes::from(chunk)))
                .await
                .unwrap()
                .unwrap();
        }
        drop(first);

        let mut second = UnixDomainSocket::connect(&sock_path).await.unwrap();
        second.write_all(b"second").await.unwrap();
        let got = timeout(WAIT, running.from_socket.recv()).await.unwrap();
        assert_eq!(got.as_deref(), Some(&b"second"[..]));

        running.shutdown.cancel();
        running.task.await.unwrap();
        cleanup(&sock_path);
    }

    #[tokio::test]
    async fn shutdown_with_client_that_stopped_reading() {
        let sock_path = make_sock_path("stalled");
        let running = start(&sock_path);

        let mut client = UnixDomainSocket::connect(&sock_path).await.unwrap();
        client.write_all(b"attached").await.unwrap();
        let mut from_socket = running.from_socket;
        timeout(WAIT, from_socket.recv()).await.unwrap();

        // Fill the socket buffer until the relay is stuck writing.
        let big = Bytes::from(vec![b'x'; 64 * 1024]);
        let mut stalled = false;
        for _ in 0..64 {
            if timeout(Duration::from_millis(200), running.to_socket.send(big.clone()))
                .await
                .is_err()
            {
                stalled = true;
                break;
            }
        }
        assert!(stalled, "client socket buffer should fill up");

        running.shutdown.cancel();
        timeout(WAIT, running.task)
            .await
            .expect("supervisor must stop while a write is blocked")
            .unwrap();
        assert!(!sock_path.exists(), "socket file should be removed");
        drop(client);
        cleanup(&sock_path);
    }
}
