use std::time::Duration;

use tiorelay_transport::UnixDomainSocket;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::cmd::{parse_duration, runtime, SendArgs};
use crate::exit::{io_error, transport_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::{print_json, print_raw, OutputFormat, ReplyOutput};

const REPLY_BUFFER: usize = 512;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    runtime()?.block_on(send(args, wait_timeout, format))
}

async fn send(args: SendArgs, wait_timeout: Duration, format: OutputFormat) -> CliResult<i32> {
    let mut stream = UnixDomainSocket::connect(&args.socket)
        .await
        .map_err(|err| transport_error("connect failed", err))?;

    stream
        .write_all(args.message.as_bytes())
        .await
        .map_err(|err| io_error("send failed", err))?;
    tracing::debug!(bytes = args.message.len(), "sent message");

    let reply = if args.wait {
        wait_for_reply(&mut stream, wait_timeout).await?
    } else {
        None
    };

    match format {
        OutputFormat::Json => print_json(&ReplyOutput {
            socket: &args.socket.display().to_string(),
            sent: &args.message,
            reply: reply.as_deref(),
        }),
        OutputFormat::Raw => {
            if let Some(reply) = &reply {
                print_raw(reply.as_bytes());
            }
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            if let Some(reply) = &reply {
                println!("{reply}");
            }
        }
    }

    Ok(SUCCESS)
}

/// Read one chunk. `Ok(None)` means the relay closed the connection first.
async fn wait_for_reply<R>(reader: &mut R, wait_timeout: Duration) -> CliResult<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; REPLY_BUFFER];
    let read = tokio::time::timeout(wait_timeout, reader.read(&mut buf))
        .await
        .map_err(|_| {
            CliError::new(
                TIMEOUT,
                format!("no reply within {}ms", wait_timeout.as_millis()),
            )
        })?
        .map_err(|err| io_error("receive failed", err))?;

    if read == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf[..read]).into_owned()))
}
