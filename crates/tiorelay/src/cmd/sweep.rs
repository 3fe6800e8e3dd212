use std::time::Duration;

use tiorelay_transport::{open_serial, SerialConfig};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::cmd::{parse_duration, runtime, SweepArgs};
use crate::exit::{io_error, transport_error, CliResult, SUCCESS};

const STEP: u32 = 10;
const STEPS: u32 = 12;

pub fn run(args: SweepArgs) -> CliResult<i32> {
    let step_delay = parse_duration(&args.step_delay)?;
    let config = SerialConfig::new(args.tty.clone()).with_baud_rate(args.baud);

    runtime()?.block_on(async move {
        let mut port =
            open_serial(&config).map_err(|err| transport_error("serial open failed", err))?;
        for cycle in 0..args.cycles {
            tracing::info!(cycle, "sweeping");
            sweep_once(&mut port, step_delay).await?;
        }
        Ok(SUCCESS)
    })
}

/// Slider positions for one up-then-down ramp.
fn ramp() -> impl Iterator<Item = u32> {
    (0..STEPS).chain((1..=STEPS).rev()).map(|i| i * STEP)
}

async fn sweep_once<W>(port: &mut W, step_delay: Duration) -> CliResult<()>
where
    W: AsyncWrite + Unpin,
{
    for value in ramp() {
        let msg = format!("sl={value}\n");
        port.write_all(msg.as_bytes())
            .await
            .map_err(|err| io_error("serial write failed", err))?;
        tracing::debug!(bytes = msg.len(), value, "sent");
        tokio::time::sleep(step_delay).await;
    }
    Ok(())
}
