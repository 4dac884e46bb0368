//! Console rudder override.
//!
//! An operator can bias the rudder by typing an angle in radians, one value
//! per line. Anything that is not a finite decimal number is ignored.

use crate::simulator::Input;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Parse an override angle from a whole line, surrounding whitespace
/// allowed. `None` leaves the current override in place.
pub fn parse_override(line: &str) -> Option<f64> {
    line.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Forward console lines to the integration task until end of input.
///
/// Lines are read as raw bytes, so a line that is not valid UTF-8 is passed
/// on lossily and then ignored by the parser instead of ending the reader.
pub fn spawn_console_reader<R>(mut reader: R, inputs: mpsc::Sender<Input>) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    info!("console input closed, keeping last override");
                    break;
                }
                Ok(_) => {
                    let line = String::from_utf8_lossy(trim_line_ending(&buf)).into_owned();
                    debug!("console line {:?}", line);
                    if inputs.send(Input::ConsoleLine(line)).await.is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("console read failed, keeping last override: {}", e);
                    break;
                }
            }
        }
    })
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
