//! Serial line acquisition.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time;
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, info};

/// A source of raw telemetry lines.
///
/// `Ok(Some(line))` delivers one terminator-stripped line, `Ok(None)` means
/// nothing arrived within the read timeout (retry next cycle), and `Err` is a
/// transport failure.
pub trait LineSource {
    fn next_line(&mut self) -> impl Future<Output = Result<Option<String>>>;
}

/// Line source backed by a serial port at 8-N-1.
pub struct SerialLineSource {
    reader: BufReader<SerialStream>,
    read_timeout: Duration,
    partial: Vec<u8>,
}

impl SerialLineSource {
    /// Opens the serial port.
    pub fn open(path: &str, baud: u32, read_timeout: Duration) -> Result<Self> {
        let port = tokio_serial::new(path, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .open_native_async()
            .map_err(|e| {
                // Distinguish a missing device from other open failures
                if let tokio_serial::ErrorKind::Io(kind) = &e.kind {
                    if *kind == std::io::ErrorKind::NotFound
                        || *kind == std::io::ErrorKind::PermissionDenied
                    {
                        if !std::path::Path::new(path).exists() {
                            return Error::PortNotFound(path.to_string());
                        }
                    }
                }
                Error::Serial(e)
            })?;

        info!("Connected to {} at {} baud", path, baud);

        Ok(Self {
            reader: BufReader::new(port),
            read_timeout,
            partial: Vec::new(),
        })
    }
}

impl LineSource for SerialLineSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        let line =
            read_line_with_timeout(&mut self.reader, &mut self.partial, self.read_timeout).await?;
        if let Some(line) = &line {
            debug!("received line: {:?}", line);
        }
        Ok(line)
    }
}

/// Reads one line, bounded by `read_timeout`.
///
/// Bytes that arrive before the timeout but without a terminator stay in
/// `partial` and complete on a later call, so a slow transmission is never
/// torn into two lines.
async fn read_line_with_timeout<R>(
    reader: &mut R,
    partial: &mut Vec<u8>,
    read_timeout: Duration,
) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    match time::timeout(read_timeout, reader.read_until(b'\n', partial)).await {
        Err(_elapsed) => Ok(None),
        Ok(Ok(0)) => Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "serial port closed",
        ))),
        Ok(Ok(_)) => {
            let bytes = std::mem::take(partial);
            let line = String::from_utf8(bytes)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
        }
        Ok(Err(e)) => Err(Error::Io(e)),
    }
}
