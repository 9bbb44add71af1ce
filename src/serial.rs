#[cfg(test)]
mod tests;

/***
 * Serial line
 *
 *  The acquisition board writes one text frame per line at 115200 8N1.
 *  `LineBuffer` turns the raw byte stream into lines; `SerialPort` owns the
 *  UART and hands complete lines to whoever holds it as a `FrameSource`.
 */
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rppal::uart::{Parity, Uart};
use thiserror::Error;
use tracing::{debug, trace};

// longest line the board sends; anything longer is flushed as-is
pub const MAX_LINE_BYTES: usize = 127;

#[derive(Debug, Error)]
pub enum SerialError {
    #[error("can't open serial port {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rppal::uart::Error,
    },

    #[error("serial read failed: {0}")]
    Read(#[source] rppal::uart::Error),

    #[error("serial line disconnected")]
    Disconnected,
}

/// Anything that yields received lines. `Ok(None)` means the read timed
/// out without a complete line.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSource {
    fn read_line(&mut self) -> Result<Option<String>, SerialError>;
}

#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Pops the next non-empty line terminated by CR or LF.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let end = match self.pending.iter().position(|&b| b == b'\r' || b == b'\n') {
                Some(end) => end,
                None if self.pending.len() > MAX_LINE_BYTES => MAX_LINE_BYTES,
                None => return None,
            };

            let line: Vec<u8> = self.pending.drain(..end).collect();
            if self.pending.first().is_some_and(|&b| b == b'\r' || b == b'\n') {
                self.pending.remove(0);
            }
            if !line.is_empty() {
                return Some(String::from_utf8_lossy(&line).into_owned());
            }
        }
    }
}

pub struct SerialPort {
    uart: Uart,
    path: PathBuf,
    lines: LineBuffer,
}

// VMIN = 0: a read returns whatever arrived within the timeout, possibly
// nothing, instead of waiting for the first byte
const READ_MIN_BYTES: u8 = 0;

// errno values a tty read reports once the device has gone away
const EIO: i32 = 5;
const ENXIO: i32 = 6;
const ENODEV: i32 = 19;

impl SerialPort {
    /// Opens `path` raw at `baud`, 8 data bits, no parity, 1 stop bit. A read
    /// returns after `timeout` even if nothing arrived.
    pub fn open(path: &Path, baud: u32, timeout: Duration) -> Result<Self, SerialError> {
        let open_err = |source| SerialError::Open {
            path: path.display().to_string(),
            source,
        };
        let mut uart = Uart::with_path(path, baud, Parity::None, 8, 1).map_err(open_err)?;
        uart.set_read_mode(READ_MIN_BYTES, timeout)
            .map_err(open_err)?;

        debug!(path = %path.display(), baud, "serial port open");
        Ok(Self {
            uart,
            path: path.to_path_buf(),
            lines: LineBuffer::new(),
        })
    }
}

impl FrameSource for SerialPort {
    fn read_line(&mut self) -> Result<Option<String>, SerialError> {
        if let Some(line) = self.lines.next_line() {
            return Ok(Some(line));
        }

        let mut buf = [0u8; MAX_LINE_BYTES + 1];
        let n = self.uart.read(&mut buf).map_err(classify_read_error)?;
        trace!(n, "serial bytes read");
        if n == 0 {
            // a timed-out read and a hung-up tty both return nothing
            ensure_present(&self.path)?;
        }
        self.lines.push(&buf[..n]);

        Ok(self.lines.next_line())
    }
}

fn classify_read_error(err: rppal::uart::Error) -> SerialError {
    match &err {
        rppal::uart::Error::Io(io) if is_hangup(io) => SerialError::Disconnected,
        _ => SerialError::Read(err),
    }
}

fn is_hangup(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(EIO | ENXIO | ENODEV))
        || matches!(
            err.kind(),
            io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof
        )
}

// a USB serial adapter's device node disappears when it is unplugged
fn ensure_present(path: &Path) -> Result<(), SerialError> {
    if path.exists() {
        Ok(())
    } else {
        Err(SerialError::Disconnected)
    }
}
