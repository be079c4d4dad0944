//! HID transport seam and the poll-read engine.
//!
//! The real backend wraps `hidapi`; the traits exist so the session can be
//! driven by a scripted transport in tests. Opened devices are switched to
//! non-blocking reads, and [`poll_read`] turns that primitive into a
//! bounded-timeout blocking read.

use std::thread;
use std::time::Duration;

use hidapi::{HidApi, HidDevice};
use thiserror::Error;
use tracing::{debug, warn};

/// Fixed delay between read attempts in [`poll_read`].
pub const POLL_INTERVAL_MS: u32 = 100;

/// Default per-exchange reply wait.
pub const DEFAULT_READ_WAIT_MS: u32 = 5000;

/// Sleep hook used by the poll loop. Injectable so tests can run the
/// timeout accounting without real elapsed time.
pub type SleepFn = fn(u64);

pub fn sleep_ms(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HID library failed to start: {0}")]
    Init(String),

    #[error("HID transport error: {0}")]
    Io(String),

    #[error("no response within {waited_ms} ms")]
    TimedOut { waited_ms: u32 },
}

/// Byte-oriented command/response pipe to one opened controller.
pub trait Transport {
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError>;

    /// One non-blocking read attempt. `Ok(0)` means no report has arrived yet.
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    fn manufacturer_string(&mut self) -> Option<String>;

    fn product_string(&mut self) -> Option<String>;
}

/// Opens transports by USB ids.
pub trait Backend {
    type Device: Transport;

    /// Tries to open a device. `None` when it is absent or unavailable. An
    /// opened device is already switched to non-blocking reads.
    fn open(&mut self, vendor_id: u16, product_id: u16) -> Option<Self::Device>;
}

/// Drives the non-blocking read until a report arrives or `max_wait_ms` is
/// spent. Waiting happens in fixed [`POLL_INTERVAL_MS`] quanta, so the
/// timeout fires after exactly `max_wait_ms / POLL_INTERVAL_MS` empty
/// reads. Read errors are logged and polling continues; on timeout the
/// buffer contents are unreliable.
pub fn poll_read<T: Transport + ?Sized>(
    transport: &mut T,
    buf: &mut [u8],
    max_wait_ms: u32,
    sleep: SleepFn,
) -> Result<usize, TransportError> {
    let mut waited_ms = 0;
    while waited_ms < max_wait_ms {
        match transport.read_nonblocking(buf) {
            Ok(0) => {}
            Ok(n) => return Ok(n),
            Err(e) => warn!("read attempt failed: {e}"),
        }
        sleep(POLL_INTERVAL_MS as u64);
        waited_ms += POLL_INTERVAL_MS;
    }
    Err(TransportError::TimedOut {
        waited_ms: max_wait_ms,
    })
}

/// `hidapi`-backed [`Backend`].
pub struct HidBackend {
    api: HidApi,
}

impl HidBackend {
    pub fn new() -> Result<Self, TransportError> {
        let api = HidApi::new().map_err(|e| TransportError::Init(e.to_string()))?;
        Ok(Self { api })
    }
}

impl Backend for HidBackend {
    type Device = HidTransport;

    fn open(&mut self, vendor_id: u16, product_id: u16) -> Option<HidTransport> {
        match self.api.open(vendor_id, product_id) {
            Ok(device) => {
                if let Err(e) = device.set_blocking_mode(false) {
                    warn!("unable to enable non-blocking reads: {e}");
                }
                debug!("opened {vendor_id:04x}:{product_id:04x}");
                Some(HidTransport { device })
            }
            Err(e) => {
                debug!("no device at {vendor_id:04x}:{product_id:04x}: {e}");
                None
            }
        }
    }
}

/// One opened HID device. Closing happens on drop.
pub struct HidTransport {
    device: HidDevice,
}

impl Transport for HidTransport {
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError> {
        self.device
            .write(frame)
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.device
            .read(buf)
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    fn manufacturer_string(&mut self) -> Option<String> {
        match self.device.get_manufacturer_string() {
            Ok(s) => s,
            Err(e) => {
                warn!("unable to read manufacturer string: {e}");
                None
            }
        }
    }

    fn product_string(&mut self) -> Option<String> {
        match self.device.get_product_string() {
            Ok(s) => s,
            Err(e) => {
                warn!("unable to read product string: {e}");
                None
            }
        }
    }
}
