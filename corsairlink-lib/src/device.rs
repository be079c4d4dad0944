use crate::error::LinkError;
use crate::protocol::{
    self, Command, CommandDescriptor, DeviceEntry, PRODUCT_NAME_LEN, REPORT_SIZE,
    SUPPORTED_DEVICES,
};
use crate::transport::{
    Backend, DEFAULT_READ_WAIT_MS, SleepFn, Transport, poll_read, sleep_ms,
};
use tracing::{debug, info, warn};

/// Initial command id. Subsequent exchanges post-increment it with plain
/// wrapping arithmetic, so after 0xff the sequence continues at 0x00, not
/// back at 0x81.
const INITIAL_COMMAND_ID: u8 = 0x81;

/// One decoded telemetry value.
///
/// Write failures and reply timeouts do not abort an exchange; the session
/// reports them by handing back whatever the response buffer holds with
/// `fresh` cleared, so the caller decides whether stale data is acceptable.
#[derive(Debug, Clone, Copy)]
pub struct Reading<T> {
    pub value: T,
    pub fresh: bool,
}

/// A session with one Corsair Link controller.
///
/// The session exclusively owns the transport handle, the command-id
/// counter and the response buffer; exchanges are strictly one at a time
/// and there is no internal locking, so callers serialize access
/// themselves. The transport is released on [`CorsairLink::close`] or on
/// drop.
pub struct CorsairLink<B: Backend> {
    backend: B,
    device: Option<B::Device>,
    matched: Option<&'static DeviceEntry>,
    next_command_id: u8,
    response: [u8; REPORT_SIZE],
    max_read_wait_ms: u32,
    sleep: SleepFn,
}

impl<B: Backend> CorsairLink<B> {
    pub fn new(backend: B) -> Self {
        Self::with_read_wait(backend, DEFAULT_READ_WAIT_MS)
    }

    /// Creates a session with a custom per-exchange reply wait.
    pub fn with_read_wait(backend: B, max_read_wait_ms: u32) -> Self {
        Self {
            backend,
            device: None,
            matched: None,
            next_command_id: INITIAL_COMMAND_ID,
            response: [0; REPORT_SIZE],
            max_read_wait_ms,
            sleep: sleep_ms,
        }
    }

    /// Replaces the sleep used by the poll-read loop.
    pub fn with_sleep_fn(mut self, sleep: SleepFn) -> Self {
        self.sleep = sleep;
        self
    }

    /// Probes the registry of supported controllers strictly in table
    /// order and takes ownership of the first one that opens.
    ///
    /// The device-id register is read back and compared against the
    /// registry entry, but a mismatch is only logged; the first successful
    /// open is accepted regardless. This reproduces the behavior of the
    /// original OpenCorsairLink client, where three models share one
    /// product id and the id read never rejects the match.
    pub fn initialize(&mut self) -> Result<&'static DeviceEntry, LinkError> {
        if self.device.is_some() {
            return Err(LinkError::AlreadyInitialized);
        }

        info!("probing for a supported Corsair Link cooler...");
        for entry in SUPPORTED_DEVICES {
            let Some(device) = self.backend.open(entry.vendor_id, entry.product_id) else {
                continue;
            };
            self.device = Some(device);

            let reported = self.device_id()?;
            if reported.value == entry.device_id {
                info!("device found: {}", entry.name);
            } else {
                warn!(
                    "device id {:#04x} does not match {:#04x} expected for {}",
                    reported.value, entry.device_id, entry.name
                );
            }
            self.matched = Some(entry);
            return Ok(entry);
        }

        self.close();
        Err(LinkError::DeviceNotFound)
    }

    /// Registry entry matched by the last successful [`initialize`].
    ///
    /// [`initialize`]: CorsairLink::initialize
    pub fn device_entry(&self) -> Option<&'static DeviceEntry> {
        self.matched
    }

    pub fn device_id(&mut self) -> Result<Reading<u8>, LinkError> {
        let fresh = self.dispatch(Command::DeviceId)?;
        Ok(Reading {
            value: protocol::result_byte(&self.response),
            fresh,
        })
    }

    pub fn firmware_version(&mut self) -> Result<Reading<u16>, LinkError> {
        let fresh = self.dispatch(Command::FirmwareId)?;
        Ok(Reading {
            value: protocol::firmware_version(&self.response),
            fresh,
        })
    }

    /// Raw 8-byte product name, untrimmed.
    pub fn product_name(&mut self) -> Result<Reading<[u8; PRODUCT_NAME_LEN]>, LinkError> {
        let fresh = self.dispatch(Command::ProductName)?;
        Ok(Reading {
            value: protocol::product_name(&self.response),
            fresh,
        })
    }

    pub fn status(&mut self) -> Result<Reading<u8>, LinkError> {
        let fresh = self.dispatch(Command::Status)?;
        Ok(Reading {
            value: protocol::result_byte(&self.response),
            fresh,
        })
    }

    pub fn manufacturer(&mut self) -> Result<Option<String>, LinkError> {
        let device = self.device.as_mut().ok_or(LinkError::NotInitialized)?;
        Ok(device.manufacturer_string())
    }

    pub fn product(&mut self) -> Result<Option<String>, LinkError> {
        let device = self.device.as_mut().ok_or(LinkError::NotInitialized)?;
        Ok(device.product_string())
    }

    fn dispatch(&mut self, command: Command) -> Result<bool, LinkError> {
        self.response.fill(0);
        self.exchange(command.descriptor(), command.into())
    }

    /// Writes one request frame and drives the poll-read engine for the
    /// reply. Returns whether the response buffer holds a fresh reply; a
    /// failed write or a reply timeout is logged and reported as stale
    /// rather than aborting the exchange.
    fn exchange(&mut self, descriptor: &CommandDescriptor, data: u8) -> Result<bool, LinkError> {
        let device = self.device.as_mut().ok_or(LinkError::NotInitialized)?;

        let command_id = self.next_command_id;
        self.next_command_id = self.next_command_id.wrapping_add(1);

        let frame = protocol::request_frame(descriptor, command_id, data);
        debug!(bytes = hex::encode(frame), "write");

        let mut fresh = true;
        if let Err(e) = device.write(&frame) {
            warn!("unable to write command {command_id:#04x}: {e}");
            fresh = false;
        }

        match poll_read(device, &mut self.response, self.max_read_wait_ms, self.sleep) {
            Ok(n) => debug!(bytes = hex::encode(&self.response[..n]), "read"),
            Err(e) => {
                warn!("no reply to command {command_id:#04x}: {e}");
                fresh = false;
            }
        }
        Ok(fresh)
    }

    /// Releases the transport handle. Safe to call repeatedly; every call
    /// after the first is a no-op.
    pub fn close(&mut self) {
        if self.device.take().is_some() {
            debug!("transport handle released");
        }
        self.matched = None;
    }
}

impl<B: Backend> Drop for CorsairLink<B> {
    fn drop(&mut self) {
        self.close();
    }
}
