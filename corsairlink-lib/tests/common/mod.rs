//! Common test utilities: a scripted in-memory transport and backend.

// Allow dead code since this module is shared across multiple test files
// and not every item is used in every file.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use corsairlink_lib::protocol::REPORT_SIZE;
use corsairlink_lib::transport::{Backend, Transport, TransportError};

/// One scripted answer to a non-blocking read attempt.
#[allow(dead_code)]
pub enum ReadStep {
    /// A report arrived; its bytes are copied into the caller's buffer.
    Report(Vec<u8>),
    /// Nothing buffered yet (`Ok(0)`).
    Empty,
    /// Transport-level read failure.
    Fail(&'static str),
}

#[derive(Default)]
pub struct DeviceState {
    pub reads: VecDeque<ReadStep>,
    pub writes: Vec<Vec<u8>>,
    pub read_attempts: usize,
    pub fail_writes: bool,
}

pub type SharedState = Rc<RefCell<DeviceState>>;

#[allow(dead_code)]
pub fn shared_state() -> SharedState {
    Rc::new(RefCell::new(DeviceState::default()))
}

pub struct ScriptedTransport(pub SharedState);

impl Transport for ScriptedTransport {
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError> {
        let mut state = self.0.borrow_mut();
        if state.fail_writes {
            return Err(TransportError::Io("write refused".into()));
        }
        state.writes.push(frame.to_vec());
        Ok(frame.len())
    }

    fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut state = self.0.borrow_mut();
        state.read_attempts += 1;
        match state.reads.pop_front() {
            Some(ReadStep::Report(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            Some(ReadStep::Empty) | None => Ok(0),
            Some(ReadStep::Fail(message)) => Err(TransportError::Io(message.into())),
        }
    }

    fn manufacturer_string(&mut self) -> Option<String> {
        Some("Corsair".into())
    }

    fn product_string(&mut self) -> Option<String> {
        Some("H80i".into())
    }
}

/// Backend holding a fixed set of scripted devices, recording every open
/// attempt in order.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedBackend {
    pub devices: Vec<(u16, u16, SharedState)>,
    pub opens: Rc<RefCell<Vec<(u16, u16)>>>,
}

impl Backend for ScriptedBackend {
    type Device = ScriptedTransport;

    fn open(&mut self, vendor_id: u16, product_id: u16) -> Option<ScriptedTransport> {
        self.opens.borrow_mut().push((vendor_id, product_id));
        self.devices
            .iter()
            .find(|(v, p, _)| *v == vendor_id && *p == product_id)
            .map(|(_, _, state)| ScriptedTransport(Rc::clone(state)))
    }
}

/// Response report whose primary result byte (offset 2) is `value`.
#[allow(dead_code)]
pub fn result_report(value: u8) -> Vec<u8> {
    let mut report = vec![0u8; REPORT_SIZE];
    report[2] = value;
    report
}

#[allow(dead_code)]
pub fn no_op_sleep(_ms: u64) {}
