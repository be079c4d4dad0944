//! # Corsair Link HID Control Protocol
//!
//! Communication is a strict request/response exchange of 17-byte HID
//! reports. A request carries its own length, a per-exchange command id,
//! a read opcode sized to the register being read, and the register
//! address itself:
//!
//! ```text
//! [request_len, command_id, opcode, register, 0x00, ..zero padding to 17]
//! ```
//!
//! Responses are the same 17 bytes. Byte 2 holds the primary result
//! (device id or status), the firmware version spans bytes 2..4 with the
//! high byte at offset 3, and the product name is the 8 bytes starting at
//! offset 3.
//!
//! The controllers all share vendor id `0x1b1c`; model variants behind the
//! same product id are told apart by the device id register.

use num_enum::IntoPrimitive;

/// Fixed HID report size for both requests and responses.
pub const REPORT_SIZE: usize = 17;

/// Length of the product-name string in a [`Command::ProductName`] response.
pub const PRODUCT_NAME_LEN: usize = 8;

/// Offset of the product-name bytes in the response report.
const PRODUCT_NAME_OFFSET: usize = 3;

/// Read opcodes, sized to the width of the register being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum Opcode {
    ReadOneByte = 0x07,
    ReadTwoBytes = 0x09,
    ReadThreeBytes = 0x0B,
}

/// Readable registers. The discriminant doubles as the register address
/// placed in the request's data byte and as the index into [`COMMANDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum Command {
    DeviceId = 0x00,
    FirmwareId = 0x01,
    ProductName = 0x02,
    Status = 0x03,
}

impl Command {
    pub fn descriptor(self) -> &'static CommandDescriptor {
        &COMMANDS[self as usize]
    }
}

/// Static description of one protocol operation.
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    pub command: Command,
    pub opcode: Opcode,
    pub request_len: u8,
    pub response_len: u8,
}

/// Command catalog, indexed by [`Command`].
pub const COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        command: Command::DeviceId,
        opcode: Opcode::ReadOneByte,
        request_len: 0x03,
        response_len: 17,
    },
    CommandDescriptor {
        command: Command::FirmwareId,
        opcode: Opcode::ReadTwoBytes,
        request_len: 0x03,
        response_len: 17,
    },
    CommandDescriptor {
        command: Command::ProductName,
        opcode: Opcode::ReadThreeBytes,
        request_len: 0x04,
        response_len: 17,
    },
    CommandDescriptor {
        command: Command::Status,
        opcode: Opcode::ReadOneByte,
        request_len: 0x03,
        response_len: 17,
    },
];

/// One supported controller model, identified by its USB ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceEntry {
    pub vendor_id: u16,
    pub product_id: u16,
    pub device_id: u8,
    pub name: &'static str,
}

/// Supported controllers, probed strictly in this order.
pub const SUPPORTED_DEVICES: &[DeviceEntry] = &[
    DeviceEntry {
        vendor_id: 0x1b1c,
        product_id: 0x0c04,
        device_id: 0x3b,
        name: "H80i",
    },
    DeviceEntry {
        vendor_id: 0x1b1c,
        product_id: 0x0c04,
        device_id: 0x3c,
        name: "H100i",
    },
    DeviceEntry {
        vendor_id: 0x1b1c,
        product_id: 0x0c04,
        device_id: 0x41,
        name: "H110i",
    },
    DeviceEntry {
        vendor_id: 0x1b1c,
        product_id: 0x0c0a,
        device_id: 0x00,
        name: "H115i",
    },
];

/// Builds the full zero-padded request report for one exchange.
pub fn request_frame(
    descriptor: &CommandDescriptor,
    command_id: u8,
    data: u8,
) -> [u8; REPORT_SIZE] {
    let mut frame = [0u8; REPORT_SIZE];
    frame[0] = descriptor.request_len;
    frame[1] = command_id;
    frame[2] = descriptor.opcode.into();
    frame[3] = data;
    frame[4] = 0x00;
    frame
}

/// Primary one-byte result of a response (device id, status).
pub fn result_byte(response: &[u8; REPORT_SIZE]) -> u8 {
    response[2]
}

/// Firmware version: byte 3 is the high byte, byte 2 the low byte.
pub fn firmware_version(response: &[u8; REPORT_SIZE]) -> u16 {
    (response[3] as u16) << 8 | response[2] as u16
}

/// Product-name bytes, returned verbatim without trimming.
pub fn product_name(response: &[u8; REPORT_SIZE]) -> [u8; PRODUCT_NAME_LEN] {
    let mut name = [0u8; PRODUCT_NAME_LEN];
    name.copy_from_slice(&response[PRODUCT_NAME_OFFSET..PRODUCT_NAME_OFFSET + PRODUCT_NAME_LEN]);
    name
}
