use crate::transport::TransportError;
use thiserror::Error;

/// The primary error type for the `corsairlink-lib` library.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("no supported Corsair Link cooler found. Is the device connected?")]
    DeviceNotFound,

    #[error("session is already initialized")]
    AlreadyInitialized,

    #[error("session is not initialized")]
    NotInitialized,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
