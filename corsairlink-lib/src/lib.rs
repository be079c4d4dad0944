//! Client for the Corsair Link USB HID control protocol spoken by the
//! H80i / H100i / H110i / H115i family of liquid-cooling controllers.
//!
//! The device answers fixed-length 17-byte command/response HID reports.
//! [`CorsairLink`] discovers a supported controller among the known
//! vendor/product id variants, runs the command exchange over a pluggable
//! [`transport::Backend`], and exposes the decoded telemetry readings.

pub mod device;
pub mod error;
pub mod protocol;
pub mod transport;

pub use device::{CorsairLink, Reading};
pub use error::LinkError;
