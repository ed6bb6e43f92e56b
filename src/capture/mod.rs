//! Capture driver boundary.
//!
//! The pipeline consumes raw link-layer frames through [`PacketSource`];
//! how they are captured is a driver concern. The default backend is a
//! `pnet` datalink channel ([`DatalinkSource`]); tests and replay tools
//! can implement the trait over any byte source.

mod datalink;
pub mod tcp;

use std::net::Ipv4Addr;

use bytes::Bytes;
use thiserror::Error;

pub use datalink::DatalinkSource;
pub use tcp::{extract, in_port_range, TcpPayload, MIN_CAPTURE_BYTES, PORT_RANGES};

/// Errors produced by capture drivers.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No capture interface with the requested identifier.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The interface does not expose an Ethernet channel.
    #[error("unsupported channel type on device {0}")]
    Unsupported(String),

    /// I/O failure from the capture driver (often a permissions problem).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstract source of raw link-layer frames.
///
/// `Ok(Some(frame))` yields one frame in capture order; `Ok(None)` means no
/// frame was available within the driver's read interval (poll again).
/// Implementations must hand out owned bytes: the driver's scratch buffer
/// is reused across reads and must not escape.
pub trait PacketSource: Send {
    fn next_packet(&mut self) -> Result<Option<Bytes>, SourceError>;
}

/// A capture-capable interface.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Driver identifier, the argument to `open`.
    pub name: String,
    /// Human-readable description where the platform provides one.
    pub description: String,
    /// IPv4 addresses bound to the interface.
    pub addresses: Vec<Ipv4Addr>,
}

/// List capture-capable interfaces.
pub fn devices() -> Vec<DeviceInfo> {
    datalink::devices()
}
