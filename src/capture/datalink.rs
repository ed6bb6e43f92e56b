//! `pnet` datalink capture backend.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, NetworkInterface};
use pnet::ipnetwork::IpNetwork;

use super::{DeviceInfo, PacketSource, SourceError};

/// How long one blocking read may wait before yielding `None`, so shutdown
/// flags are observed promptly.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Live capture over a datalink channel.
pub struct DatalinkSource {
    rx: Box<dyn DataLinkReceiver>,
}

impl DatalinkSource {
    /// Open a capture channel on the named interface.
    pub fn open(device: &str) -> Result<Self, SourceError> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == device)
            .ok_or_else(|| SourceError::DeviceNotFound(device.to_string()))?;

        let config = Config {
            read_timeout: Some(READ_TIMEOUT),
            ..Config::default()
        };
        match datalink::channel(&interface, config) {
            Ok(Channel::Ethernet(_tx, rx)) => Ok(Self { rx }),
            Ok(_) => Err(SourceError::Unsupported(device.to_string())),
            Err(e) => Err(SourceError::Io(e)),
        }
    }
}

impl PacketSource for DatalinkSource {
    fn next_packet(&mut self) -> Result<Option<Bytes>, SourceError> {
        match self.rx.next() {
            // The receiver's scratch buffer is reused on the next read, so
            // the frame is copied out before it escapes.
            Ok(frame) => Ok(Some(Bytes::copy_from_slice(frame))),
            Err(e) => match e.kind() {
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
                    Ok(None)
                }
                _ => Err(SourceError::Io(e)),
            },
        }
    }
}

fn ipv4_addresses(interface: &NetworkInterface) -> Vec<std::net::Ipv4Addr> {
    interface
        .ips
        .iter()
        .filter_map(|network| match network {
            IpNetwork::V4(v4) => Some(v4.ip()),
            IpNetwork::V6(_) => None,
        })
        .collect()
}

/// Interfaces usable for capture.
pub(super) fn devices() -> Vec<DeviceInfo> {
    datalink::interfaces()
        .into_iter()
        .map(|interface| DeviceInfo {
            description: interface.description.clone(),
            addresses: ipv4_addresses(&interface),
            name: interface.name,
        })
        .collect()
}
