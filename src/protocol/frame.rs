//! Emitted protocol records.
//!
//! These are the payloads carried by the event stream: a [`Packet`] wraps
//! one reassembled frame with its addressing, a [`Segment`] is one typed
//! sub-unit of a frame. IPC payloads use `bytes::Bytes` so cloning a record
//! into multiple subscribers is cheap.

use std::net::Ipv4Addr;

use bytes::Bytes;
use serde::Serialize;

use super::wire_format::{FrameHeader, IpcHeader, SegmentHeader};
use crate::decoders::IpcMessage;

/// One side of a TCP flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub addr: Ipv4Addr,
    pub port: u16,
}

impl Endpoint {
    pub fn new(addr: Ipv4Addr, port: u16) -> Self {
        Self { addr, port }
    }
}

/// A reassembled frame: header plus its parsed segments.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Decoded frame header.
    pub header: FrameHeader,
    /// Segments in on-wire offset order.
    pub segments: Vec<Segment>,
}

/// One segment of a frame.
///
/// The IPC fields are populated only for IPC-category segments; `parsed` is
/// present only when a decoder exists for the message name, region constants
/// are loaded, and the decode succeeded.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Decoded segment header.
    pub header: SegmentHeader,
    /// IPC header, for IPC segments.
    pub ipc_header: Option<IpcHeader>,
    /// Raw IPC body bytes, for IPC segments.
    pub ipc_data: Option<Bytes>,
    /// Decoded message record, when a decoder ran successfully.
    pub parsed: Option<IpcMessage>,
}

impl Segment {
    /// A segment with no IPC payload.
    pub fn bare(header: SegmentHeader) -> Self {
        Self {
            header,
            ipc_header: None,
            ipc_data: None,
            parsed: None,
        }
    }
}

/// A fully processed frame with its flow addressing.
#[derive(Debug, Clone)]
pub struct Packet {
    /// Sender of the frame.
    pub source: Endpoint,
    /// Receiver of the frame.
    pub destination: Endpoint,
    /// The reassembled frame.
    pub frame: Frame,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire_format::{Direction, SegmentType, FRAME_MAGIC};

    #[test]
    fn test_bare_segment_has_no_ipc_fields() {
        let header = SegmentHeader {
            size: 16,
            source_actor: 0,
            target_actor: 0,
            segment_type: SegmentType::KeepAlive,
            direction: Direction::Send,
        };
        let segment = Segment::bare(header);
        assert!(segment.ipc_header.is_none());
        assert!(segment.ipc_data.is_none());
        assert!(segment.parsed.is_none());
    }

    #[test]
    fn test_packet_clone_is_cheap_for_payloads() {
        let header = SegmentHeader {
            size: 48,
            source_actor: 1,
            target_actor: 2,
            segment_type: SegmentType::Ipc,
            direction: Direction::Receive,
        };
        let data = Bytes::from_static(b"payload");
        let mut segment = Segment::bare(header);
        segment.ipc_data = Some(data.clone());

        let packet = Packet {
            source: Endpoint::new(Ipv4Addr::new(10, 0, 0, 1), 40000),
            destination: Endpoint::new(Ipv4Addr::new(10, 0, 0, 2), 55021),
            frame: Frame {
                header: FrameHeader {
                    magic: FRAME_MAGIC,
                    timestamp_ms: 0,
                    size: 88,
                    connection_type: 0,
                    segment_count: 1,
                    unknown: 0,
                    compressed: false,
                    unknown2: 0,
                    unknown3: 0,
                },
                segments: vec![segment],
            },
        };

        let cloned = packet.clone();
        let original = packet.frame.segments[0].ipc_data.as_ref().unwrap();
        let copy = cloned.frame.segments[0].ipc_data.as_ref().unwrap();
        // Bytes clones share the same allocation.
        assert_eq!(original.as_ptr(), copy.as_ptr());
    }
}
