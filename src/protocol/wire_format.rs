//! Wire format for frame, segment, and IPC headers.
//!
//! Every frame on the wire starts with a 40-byte header:
//! ```text
//! ┌───────────┬───────────┬──────┬───────┬────────┬─────┬──────┬─────────┐
//! │ Magic     │ Timestamp │ Size │ Conn  │ SegCnt │ ??  │ Zlib │ ??      │
//! │ 16 bytes  │ 8 bytes   │ 4 B  │ 2 B   │ 2 B    │ 1 B │ 1 B  │ 6 bytes │
//! └───────────┴───────────┴──────┴───────┴────────┴─────┴──────┴─────────┘
//! ```
//! followed by `segment_count` segments, each with a 16-byte header. IPC
//! segments carry a further 16-byte IPC header whose opcode selects the
//! message decoder.
//!
//! All multi-byte integers are Little Endian.

use serde::Serialize;

/// Frame header size in bytes (fixed, exactly 40).
pub const FRAME_HEADER_SIZE: usize = 40;

/// Segment header size in bytes (fixed, exactly 16).
pub const SEG_HEADER_SIZE: usize = 16;

/// IPC header size in bytes (fixed, exactly 16).
pub const IPC_HEADER_SIZE: usize = 16;

/// Magic prefix of a standard protocol frame.
pub const FRAME_MAGIC: [u8; 16] = [
    0x52, 0x52, 0xA0, 0x41, 0xFF, 0x5D, 0x46, 0xE2, 0x7F, 0x2A, 0x64, 0x4D, 0x7B, 0x99, 0xC4, 0x75,
];

/// Magic prefix of a keepalive frame (all zeroes).
pub const KEEPALIVE_MAGIC: [u8; 16] = [0u8; 16];

/// Segment categories observed on the wire.
///
/// Only [`SegmentType::Ipc`] segments carry opcoded game messages. Unknown
/// discriminants are preserved rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SegmentType {
    /// Session establishment.
    SessionInit,
    /// Opcoded game message.
    Ipc,
    /// Keepalive ping.
    KeepAlive,
    /// Keepalive pong.
    KeepAliveResponse,
    /// Encryption handshake.
    EncryptionInit,
    /// Any other discriminant, preserved verbatim.
    Unknown(u16),
}

impl SegmentType {
    /// Map a wire discriminant to a segment type.
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => SegmentType::SessionInit,
            3 => SegmentType::Ipc,
            7 => SegmentType::KeepAlive,
            8 => SegmentType::KeepAliveResponse,
            9 => SegmentType::EncryptionInit,
            other => SegmentType::Unknown(other),
        }
    }

    /// The wire discriminant for this segment type.
    pub fn to_u16(self) -> u16 {
        match self {
            SegmentType::SessionInit => 1,
            SegmentType::Ipc => 3,
            SegmentType::KeepAlive => 7,
            SegmentType::KeepAliveResponse => 8,
            SegmentType::EncryptionInit => 9,
            SegmentType::Unknown(other) => other,
        }
    }
}

/// Traffic direction of a segment, derived from the flow's destination port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Client to server.
    Send,
    /// Server to client.
    Receive,
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameHeader {
    /// 16-byte magic prefix identifying the protocol family.
    pub magic: [u8; 16],
    /// Frame timestamp in milliseconds since the epoch.
    pub timestamp_ms: u64,
    /// Total frame size in bytes, header included.
    pub size: u32,
    /// Protocol/connection-type tag.
    pub connection_type: u16,
    /// Number of segments in the frame body.
    pub segment_count: u16,
    /// Unknown byte, preserved.
    pub unknown: u8,
    /// Whether the body is zlib-deflated.
    pub compressed: bool,
    /// Unknown trailing field, preserved.
    pub unknown2: u16,
    /// Unknown trailing field, preserved.
    pub unknown3: u32,
}

impl FrameHeader {
    /// Decode a frame header from the start of `buf`.
    ///
    /// Returns `None` if the buffer holds fewer than [`FRAME_HEADER_SIZE`]
    /// bytes.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < FRAME_HEADER_SIZE {
            return None;
        }
        let mut magic = [0u8; 16];
        magic.copy_from_slice(&buf[0..16]);
        Some(Self {
            magic,
            timestamp_ms: u64::from_le_bytes(buf[16..24].try_into().ok()?),
            size: u32::from_le_bytes(buf[24..28].try_into().ok()?),
            connection_type: u16::from_le_bytes(buf[28..30].try_into().ok()?),
            segment_count: u16::from_le_bytes(buf[30..32].try_into().ok()?),
            unknown: buf[32],
            compressed: buf[33] != 0,
            unknown2: u16::from_le_bytes(buf[34..36].try_into().ok()?),
            unknown3: u32::from_le_bytes(buf[36..40].try_into().ok()?),
        })
    }

    /// Encode this header to its wire layout.
    pub fn encode(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut buf = [0u8; FRAME_HEADER_SIZE];
        buf[0..16].copy_from_slice(&self.magic);
        buf[16..24].copy_from_slice(&self.timestamp_ms.to_le_bytes());
        buf[24..28].copy_from_slice(&self.size.to_le_bytes());
        buf[28..30].copy_from_slice(&self.connection_type.to_le_bytes());
        buf[30..32].copy_from_slice(&self.segment_count.to_le_bytes());
        buf[32] = self.unknown;
        buf[33] = self.compressed as u8;
        buf[34..36].copy_from_slice(&self.unknown2.to_le_bytes());
        buf[36..40].copy_from_slice(&self.unknown3.to_le_bytes());
        buf
    }

    /// Whether the magic prefix matches one of the two accepted values.
    ///
    /// Anything else is not a frame boundary and must not be consumed from
    /// the flow buffer.
    #[inline]
    pub fn is_magical(&self) -> bool {
        self.magic == FRAME_MAGIC || self.magic == KEEPALIVE_MAGIC
    }

    /// Whether this is a keepalive frame.
    #[inline]
    pub fn is_keepalive(&self) -> bool {
        self.magic == KEEPALIVE_MAGIC
    }
}

/// Decoded segment header.
///
/// The wire layout carries size, actor ids, type, and reserved padding; the
/// direction is not on the wire — it is derived from which port range the
/// flow's destination port falls in and attached here for consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentHeader {
    /// Total segment size in bytes, header included.
    pub size: u32,
    /// Source actor id.
    pub source_actor: u32,
    /// Target actor id.
    pub target_actor: u32,
    /// Segment category.
    pub segment_type: SegmentType,
    /// Traffic direction of the owning flow.
    pub direction: Direction,
}

impl SegmentHeader {
    /// Decode a segment header from the start of `buf`.
    pub fn decode(buf: &[u8], direction: Direction) -> Option<Self> {
        if buf.len() < SEG_HEADER_SIZE {
            return None;
        }
        Some(Self {
            size: u32::from_le_bytes(buf[0..4].try_into().ok()?),
            source_actor: u32::from_le_bytes(buf[4..8].try_into().ok()?),
            target_actor: u32::from_le_bytes(buf[8..12].try_into().ok()?),
            segment_type: SegmentType::from_u16(u16::from_le_bytes(buf[12..14].try_into().ok()?)),
            direction,
        })
    }

    /// Encode this header to its wire layout.
    pub fn encode(&self) -> [u8; SEG_HEADER_SIZE] {
        let mut buf = [0u8; SEG_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.size.to_le_bytes());
        buf[4..8].copy_from_slice(&self.source_actor.to_le_bytes());
        buf[8..12].copy_from_slice(&self.target_actor.to_le_bytes());
        buf[12..14].copy_from_slice(&self.segment_type.to_u16().to_le_bytes());
        buf
    }
}

/// Decoded IPC header, present only in [`SegmentType::Ipc`] segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IpcHeader {
    /// Reserved field, `0x0014` on current servers.
    pub reserved: u16,
    /// Message opcode; the dispatch key into the opcode index.
    pub opcode: u16,
    /// Originating world/server id.
    pub server_id: u16,
    /// Message timestamp in seconds since the epoch.
    pub timestamp: u32,
}

impl IpcHeader {
    /// Decode an IPC header from the start of `buf`.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < IPC_HEADER_SIZE {
            return None;
        }
        Some(Self {
            reserved: u16::from_le_bytes(buf[0..2].try_into().ok()?),
            opcode: u16::from_le_bytes(buf[2..4].try_into().ok()?),
            server_id: u16::from_le_bytes(buf[6..8].try_into().ok()?),
            timestamp: u32::from_le_bytes(buf[8..12].try_into().ok()?),
        })
    }

    /// Encode this header to its wire layout.
    pub fn encode(&self) -> [u8; IPC_HEADER_SIZE] {
        let mut buf = [0u8; IPC_HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.reserved.to_le_bytes());
        buf[2..4].copy_from_slice(&self.opcode.to_le_bytes());
        buf[6..8].copy_from_slice(&self.server_id.to_le_bytes());
        buf[8..12].copy_from_slice(&self.timestamp.to_le_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_header_roundtrip() {
        let header = FrameHeader {
            magic: FRAME_MAGIC,
            timestamp_ms: 0x0102_0304_0506_0708,
            size: 120,
            connection_type: 1,
            segment_count: 2,
            unknown: 0,
            compressed: true,
            unknown2: 0,
            unknown3: 0,
        };
        let encoded = header.encode();
        let decoded = FrameHeader::decode(&encoded).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn test_frame_header_little_endian_layout() {
        let header = FrameHeader {
            magic: FRAME_MAGIC,
            timestamp_ms: 0x1122,
            size: 0x0000_0102,
            connection_type: 0,
            segment_count: 1,
            unknown: 0,
            compressed: false,
            unknown2: 0,
            unknown3: 0,
        };
        let bytes = header.encode();
        // Size at offset 24, least significant byte first.
        assert_eq!(bytes[24], 0x02);
        assert_eq!(bytes[25], 0x01);
        // Timestamp at offset 16.
        assert_eq!(bytes[16], 0x22);
        assert_eq!(bytes[17], 0x11);
    }

    #[test]
    fn test_decode_too_short_buffer() {
        assert!(FrameHeader::decode(&[0u8; FRAME_HEADER_SIZE - 1]).is_none());
        assert!(SegmentHeader::decode(&[0u8; SEG_HEADER_SIZE - 1], Direction::Send).is_none());
        assert!(IpcHeader::decode(&[0u8; IPC_HEADER_SIZE - 1]).is_none());
    }

    #[test]
    fn test_magic_test() {
        let mut header = FrameHeader::decode(&[0u8; FRAME_HEADER_SIZE]).unwrap();
        assert!(header.is_magical());
        assert!(header.is_keepalive());

        header.magic = FRAME_MAGIC;
        assert!(header.is_magical());
        assert!(!header.is_keepalive());

        header.magic[0] ^= 0xFF;
        assert!(!header.is_magical());
    }

    #[test]
    fn test_segment_header_roundtrip() {
        let header = SegmentHeader {
            size: 48,
            source_actor: 0x1000_0001,
            target_actor: 0x1000_0002,
            segment_type: SegmentType::Ipc,
            direction: Direction::Receive,
        };
        let decoded = SegmentHeader::decode(&header.encode(), Direction::Receive).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn test_segment_type_mapping() {
        assert_eq!(SegmentType::from_u16(3), SegmentType::Ipc);
        assert_eq!(SegmentType::from_u16(7), SegmentType::KeepAlive);
        assert_eq!(SegmentType::from_u16(9), SegmentType::EncryptionInit);
        assert_eq!(SegmentType::from_u16(42), SegmentType::Unknown(42));
        assert_eq!(SegmentType::Unknown(42).to_u16(), 42);
    }

    #[test]
    fn test_ipc_header_roundtrip() {
        let header = IpcHeader {
            reserved: 0x0014,
            opcode: 0x008D,
            server_id: 52,
            timestamp: 1_700_000_000,
        };
        let decoded = IpcHeader::decode(&header.encode()).unwrap();
        assert_eq!(header, decoded);
    }
}
