//! Protocol layer: wire layouts, the per-flow byte queue, and the binary
//! reader used by message decoders.

mod frame;
pub mod queue_buffer;
pub mod reader;
pub mod wire_format;

pub use frame::{Endpoint, Frame, Packet, Segment};
pub use queue_buffer::{BufferFull, QueueBuffer, BUFFER_SIZE};
pub use reader::{BufferReader, Position3, MAX_STRING_LEN};
pub use wire_format::{
    Direction, FrameHeader, IpcHeader, SegmentHeader, SegmentType, FRAME_HEADER_SIZE, FRAME_MAGIC,
    IPC_HEADER_SIZE, KEEPALIVE_MAGIC, SEG_HEADER_SIZE,
};

/// Peek a frame header from a queue buffer without consuming it.
///
/// Returns `None` while fewer than [`FRAME_HEADER_SIZE`] bytes are buffered.
pub fn try_get_frame_header(qbuf: &QueueBuffer) -> Option<FrameHeader> {
    FrameHeader::decode(qbuf.peek(FRAME_HEADER_SIZE)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_get_frame_header_waits_for_full_header() {
        let mut qbuf = QueueBuffer::new();
        let header = FrameHeader {
            magic: FRAME_MAGIC,
            timestamp_ms: 7,
            size: 40,
            connection_type: 0,
            segment_count: 0,
            unknown: 0,
            compressed: false,
            unknown2: 0,
            unknown3: 0,
        };
        let bytes = header.encode();

        qbuf.push(&bytes[..FRAME_HEADER_SIZE - 1]).unwrap();
        assert!(try_get_frame_header(&qbuf).is_none());

        qbuf.push(&bytes[FRAME_HEADER_SIZE - 1..]).unwrap();
        let peeked = try_get_frame_header(&qbuf).unwrap();
        assert_eq!(peeked, header);
        // Peeking does not consume.
        assert_eq!(qbuf.len(), FRAME_HEADER_SIZE);
    }
}
