//! Frame reassembly over a flow buffer.
//!
//! After each fragment lands in a flow's queue buffer, the reassembler
//! drains every frame that has fully arrived. A candidate whose magic does
//! not match is a resync point: the loop exits and waits for more data
//! rather than consuming bytes it cannot frame (TCP ordering guarantees a
//! magical frame at offset 0 of a fresh connection).

use bytes::Bytes;

use crate::protocol::{try_get_frame_header, FrameHeader, QueueBuffer, FRAME_HEADER_SIZE};

/// A complete frame popped from a flow buffer: header plus the raw frame
/// bytes (header included).
pub struct ReassembledFrame {
    pub header: FrameHeader,
    pub data: Bytes,
}

/// Drain all complete frames currently buffered in `qbuf`.
///
/// Frames come out in arrival order. The loop stops at the first candidate
/// that is incomplete, non-magical, or malformed (declared size smaller
/// than the header itself).
pub fn drain_frames(qbuf: &mut QueueBuffer) -> Vec<ReassembledFrame> {
    let mut frames = Vec::new();
    loop {
        let Some(header) = try_get_frame_header(qbuf) else {
            break;
        };
        if !header.is_magical() {
            break;
        }
        let size = header.size as usize;
        if size < FRAME_HEADER_SIZE {
            break;
        }
        if qbuf.len() < size {
            break;
        }
        let Some(data) = qbuf.pop(size) else {
            break;
        };
        frames.push(ReassembledFrame { header, data });
    }
    frames
}
