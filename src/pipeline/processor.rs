//! Frame processor: decompress, iterate segments, dispatch decoders, emit.

use std::io::Read;
use std::time::Instant;

use bytes::Bytes;
use tracing::debug;

use crate::assets::{GameConstants, OpcodeTable};
use crate::decoders::registry;
use crate::error::PipelineError;
use crate::events::{Diagnostics, Event, EventBus};
use crate::protocol::{
    BufferReader, Direction, Endpoint, Frame, IpcHeader, Packet, Segment, SegmentHeader,
    SegmentType, FRAME_HEADER_SIZE, IPC_HEADER_SIZE, SEG_HEADER_SIZE,
};

use super::reassembler::ReassembledFrame;

/// Outcome of the inflate stage.
enum InflateOutcome {
    Body(Bytes),
    /// Body does not start with a valid zlib header: the encrypted
    /// handshake phase. Dropped without an event.
    Encrypted,
    Failed(String),
}

/// Inflate a compressed frame body.
///
/// The CMF/FLG pair is validated first so encrypted bodies (which cannot be
/// zlib streams) are recognized without running the inflater.
fn inflate(body: &[u8]) -> InflateOutcome {
    let valid_header = body.len() >= 2
        && body[0] & 0x0F == 8
        && (u16::from(body[0]) << 8 | u16::from(body[1])) % 31 == 0;
    if !valid_header {
        return InflateOutcome::Encrypted;
    }
    let mut out = Vec::new();
    match flate2::read::ZlibDecoder::new(body).read_to_end(&mut out) {
        Ok(_) => InflateOutcome::Body(Bytes::from(out)),
        Err(e) => InflateOutcome::Failed(e.to_string()),
    }
}

/// Processes reassembled frames into events.
///
/// Holds no per-flow state; the opcode table and constants for the current
/// region are borrowed per frame so one frame always observes a single
/// consistent map.
pub struct Processor {
    bus: EventBus,
}

impl Processor {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    /// Process one complete frame and emit its events.
    ///
    /// Event order per frame: zero or more `message`/`segment` pairs in
    /// on-wire offset order, then `packet`, then `diagnostics`.
    pub fn process(
        &self,
        source: Endpoint,
        destination: Endpoint,
        frame: ReassembledFrame,
        opcodes: &OpcodeTable,
        constants: Option<&GameConstants>,
    ) {
        let started = Instant::now();
        let header = frame.header;
        let direction = if crate::capture::tcp::in_port_range(destination.port) {
            Direction::Send
        } else {
            Direction::Receive
        };

        let body = frame.data.slice(FRAME_HEADER_SIZE..);
        let body = if header.compressed {
            match inflate(&body) {
                InflateOutcome::Body(inflated) => inflated,
                InflateOutcome::Encrypted => {
                    debug!(port = destination.port, "dropping encrypted frame");
                    return;
                }
                InflateOutcome::Failed(message) => {
                    self.bus.emit(Event::Error(PipelineError::Inflate(message)));
                    return;
                }
            }
        } else {
            body
        };

        let mut segments = Vec::with_capacity(header.segment_count as usize);
        let mut offset = 0usize;
        for _ in 0..header.segment_count {
            // Body exhausted before segment_count: process as many as fit.
            let Some(seg_header) = SegmentHeader::decode(&body[offset.min(body.len())..], direction)
            else {
                break;
            };
            let seg_size = seg_header.size as usize;
            if seg_size < SEG_HEADER_SIZE || offset + seg_size > body.len() {
                break;
            }

            let mut segment = Segment::bare(seg_header);
            if seg_header.segment_type == SegmentType::Ipc {
                self.decode_ipc(&body[offset..offset + seg_size], &mut segment, opcodes, constants);
            }
            self.bus.emit(Event::Segment(segment.clone()));
            segments.push(segment);
            offset += seg_size;
        }
        // Leftover trailing bytes are discarded with the frame.

        self.bus.emit(Event::Packet(Packet {
            source,
            destination,
            frame: Frame { header, segments },
        }));
        self.bus.emit(Event::Diagnostics(Diagnostics {
            last_processing_time_ms: started.elapsed().as_secs_f64() * 1_000.0,
        }));
    }

    /// Decode the IPC portion of one segment, emitting `message` before the
    /// caller emits `segment`.
    fn decode_ipc(
        &self,
        segment_bytes: &[u8],
        segment: &mut Segment,
        opcodes: &OpcodeTable,
        constants: Option<&GameConstants>,
    ) {
        let Some(ipc_header) = IpcHeader::decode(&segment_bytes[SEG_HEADER_SIZE..]) else {
            // Segment too short for a full IPC header: no opcode to
            // dispatch on, but IPC segments always produce a message.
            self.bus.emit(Event::Message {
                name: opcodes.unknown_name(),
                segment: segment.clone(),
            });
            return;
        };
        // The IPC header decoded, so both fixed headers fit the segment.
        let data_len = segment_bytes.len() - (SEG_HEADER_SIZE + IPC_HEADER_SIZE);

        // Over-allocate to the next power of two so decoders that over-read
        // stay inside the buffer; the emitted bytes are the exact-length
        // view of the same allocation.
        let mut padded = vec![0u8; data_len.next_power_of_two()];
        padded[..data_len]
            .copy_from_slice(&segment_bytes[SEG_HEADER_SIZE + IPC_HEADER_SIZE..]);
        let padded = Bytes::from(padded);

        let name = opcodes.name_for(ipc_header.opcode);
        if let (Some(decoder), Some(constants)) = (registry().get(&*name), constants) {
            let mut reader = BufferReader::new(&padded);
            match decoder(&mut reader, constants) {
                Ok(message) => segment.parsed = Some(message),
                Err(e) => self.bus.emit(Event::Error(PipelineError::Decoder {
                    name: name.to_string(),
                    message: e.to_string(),
                })),
            }
        }

        segment.ipc_header = Some(ipc_header);
        segment.ipc_data = Some(padded.slice(..data_len));
        self.bus.emit(Event::Message {
            name,
            segment: segment.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_inflate_roundtrip() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"segment data").unwrap();
        let deflated = encoder.finish().unwrap();

        match inflate(&deflated) {
            InflateOutcome::Body(body) => assert_eq!(&body[..], b"segment data"),
            _ => panic!("expected inflated body"),
        }
    }

    #[test]
    fn test_inflate_rejects_non_zlib_as_encrypted() {
        // 0xAB has a deflate CM nibble of 0xB: not zlib, not an error.
        assert!(matches!(
            inflate(&[0xAB, 0xCD, 0x01, 0x02]),
            InflateOutcome::Encrypted
        ));
        assert!(matches!(inflate(&[]), InflateOutcome::Encrypted));
        // Valid CM but broken FCHECK.
        assert!(matches!(
            inflate(&[0x78, 0x00]),
            InflateOutcome::Encrypted
        ));
    }

    #[test]
    fn test_inflate_reports_corrupt_stream() {
        // A valid zlib header (0x78 0x9C) followed by garbage.
        let corrupt = [0x78, 0x9C, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(inflate(&corrupt), InflateOutcome::Failed(_)));
    }
}
