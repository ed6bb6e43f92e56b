//! Capture pipeline: flow demultiplexing, frame reassembly, processing.

pub mod demux;
pub mod processor;
pub mod reassembler;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::assets::{GameConstants, OpcodeTable};
use crate::error::PipelineError;
use crate::events::{Event, EventBus};
use crate::protocol::Endpoint;

pub use demux::FlowTable;
pub use processor::Processor;
pub use reassembler::{drain_frames, ReassembledFrame};

/// Opcode table slot shared between the pipeline and the public surface.
///
/// `set_region` swaps the inner `Arc`; the processor clones it once per
/// frame, so a frame in flight observes a single consistent map.
pub type SharedOpcodes = Arc<RwLock<Arc<OpcodeTable>>>;

/// Constants slot shared the same way. `None` until the region's constants
/// are known; decoders only run once they are.
pub type SharedConstants = Arc<RwLock<Option<Arc<GameConstants>>>>;

/// The per-connection state machine from TCP payload fragments to events.
///
/// All methods run on the capture thread; the only cross-thread touch
/// points are the shared table slots and the event bus.
pub struct Pipeline {
    flows: FlowTable,
    processor: Processor,
    opcodes: SharedOpcodes,
    constants: SharedConstants,
    bus: EventBus,
}

impl Pipeline {
    pub fn new(bus: EventBus, opcodes: SharedOpcodes, constants: SharedConstants) -> Self {
        Self {
            flows: FlowTable::new(),
            processor: Processor::new(bus.clone()),
            opcodes,
            constants,
            bus,
        }
    }

    /// Feed one TCP payload fragment into its flow and process every frame
    /// that completes as a result.
    pub fn handle_payload(&mut self, source: Endpoint, destination: Endpoint, payload: &[u8]) {
        let flow = self.flows.buffer(destination.port);
        if flow.push(payload).is_err() {
            let dropped = flow.len();
            flow.clear();
            self.bus.emit(Event::Error(PipelineError::FlowOverflow {
                port: destination.port,
                dropped,
            }));
            return;
        }
        trace!(
            port = destination.port,
            bytes = payload.len(),
            "buffered fragment"
        );

        let frames = drain_frames(flow);
        if frames.is_empty() {
            return;
        }
        let opcodes = self.opcodes.read().clone();
        let constants = self.constants.read().clone();
        for frame in frames {
            self.processor
                .process(source, destination, frame, &opcodes, constants.as_deref());
        }
    }
}
