//! Flow demultiplexer.
//!
//! The destination TCP port is the flow key: a client port talks to one
//! server port per connection, and concurrent connections use disjoint
//! ports, so payloads sharing a destination port belong to one byte stream
//! regardless of source address. Entries are lazy-inserted and live until
//! the table is dropped with the capture session.

use std::collections::HashMap;

use crate::protocol::QueueBuffer;

/// Per-destination-port flow buffers.
pub struct FlowTable {
    flows: HashMap<u16, QueueBuffer>,
}

impl FlowTable {
    pub fn new() -> Self {
        Self {
            flows: HashMap::new(),
        }
    }

    /// The flow buffer for `dst_port`, created on first sight.
    pub fn buffer(&mut self, dst_port: u16) -> &mut QueueBuffer {
        self.flows.entry(dst_port).or_default()
    }

    /// Number of live flows.
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Whether no flow has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

impl Default for FlowTable {
    fn default() -> Self {
        Self::new()
    }
}
