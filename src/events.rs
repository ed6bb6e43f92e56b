//! Event bus for the capture pipeline.
//!
//! All pipeline output flows through one ordered [`Event`] stream backed by
//! a `tokio::sync::broadcast` channel, so the per-frame ordering guarantee
//! (`message`/`segment` pairs in offset order, then `packet`, then
//! `diagnostics`) is observable by every subscriber. `ready` is a separate
//! `watch` latch with late-join semantics: it fires once after the asset
//! tables are loaded and later subscribers observe it immediately.
//!
//! Delivery is synchronous with processing on the sender side; a subscriber
//! that falls behind the channel capacity lags and loses the oldest events
//! (back-pressure is the consumer's problem).

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::error::PipelineError;
use crate::protocol::{Packet, Segment};

/// Default broadcast channel capacity.
const DEFAULT_CAPACITY: usize = 1024;

/// Timing report emitted after every processed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    /// Wall time spent processing the last frame, in milliseconds.
    pub last_processing_time_ms: f64,
}

/// One event on the pipeline stream.
#[derive(Debug, Clone)]
pub enum Event {
    /// A named IPC message, with its owning segment.
    Message { name: Arc<str>, segment: Segment },
    /// A parsed segment of any type.
    Segment(Segment),
    /// A fully processed frame.
    Packet(Packet),
    /// Per-frame timing.
    Diagnostics(Diagnostics),
    /// A demoted per-packet failure.
    Error(PipelineError),
}

/// Subscribe/emit hub shared by the pipeline and the public surface.
#[derive(Clone)]
pub struct EventBus {
    events: broadcast::Sender<Event>,
    ready_tx: watch::Sender<bool>,
}

impl EventBus {
    /// A bus with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A bus with a custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        let (ready_tx, _) = watch::channel(false);
        Self { events, ready_tx }
    }

    /// Subscribe to the ordered event stream.
    ///
    /// Only events emitted after subscription are observed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Emit an event to all current subscribers.
    ///
    /// A send with no subscribers is not an error; the event is dropped.
    pub fn emit(&self, event: Event) {
        let _ = self.events.send(event);
    }

    /// Latch the `ready` signal. Idempotent.
    pub fn mark_ready(&self) {
        self.ready_tx.send_replace(true);
    }

    /// A watch handle over the `ready` latch.
    pub fn ready_watch(&self) -> watch::Receiver<bool> {
        self.ready_tx.subscribe()
    }

    /// Wait until the asset tables are loaded.
    ///
    /// Resolves immediately for late joiners once the latch is set.
    pub async fn ready(&self) {
        let mut rx = self.ready_tx.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
