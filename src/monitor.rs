//! Monitor builder and capture lifecycle.
//!
//! The [`MonitorBuilder`] configures the region and asset provider and
//! builds the monitor. The [`Monitor`] manages the lifecycle:
//! 1. Load opcode and constants tables (latches `ready`)
//! 2. Open a capture device (or any [`PacketSource`])
//! 3. Decode TCP payloads and feed the pipeline on a blocking task
//! 4. Close, letting the in-flight frame run to completion
//!
//! # Example
//!
//! ```ignore
//! use xivmon::{Event, Monitor, Region};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut monitor = Monitor::builder(Region::Global).start().await?;
//!     let mut events = monitor.subscribe();
//!
//!     monitor.open("eth0").await?;
//!     while let Ok(event) = events.recv().await {
//!         if let Event::Message { name, .. } = event {
//!             println!("{name}");
//!         }
//!     }
//!     monitor.close().await;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::assets::{
    AssetProvider, GameConstants, OpcodeTable, Region, RegionOpcodes, RemoteAssets,
};
use crate::capture::{self, tcp, DatalinkSource, DeviceInfo, PacketSource};
use crate::error::{MonitorError, Result};
use crate::events::{Event, EventBus};
use crate::pipeline::{Pipeline, SharedConstants, SharedOpcodes};

/// Builder for configuring and creating a [`Monitor`].
pub struct MonitorBuilder {
    region: Region,
    assets: Box<dyn AssetProvider>,
    channel_capacity: usize,
}

impl MonitorBuilder {
    /// A builder for the given region, fetching tables from the upstream
    /// repository.
    pub fn new(region: Region) -> Self {
        Self {
            region,
            assets: Box::new(RemoteAssets::new()),
            channel_capacity: 1024,
        }
    }

    /// Replace the asset provider (mirrors, bundled tables, tests).
    pub fn assets(mut self, provider: impl AssetProvider + 'static) -> Self {
        self.assets = Box::new(provider);
        self
    }

    /// Capacity of the event broadcast channel.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Load the asset tables and build the monitor.
    ///
    /// On success the `ready` latch is set. On failure `ready` never fires
    /// and the error is returned; retrying is the caller's responsibility.
    pub async fn start(self) -> Result<Monitor> {
        let tables = self.assets.opcodes().await?;
        let constants_by_region = self.assets.constants().await?;

        let bus = EventBus::with_capacity(self.channel_capacity);
        let opcodes: SharedOpcodes = Arc::new(RwLock::new(Arc::new(OpcodeTable::build(
            self.region,
            &tables,
        ))));
        let constants: SharedConstants = Arc::new(RwLock::new(
            constants_by_region
                .get(self.region.as_str())
                .cloned()
                .map(Arc::new),
        ));

        bus.mark_ready();
        debug!(region = %self.region, opcodes = opcodes.read().len(), "tables loaded");

        Ok(Monitor {
            region: self.region,
            tables,
            constants_by_region,
            opcodes,
            constants,
            bus,
            capture: None,
        })
    }
}

/// Handle to a running capture loop.
struct CaptureHandle {
    shutdown: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// A passive protocol monitor.
pub struct Monitor {
    region: Region,
    tables: Vec<RegionOpcodes>,
    constants_by_region: HashMap<String, GameConstants>,
    opcodes: SharedOpcodes,
    constants: SharedConstants,
    bus: EventBus,
    capture: Option<CaptureHandle>,
}

impl Monitor {
    /// Create a builder for the given region.
    pub fn builder(region: Region) -> MonitorBuilder {
        MonitorBuilder::new(region)
    }

    /// List capture-capable interfaces.
    pub fn devices() -> Vec<DeviceInfo> {
        capture::devices()
    }

    /// The currently selected region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Subscribe to the ordered event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Wait until the asset tables are loaded.
    ///
    /// Late joiners resolve immediately; the latch is set before `start`
    /// returns.
    pub async fn ready(&self) {
        self.bus.ready().await;
    }

    /// Open the named capture device and start the capture loop.
    ///
    /// Device and permission problems surface here synchronously; once the
    /// loop is running, per-packet conditions are demoted to `error`
    /// events.
    pub async fn open(&mut self, device: &str) -> Result<()> {
        let source = DatalinkSource::open(device)?;
        self.open_source(Box::new(source))
    }

    /// Start the capture loop over any packet source.
    pub fn open_source(&mut self, mut source: Box<dyn PacketSource>) -> Result<()> {
        if self.capture.is_some() {
            return Err(MonitorError::AlreadyOpen);
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let mut pipeline = Pipeline::new(
            self.bus.clone(),
            self.opcodes.clone(),
            self.constants.clone(),
        );

        let stop = shutdown.clone();
        let task = tokio::task::spawn_blocking(move || {
            while !stop.load(Ordering::Relaxed) {
                match source.next_packet() {
                    Ok(Some(frame)) => {
                        if let Some(tp) = tcp::extract(&frame) {
                            pipeline.handle_payload(tp.source, tp.destination, &tp.payload);
                        }
                    }
                    Ok(None) => continue,
                    Err(e) => {
                        error!("capture source failed: {e}");
                        break;
                    }
                }
            }
        });

        self.capture = Some(CaptureHandle { shutdown, task });
        Ok(())
    }

    /// Stop the capture loop and release the device.
    ///
    /// The frame being processed at close time runs to completion before
    /// the loop observes the shutdown flag.
    pub async fn close(&mut self) {
        if let Some(handle) = self.capture.take() {
            handle.shutdown.store(true, Ordering::Relaxed);
            if let Err(e) = handle.task.await {
                error!("capture task panicked: {e}");
            }
        }
    }

    /// Switch regions.
    ///
    /// Rebuilds the opcode index and constants from the loaded tables and
    /// swaps them atomically: a frame in flight observes either the old or
    /// the new map, never a mix, and the next frame uses the new one.
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
        let table = Arc::new(OpcodeTable::build(region, &self.tables));
        *self.opcodes.write() = table;
        *self.constants.write() = self
            .constants_by_region
            .get(region.as_str())
            .cloned()
            .map(Arc::new);
        debug!(region = %region, "opcode index rebuilt");
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Some(handle) = &self.capture {
            handle.shutdown.store(true, Ordering::Relaxed);
        }
    }
}
