//! # xivmon
//!
//! Passive network monitor for the FFXIV client-server protocol.
//!
//! The crate observes TCP traffic on the game's well-known port ranges,
//! reassembles protocol frames out of fragmented payloads, inflates
//! compressed frame bodies, splits frames into typed segments, and decodes
//! IPC messages into typed records keyed by a region-scoped opcode index.
//! Consumers subscribe to a single ordered event stream.
//!
//! ## Architecture
//!
//! - **Capture** (`capture`): driver boundary trait plus a `pnet` datalink
//!   backend and the Ethernet/IPv4/TCP payload selection.
//! - **Protocol** (`protocol`): wire layouts, the per-flow queue buffer,
//!   and the binary reader decoders consume.
//! - **Pipeline** (`pipeline`): flow demultiplexer, frame reassembler, and
//!   the frame processor that emits events.
//! - **Assets** (`assets`): loader boundary for the opcode and constants
//!   tables published by the FFXIVOpcodes repository.
//! - **Decoders** (`decoders`): static name-keyed table of message
//!   decoders.
//!
//! ## Example
//!
//! ```ignore
//! use xivmon::{Event, Monitor, Region};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut monitor = Monitor::builder(Region::Global).start().await?;
//!     let mut events = monitor.subscribe();
//!     monitor.open("eth0").await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             Event::Message { name, segment } => {
//!                 println!("{name}: {:?}", segment.parsed)
//!             }
//!             Event::Error(e) => eprintln!("{e}"),
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod capture;
pub mod decoders;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod protocol;

mod monitor;

pub use assets::{AssetProvider, Region, RemoteAssets, StaticAssets};
pub use capture::{DeviceInfo, PacketSource};
pub use decoders::IpcMessage;
pub use error::{MonitorError, PipelineError, Result};
pub use events::{Diagnostics, Event, EventBus};
pub use monitor::{Monitor, MonitorBuilder};
pub use protocol::{Endpoint, Frame, Packet, Segment};
