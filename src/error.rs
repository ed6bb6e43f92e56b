//! Error types for xivmon.
//!
//! Only configuration-time failures cross the public surface as `Result`s;
//! per-packet conditions are demoted to [`crate::events::Event::Error`]
//! events so a stream of bad frames cannot take down the pipeline.

use thiserror::Error;

use crate::assets::AssetError;
use crate::capture::SourceError;

/// Errors surfaced by the public monitor operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Failure inside the capture driver: device not found, unsupported
    /// channel, or insufficient permissions.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Opcode or constants table fetch failed; `ready` will not fire.
    #[error("asset load failed: {0}")]
    Asset(#[from] AssetError),

    /// A capture is already running on this monitor.
    #[error("capture already open")]
    AlreadyOpen,
}

/// Result type alias using MonitorError.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Per-packet conditions reported on the `error` event stream.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Inflating a compressed frame body failed for a reason other than an
    /// invalid zlib header (which is treated as an encrypted frame and
    /// dropped silently).
    #[error("inflate failed: {0}")]
    Inflate(String),

    /// A message decoder rejected an IPC body; the segment and packet are
    /// still emitted with the raw bytes.
    #[error("decoder {name} failed: {message}")]
    Decoder { name: String, message: String },

    /// A flow buffer hit its capacity bound; its buffered bytes were
    /// dropped to resynchronize.
    #[error("flow {port} overflowed, dropped {dropped} buffered bytes")]
    FlowOverflow { port: u16, dropped: usize },
}
