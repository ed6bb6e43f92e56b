//! Asset loading: opcode and constants tables.
//!
//! The tables live outside the crate (the FFXIVOpcodes repository publishes
//! them as JSON); [`AssetProvider`] is the loader boundary. The default
//! [`RemoteAssets`] implementation fetches them over HTTPS; tests and
//! offline deployments can supply [`StaticAssets`] instead.

pub mod constants;
pub mod opcodes;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

pub use constants::GameConstants;
pub use opcodes::{OpcodeEntry, OpcodeLists, OpcodeTable, Region, RegionOpcodes};

/// Upstream URL of the opcode table.
pub const OPCODES_URL: &str =
    "https://raw.githubusercontent.com/karashiiro/FFXIVOpcodes/master/opcodes.min.json";

/// Upstream URL of the constants table.
pub const CONSTANTS_URL: &str =
    "https://raw.githubusercontent.com/karashiiro/FFXIVOpcodes/master/constants.min.json";

/// Errors produced while loading asset tables.
#[derive(Debug, Error)]
pub enum AssetError {
    /// HTTP transport or status failure.
    #[error("fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The fetched document did not parse.
    #[error("malformed table: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loader boundary for the opcode and constants tables.
#[async_trait]
pub trait AssetProvider: Send + Sync {
    /// All regions' opcode lists.
    async fn opcodes(&self) -> Result<Vec<RegionOpcodes>, AssetError>;

    /// Constants keyed by region name.
    async fn constants(&self) -> Result<HashMap<String, GameConstants>, AssetError>;
}

/// Fetches the tables from the upstream repository.
pub struct RemoteAssets {
    client: reqwest::Client,
    opcodes_url: String,
    constants_url: String,
}

impl RemoteAssets {
    /// A provider pointing at the upstream URLs.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            opcodes_url: OPCODES_URL.to_string(),
            constants_url: CONSTANTS_URL.to_string(),
        }
    }

    /// A provider pointing at custom mirrors.
    pub fn with_urls(opcodes_url: impl Into<String>, constants_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            opcodes_url: opcodes_url.into(),
            constants_url: constants_url.into(),
        }
    }
}

impl Default for RemoteAssets {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetProvider for RemoteAssets {
    async fn opcodes(&self) -> Result<Vec<RegionOpcodes>, AssetError> {
        let tables = self
            .client
            .get(&self.opcodes_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(tables)
    }

    async fn constants(&self) -> Result<HashMap<String, GameConstants>, AssetError> {
        let constants = self
            .client
            .get(&self.constants_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(constants)
    }
}

/// Serves pre-loaded tables; for tests and offline use.
#[derive(Default, Clone)]
pub struct StaticAssets {
    pub opcodes: Vec<RegionOpcodes>,
    pub constants: HashMap<String, GameConstants>,
}

#[async_trait]
impl AssetProvider for StaticAssets {
    async fn opcodes(&self) -> Result<Vec<RegionOpcodes>, AssetError> {
        Ok(self.opcodes.clone())
    }

    async fn constants(&self) -> Result<HashMap<String, GameConstants>, AssetError> {
        Ok(self.constants.clone())
    }
}
