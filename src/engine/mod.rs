//! Transaction landing engine core
//!
//! `TxLander` composes the ledger interface, the pricing oracles, and the
//! delivery channels. Construction performs no I/O; every network operation
//! happens inside a method call, and no state is shared between calls.
//!
//! The component is split into focused modules:
//! - **budget**: compute-unit estimation via ceiling-limit simulation
//! - **assembler**: draft/final smart-transaction assembly

pub mod assembler;
pub mod budget;

use std::sync::Arc;
use std::time::Duration;

use crate::config::LanderConfig;
use crate::errors::LanderError;
use crate::ledger::{LedgerRpc, SolanaLedger};
use crate::oracle::{PriorityFeeClient, TipFloorClient};

/// The transaction landing engine
///
/// Each call is an independent, stateless sequence of network round trips;
/// the engine maintains no shared mutable state across calls.
pub struct TxLander {
    pub(crate) ledger: Arc<dyn LedgerRpc>,
    pub(crate) fee_oracle: PriorityFeeClient,
    pub(crate) tip_floor: TipFloorClient,
    pub(crate) http: reqwest::Client,
    pub(crate) config: LanderConfig,
}

impl TxLander {
    /// Construct the engine over any ledger implementation.
    ///
    /// Validates the configuration and builds the shared HTTP client;
    /// performs no network I/O.
    pub fn new(ledger: Arc<dyn LedgerRpc>, config: LanderConfig) -> Result<Self, LanderError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .build()
            .map_err(|e| LanderError::network("http client construction", e))?;
        let fee_oracle = PriorityFeeClient::new(http.clone(), config.fee_oracle.url.clone());
        let tip_floor = TipFloorClient::new(http.clone(), config.tip.floor_url.clone());
        Ok(Self {
            ledger,
            fee_oracle,
            tip_floor,
            http,
            config,
        })
    }

    /// Construct the engine over a Solana JSON-RPC endpoint
    pub fn from_url(url: &str, config: LanderConfig) -> Result<Self, LanderError> {
        let timeout = Duration::from_millis(config.http_timeout_ms);
        let ledger = Arc::new(SolanaLedger::new_with_timeout(url, timeout));
        Self::new(ledger, config)
    }

    /// The engine configuration
    pub fn config(&self) -> &LanderConfig {
        &self.config
    }
}
