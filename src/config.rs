//! Configuration for the landing engine
//!
//! This module handles configuration loading from TOML files and provides
//! structured configuration types. Tip account pools, relay region tables,
//! and tip floors are explicit configuration data passed into the engine at
//! construction, so tests can substitute deterministic pools and URLs.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::errors::LanderError;
use crate::types::Region;

/// Ledger ceiling on a transaction's compute-unit limit
pub const MAX_COMPUTE_UNIT_LIMIT: u32 = 1_400_000;

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanderConfig {
    /// Compute budget estimation
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Priority fee oracle
    #[serde(default)]
    pub fee_oracle: FeeOracleConfig,

    /// Relay tip pricing
    #[serde(default)]
    pub tip: TipConfig,

    /// Relay region endpoints
    #[serde(default)]
    pub relay: RelayConfig,

    /// Confirmation polling
    #[serde(default)]
    pub confirm: ConfirmConfig,

    /// HTTP request timeout in milliseconds
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Floor on the negotiated compute-unit limit
    #[serde(default = "default_min_units")]
    pub min_units: u32,

    /// Safety buffer applied over simulated consumption (0.10 = +10%)
    #[serde(default = "default_buffer_pct")]
    pub buffer_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeOracleConfig {
    /// JSON-RPC endpoint serving `getPriorityFeeEstimate`
    #[serde(default = "default_fee_oracle_url")]
    pub url: String,

    /// Cap on the oracle estimate in micro-lamports per compute unit
    #[serde(default)]
    pub priority_fee_cap: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipConfig {
    /// Tip-floor statistics endpoint (75th-percentile landed tips)
    #[serde(default = "default_tip_floor_url")]
    pub floor_url: String,

    /// Minimum tip in SOL for single-route (SWQoS-only) delivery
    #[serde(default = "default_swqos_min_sol")]
    pub swqos_min_sol: f64,

    /// Minimum tip in SOL for dual-route delivery
    #[serde(default = "default_dual_min_sol")]
    pub dual_min_sol: f64,

    /// Pool of tip-receiving accounts; the destination is drawn uniformly
    /// at random per call to spread write-lock contention across
    /// concurrent tippers
    #[serde(default = "default_tip_accounts")]
    pub tip_accounts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Region to endpoint URL table
    #[serde(default = "default_relay_endpoints")]
    pub endpoints: BTreeMap<Region, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmConfig {
    /// Block-height offset used when a submission computes its own expiry
    /// (`min(last_valid_block_height, current_height + offset)`)
    #[serde(default = "default_block_height_offset")]
    pub block_height_offset: u64,
}

// Default value functions
fn default_min_units() -> u32 {
    1_000
}
fn default_buffer_pct() -> f64 {
    0.10
}
fn default_fee_oracle_url() -> String {
    "https://mainnet.helius-rpc.com".to_string()
}
fn default_tip_floor_url() -> String {
    "https://bundles.jito.wtf/api/v1/bundles/tip_floor".to_string()
}
fn default_swqos_min_sol() -> f64 {
    0.0005
}
fn default_dual_min_sol() -> f64 {
    0.001
}
fn default_tip_accounts() -> Vec<String> {
    [
        "96gYZGLnJYVFmbjzopPSU6QiEV5fGqZNyN9nmNhvrZU5",
        "HFqU5x63VTqvQss8hp11i4wVV8bD44PvwucfZ2bU7gRe",
        "Cw8CFyM9FkoMi7K7Crf6HNQqf4uEMzpKw6QNghXLvLkY",
        "ADaUMid9yfUytqMBgopwjb2DTLSokTSzL1zt6iGPaS49",
        "DfXygSm4jCyNCybVYYK6DwvWqjKee8pbDmJGcLWNDXjh",
        "ADuUkR4vqLUMWXxW9gh6D6L8pMSawimctcNZ5pGwDcEt",
        "DttWaMuVvTiduZRnguLF7jNxTgiMBZ1hyAumKUiL2KRL",
        "3AVi9Tg9Uo68tJfuvoKvqKNWKkC5wPdSSdeBnizKZ6jT",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_relay_endpoints() -> BTreeMap<Region, String> {
    Region::ALL
        .iter()
        .map(|region| {
            (
                *region,
                format!("http://{}-sender.helius-rpc.com/fast", region.code()),
            )
        })
        .collect()
}
fn default_block_height_offset() -> u64 {
    150
}
fn default_http_timeout_ms() -> u64 {
    10_000
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            min_units: default_min_units(),
            buffer_pct: default_buffer_pct(),
        }
    }
}

impl Default for FeeOracleConfig {
    fn default() -> Self {
        Self {
            url: default_fee_oracle_url(),
            priority_fee_cap: None,
        }
    }
}

impl Default for TipConfig {
    fn default() -> Self {
        Self {
            floor_url: default_tip_floor_url(),
            swqos_min_sol: default_swqos_min_sol(),
            dual_min_sol: default_dual_min_sol(),
            tip_accounts: default_tip_accounts(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoints: default_relay_endpoints(),
        }
    }
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            block_height_offset: default_block_height_offset(),
        }
    }
}

impl Default for LanderConfig {
    fn default() -> Self {
        Self {
            budget: BudgetConfig::default(),
            fee_oracle: FeeOracleConfig::default(),
            tip: TipConfig::default(),
            relay: RelayConfig::default(),
            confirm: ConfirmConfig::default(),
            http_timeout_ms: default_http_timeout_ms(),
        }
    }
}

impl LanderConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LanderConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate configuration values before first use
    pub fn validate(&self) -> Result<(), LanderError> {
        if self.budget.min_units == 0 {
            return Err(LanderError::Configuration(
                "budget.min_units must be > 0".to_string(),
            ));
        }
        if self.budget.min_units > MAX_COMPUTE_UNIT_LIMIT {
            return Err(LanderError::Configuration(format!(
                "budget.min_units ({}) exceeds the ledger ceiling ({})",
                self.budget.min_units, MAX_COMPUTE_UNIT_LIMIT
            )));
        }
        if !self.budget.buffer_pct.is_finite() || self.budget.buffer_pct < 0.0 {
            return Err(LanderError::Configuration(
                "budget.buffer_pct must be a non-negative finite number".to_string(),
            ));
        }
        if self.fee_oracle.url.is_empty() {
            return Err(LanderError::Configuration(
                "fee_oracle.url must not be empty".to_string(),
            ));
        }
        if self.tip.swqos_min_sol <= 0.0 || self.tip.dual_min_sol <= 0.0 {
            return Err(LanderError::Configuration(
                "tip minimums must be > 0".to_string(),
            ));
        }
        if self.tip.tip_accounts.is_empty() {
            return Err(LanderError::Configuration(
                "tip.tip_accounts must contain at least one account".to_string(),
            ));
        }
        for account in &self.tip.tip_accounts {
            Pubkey::from_str(account).map_err(|_| {
                LanderError::Configuration(format!("invalid tip account pubkey: {account}"))
            })?;
        }
        if self.relay.endpoints.is_empty() {
            return Err(LanderError::Configuration(
                "relay.endpoints must contain at least one region".to_string(),
            ));
        }
        if self.http_timeout_ms == 0 {
            return Err(LanderError::Configuration(
                "http_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the relay endpoint for a region
    pub fn relay_endpoint(&self, region: Region) -> Result<&str, LanderError> {
        self.relay
            .endpoints
            .get(&region)
            .map(|s| s.as_str())
            .ok_or_else(|| {
                LanderError::Configuration(format!("no relay endpoint configured for region {region}"))
            })
    }

    /// Parsed tip account pool
    pub fn tip_account_pool(&self) -> Result<Vec<Pubkey>, LanderError> {
        self.tip
            .tip_accounts
            .iter()
            .map(|s| {
                Pubkey::from_str(s).map_err(|_| {
                    LanderError::Configuration(format!("invalid tip account pubkey: {s}"))
                })
            })
            .collect()
    }
}
