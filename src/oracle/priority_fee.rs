//! Priority-fee oracle client
//!
//! Asks an external fee-estimation service for a recommended
//! micro-lamports-per-CU price for a fully built, signed draft transaction.
//! There is no silent fallback when the oracle has no answer: guessing a fee
//! risks either overpaying or failing to land.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::errors::LanderError;

/// Named fee levels the oracle can price individually
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriorityLevel {
    Min,
    Low,
    Medium,
    High,
    VeryHigh,
    UnsafeMax,
}

/// Options accepted by `getPriorityFeeEstimate`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimateOptions {
    /// Price one explicit level instead of the recommendation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_level: Option<PriorityLevel>,

    /// Encoding of the `transaction` field ("base64")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_encoding: Option<String>,

    /// Ask for the oracle's single recommended value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,

    /// How many recent slots the oracle samples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookback_slots: Option<u32>,

    /// Ask for the full per-level bucket table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_all_priority_fee_levels: Option<bool>,
}

/// One `getPriorityFeeEstimate` request: either a serialized transaction or
/// a bare account-key list, plus options
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimateRequest {
    /// Base64 wire transaction to price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,

    /// Account keys to price, when no transaction is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_keys: Option<Vec<String>>,

    /// Estimation options
    pub options: FeeEstimateOptions,
}

/// Per-level fee buckets in micro-lamports per compute unit
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityFeeLevels {
    pub min: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub very_high: f64,
    pub unsafe_max: f64,
}

/// Oracle response payload; which field is present depends on the request
/// options
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityFeeEstimate {
    /// Single estimate (recommended or explicit-level mode)
    #[serde(default)]
    pub priority_fee_estimate: Option<f64>,

    /// Full bucket table (all-levels mode)
    #[serde(default)]
    pub priority_fee_levels: Option<PriorityFeeLevels>,
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: [&'a FeeEstimateRequest; 1],
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// HTTP client for the priority-fee oracle
#[derive(Debug, Clone)]
pub struct PriorityFeeClient {
    http: Client,
    url: String,
}

impl PriorityFeeClient {
    /// Create a client against the given oracle endpoint
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Issue one `getPriorityFeeEstimate` request
    pub async fn estimate(
        &self,
        request: &FeeEstimateRequest,
    ) -> Result<PriorityFeeEstimate, LanderError> {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getPriorityFeeEstimate",
            params: [request],
        };
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LanderError::network("getPriorityFeeEstimate", e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LanderError::Network {
                context: "getPriorityFeeEstimate",
                message: format!("oracle returned HTTP {status}"),
            });
        }
        let envelope: JsonRpcResponse<PriorityFeeEstimate> = response
            .json()
            .await
            .map_err(|e| LanderError::network("getPriorityFeeEstimate", e))?;
        if let Some(err) = envelope.error {
            return Err(LanderError::Oracle(format!(
                "oracle error {}: {}",
                err.code, err.message
            )));
        }
        envelope
            .result
            .ok_or_else(|| LanderError::Oracle("oracle response carried no result".to_string()))
    }

    /// Recommended micro-lamports-per-CU price for a signed draft
    /// transaction.
    ///
    /// A missing estimate is fatal: assembly cannot proceed without a fee
    /// decision.
    pub async fn recommended_for_transaction(
        &self,
        wire_base64: &str,
    ) -> Result<u64, LanderError> {
        let request = FeeEstimateRequest {
            transaction: Some(wire_base64.to_string()),
            account_keys: None,
            options: FeeEstimateOptions {
                recommended: Some(true),
                transaction_encoding: Some("base64".to_string()),
                ..FeeEstimateOptions::default()
            },
        };
        let estimate = self.estimate(&request).await?;
        let fee = estimate.priority_fee_estimate.ok_or_else(|| {
            LanderError::Oracle("no recommended priority fee in oracle response".to_string())
        })?;
        debug!(micro_lamports_per_cu = fee, "Priority fee recommendation");
        Ok(fee.round() as u64)
    }

    /// Price one explicit fee level for a signed draft transaction
    pub async fn level_for_transaction(
        &self,
        wire_base64: &str,
        level: PriorityLevel,
    ) -> Result<u64, LanderError> {
        let request = FeeEstimateRequest {
            transaction: Some(wire_base64.to_string()),
            account_keys: None,
            options: FeeEstimateOptions {
                priority_level: Some(level),
                transaction_encoding: Some("base64".to_string()),
                ..FeeEstimateOptions::default()
            },
        };
        let estimate = self.estimate(&request).await?;
        let fee = estimate.priority_fee_estimate.ok_or_else(|| {
            LanderError::Oracle(format!("no {level:?} priority fee in oracle response"))
        })?;
        Ok(fee.round() as u64)
    }

    /// Full per-level bucket table for a set of writable accounts
    pub async fn levels_for_account_keys(
        &self,
        account_keys: &[Pubkey],
    ) -> Result<PriorityFeeLevels, LanderError> {
        let request = FeeEstimateRequest {
            transaction: None,
            account_keys: Some(account_keys.iter().map(|k| k.to_string()).collect()),
            options: FeeEstimateOptions {
                include_all_priority_fee_levels: Some(true),
                ..FeeEstimateOptions::default()
            },
        };
        let estimate = self.estimate(&request).await?;
        estimate.priority_fee_levels.ok_or_else(|| {
            LanderError::Oracle("no per-level fee buckets in oracle response".to_string())
        })
    }
}
