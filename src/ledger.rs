//! Narrow ledger interface consumed by the engine
//!
//! The engine drives five ledger operations: blockhash fetch, block height,
//! simulation, raw submission, and signature status. They are modeled as a
//! trait so the assembler and confirmation poller can run against a scripted
//! ledger in tests.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::{
    config::{RpcSendTransactionConfig, RpcSimulateTransactionConfig},
    request::RpcRequest,
};
use solana_sdk::{
    commitment_config::CommitmentConfig, signature::Signature,
    transaction::TransactionError, transaction::VersionedTransaction,
};
use solana_transaction_status::TransactionConfirmationStatus;

use crate::errors::LanderError;
use crate::types::BlockhashLifetime;

/// Result of simulating a draft transaction
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    /// On-chain error reported by the simulated execution, if any
    pub err: Option<TransactionError>,
    /// Compute units the simulated execution consumed
    pub units_consumed: Option<u64>,
    /// Program logs, when the node returned them
    pub logs: Vec<String>,
}

/// Signature status as reported by the ledger
#[derive(Debug, Clone)]
pub struct SignatureStatusSummary {
    /// On-chain execution error, if the transaction landed and failed
    pub err: Option<TransactionError>,
    /// Confirmation level the signature has reached
    pub confirmation_status: Option<TransactionConfirmationStatus>,
}

/// The ledger operations the engine depends on
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Fetch a recent blockhash and its validity bound
    async fn latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<BlockhashLifetime, LanderError>;

    /// Current block height
    async fn block_height(&self, commitment: CommitmentConfig) -> Result<u64, LanderError>;

    /// Simulate a transaction with signature verification disabled and the
    /// blockhash replaced by a current one
    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationSummary, LanderError>;

    /// Submit a base64 wire transaction once; no polling
    async fn send_wire_transaction(
        &self,
        wire_base64: &str,
        config: RpcSendTransactionConfig,
    ) -> Result<Signature, LanderError>;

    /// Fetch the status of one signature, `None` while unknown
    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatusSummary>, LanderError>;
}

/// `LedgerRpc` over a Solana JSON-RPC node
pub struct SolanaLedger {
    rpc: RpcClient,
}

impl SolanaLedger {
    /// Connect to an RPC endpoint with the client's default timeout
    pub fn new(url: impl ToString) -> Self {
        Self {
            rpc: RpcClient::new(url.to_string()),
        }
    }

    /// Connect to an RPC endpoint with an explicit request timeout
    pub fn new_with_timeout(url: impl ToString, timeout: Duration) -> Self {
        Self {
            rpc: RpcClient::new_with_timeout(url.to_string(), timeout),
        }
    }

    /// Wrap an existing client
    pub fn from_rpc_client(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// Access the underlying client
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

#[async_trait]
impl LedgerRpc for SolanaLedger {
    async fn latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<BlockhashLifetime, LanderError> {
        let (blockhash, last_valid_block_height) = self
            .rpc
            .get_latest_blockhash_with_commitment(commitment)
            .await
            .map_err(|e| LanderError::network("getLatestBlockhash", e))?;
        Ok(BlockhashLifetime {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn block_height(&self, commitment: CommitmentConfig) -> Result<u64, LanderError> {
        self.rpc
            .get_block_height_with_commitment(commitment)
            .await
            .map_err(|e| LanderError::network("getBlockHeight", e))
    }

    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationSummary, LanderError> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(CommitmentConfig::processed()),
            ..RpcSimulateTransactionConfig::default()
        };
        let response = self
            .rpc
            .simulate_transaction_with_config(transaction, config)
            .await
            .map_err(|e| LanderError::network("simulateTransaction", e))?;
        let value = response.value;
        Ok(SimulationSummary {
            err: value.err,
            units_consumed: value.units_consumed,
            logs: value.logs.unwrap_or_default(),
        })
    }

    async fn send_wire_transaction(
        &self,
        wire_base64: &str,
        config: RpcSendTransactionConfig,
    ) -> Result<Signature, LanderError> {
        // The wire form is submitted as-is; the node decodes base64 per the
        // encoding field in the config.
        let params = serde_json::json!([wire_base64, config]);
        let signature: String = self
            .rpc
            .send(RpcRequest::SendTransaction, params)
            .await
            .map_err(|e| LanderError::network("sendTransaction", e))?;
        Signature::from_str(&signature).map_err(|e| {
            LanderError::Serialization(format!("ledger returned malformed signature: {e}"))
        })
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatusSummary>, LanderError> {
        let response = self
            .rpc
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| LanderError::network("getSignatureStatuses", e))?;
        Ok(response
            .value
            .into_iter()
            .next()
            .flatten()
            .map(|status| SignatureStatusSummary {
                err: status.err,
                confirmation_status: status.confirmation_status,
            }))
    }
}
