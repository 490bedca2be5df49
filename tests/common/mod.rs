//! Shared test support: a scripted ledger and small fixture helpers
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use solana_rpc_client_api::config::RpcSendTransactionConfig;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{TransactionError, VersionedTransaction},
};
use solana_transaction_status::TransactionConfirmationStatus;

use lander::{
    BlockhashLifetime, LanderConfig, LanderError, LedgerRpc, SendOptions, SignatureStatusSummary,
    SimulationSummary,
};

/// Ledger with scripted responses. Each queue pops front; the last entry
/// repeats so open-ended polling scripts stay short.
#[derive(Default)]
pub struct MockLedger {
    pub blockhashes: Mutex<VecDeque<BlockhashLifetime>>,
    pub block_heights: Mutex<VecDeque<u64>>,
    pub simulations: Mutex<VecDeque<SimulationSummary>>,
    pub send_results: Mutex<VecDeque<Result<Signature, LanderError>>>,
    pub statuses: Mutex<VecDeque<Option<SignatureStatusSummary>>>,
    /// Every wire payload submitted through `send_wire_transaction`
    pub sent_wires: Mutex<Vec<String>>,
    /// Number of `signature_status` calls observed
    pub status_checks: Mutex<u32>,
}

fn next_repeating<T: Clone>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_blockhash(&self, lifetime: BlockhashLifetime) {
        self.blockhashes.lock().unwrap().push_back(lifetime);
    }

    pub fn push_block_height(&self, height: u64) {
        self.block_heights.lock().unwrap().push_back(height);
    }

    pub fn push_simulation(&self, summary: SimulationSummary) {
        self.simulations.lock().unwrap().push_back(summary);
    }

    pub fn push_send_result(&self, result: Result<Signature, LanderError>) {
        self.send_results.lock().unwrap().push_back(result);
    }

    pub fn push_status(&self, status: Option<SignatureStatusSummary>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub fn status_check_count(&self) -> u32 {
        *self.status_checks.lock().unwrap()
    }

    pub fn sent_wire_count(&self) -> usize {
        self.sent_wires.lock().unwrap().len()
    }
}

#[async_trait]
impl LedgerRpc for MockLedger {
    async fn latest_blockhash(
        &self,
        _commitment: CommitmentConfig,
    ) -> Result<BlockhashLifetime, LanderError> {
        next_repeating(&self.blockhashes)
            .ok_or_else(|| LanderError::network("getLatestBlockhash", "mock script exhausted"))
    }

    async fn block_height(&self, _commitment: CommitmentConfig) -> Result<u64, LanderError> {
        next_repeating(&self.block_heights)
            .ok_or_else(|| LanderError::network("getBlockHeight", "mock script exhausted"))
    }

    async fn simulate_transaction(
        &self,
        _transaction: &VersionedTransaction,
    ) -> Result<SimulationSummary, LanderError> {
        next_repeating(&self.simulations)
            .ok_or_else(|| LanderError::network("simulateTransaction", "mock script exhausted"))
    }

    async fn send_wire_transaction(
        &self,
        wire_base64: &str,
        _config: RpcSendTransactionConfig,
    ) -> Result<Signature, LanderError> {
        self.sent_wires.lock().unwrap().push(wire_base64.to_string());
        next_repeating(&self.send_results)
            .ok_or_else(|| LanderError::network("sendTransaction", "mock script exhausted"))?
    }

    async fn signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<SignatureStatusSummary>, LanderError> {
        *self.status_checks.lock().unwrap() += 1;
        Ok(next_repeating(&self.statuses).unwrap_or(None))
    }
}

/// A lifetime with a unique blockhash and the given bound
pub fn lifetime(last_valid_block_height: u64) -> BlockhashLifetime {
    BlockhashLifetime {
        blockhash: Hash::new_unique(),
        last_valid_block_height,
    }
}

/// A successful simulation consuming the given units
pub fn sim_ok(units_consumed: u64) -> SimulationSummary {
    SimulationSummary {
        err: None,
        units_consumed: Some(units_consumed),
        logs: Vec::new(),
    }
}

/// A simulation that failed on-chain
pub fn sim_err(err: TransactionError) -> SimulationSummary {
    SimulationSummary {
        err: Some(err),
        units_consumed: None,
        logs: vec!["Program log: boom".to_string()],
    }
}

/// A clean status at the given confirmation level
pub fn status_at(confirmation: TransactionConfirmationStatus) -> SignatureStatusSummary {
    SignatureStatusSummary {
        err: None,
        confirmation_status: Some(confirmation),
    }
}

pub fn confirmed_status() -> SignatureStatusSummary {
    status_at(TransactionConfirmationStatus::Confirmed)
}

pub fn failed_status(err: TransactionError) -> SignatureStatusSummary {
    SignatureStatusSummary {
        err: Some(err),
        confirmation_status: Some(TransactionConfirmationStatus::Confirmed),
    }
}

/// Engine configuration with a deterministic single-account tip pool
pub fn test_config() -> LanderConfig {
    let mut config = LanderConfig::default();
    config.tip.tip_accounts = vec![Pubkey::new_unique().to_string()];
    config
}

/// Send options with intervals suited to scripted ledgers
pub fn fast_options() -> SendOptions {
    SendOptions::default()
        .with_poll_interval(Duration::from_millis(10))
        .with_poll_timeout(Duration::from_secs(2))
}

/// Opt-in log output for test debugging, driven by `RUST_LOG`
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}
