//! Delivery channels and confirmation
//!
//! Two ways out: the ledger's own RPC endpoint, or a region-aware relay
//! that mandates skip-preflight and zero node-level retries in exchange for
//! an economic tip. Both confirm through the same polling state machine.

pub mod confirm;
pub mod relay;
pub mod standard;

use solana_rpc_client_api::config::RpcSendTransactionConfig;
use solana_transaction_status::UiTransactionEncoding;

use crate::types::SendOptions;

/// Send configuration for a ledger RPC submission
pub(crate) fn send_config(options: &SendOptions) -> RpcSendTransactionConfig {
    RpcSendTransactionConfig {
        skip_preflight: options.skip_preflight,
        preflight_commitment: Some(options.commitment.commitment),
        encoding: Some(UiTransactionEncoding::Base64),
        max_retries: options.max_retries,
        ..RpcSendTransactionConfig::default()
    }
}
