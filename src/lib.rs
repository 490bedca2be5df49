//! Transaction landing engine for Solana
//!
//! This library takes a set of ledger instructions and gets them reliably
//! included on-chain despite variable congestion, fee markets, and limited
//! transaction lifetime windows:
//!
//! - **Compute budget negotiation**: simulates a draft transaction to
//!   predict compute-unit consumption, applies a floor and safety buffer.
//! - **Priority fee negotiation**: samples a recommended
//!   micro-lamports-per-CU price off the signed draft, with an optional cap.
//! - **Assembly**: builds and signs the final wire transaction with the two
//!   compute-budget instructions prepended and a fresh blockhash lifetime.
//! - **Delivery**: plain RPC, or a staked region-aware relay with an
//!   economic tip drawn against a recently-landed tip floor.
//! - **Confirmation**: a polling state machine bounded by wall clock and
//!   block height, with distinct terminal outcomes for confirmed, failed
//!   on-chain, expired, and timed out.

pub mod config;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod oracle;
pub mod sender;
pub mod types;

pub use config::{LanderConfig, MAX_COMPUTE_UNIT_LIMIT};
pub use engine::TxLander;
pub use errors::LanderError;
pub use ledger::{LedgerRpc, SignatureStatusSummary, SimulationSummary, SolanaLedger};
pub use oracle::{PriorityFeeClient, PriorityFeeLevels, PriorityLevel, TipFloorClient};
pub use types::{
    BlockhashLifetime, ConfirmationOutcome, Region, RelayOptions, SendOptions,
    SendableTransaction, SmartTransaction, SmartTransactionRequest,
};
