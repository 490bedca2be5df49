//! Error taxonomy for the transaction landing engine
//!
//! Every terminal failure surfaces as a `LanderError` carrying enough context
//! (signature if known, the offending block heights, or the oracle's raw
//! error payload) for the caller to branch correctly. Nothing is swallowed
//! or logged-and-continued.

use solana_sdk::{signature::Signature, transaction::TransactionError};
use thiserror::Error;

/// Errors produced across the landing pipeline: validation, oracle lookups,
/// transport, assembly, and confirmation.
#[derive(Debug, Clone, Error)]
pub enum LanderError {
    /// Caller-supplied input rejected before any network call
    ///
    /// This includes:
    /// - No signers supplied
    /// - A fee-payer override with no matching signer
    /// - Caller instructions that already carry a compute-budget instruction
    #[error("validation error: {0}")]
    Validation(String),

    /// Engine configuration rejected by `LanderConfig::validate`
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The priority-fee oracle returned no usable estimate
    ///
    /// Fatal: assembly cannot proceed without a fee decision. Guessing a fee
    /// risks either overpaying or failing to land.
    #[error("priority fee oracle error: {0}")]
    Oracle(String),

    /// Transport/HTTP failure talking to the ledger, fee oracle, or relay
    #[error("network error during {context}: {message}")]
    Network {
        /// The operation that was in flight
        context: &'static str,
        /// Underlying transport error text
        message: String,
    },

    /// Simulation reported an on-chain error for the draft transaction
    ///
    /// Surfaced to the caller, never retried: the same instructions will
    /// fail the same way on the live ledger.
    #[error("simulation failed: {reason}")]
    Simulation {
        /// Error reported by the simulated execution
        reason: String,
        /// Program logs from the simulation, when available
        logs: Vec<String>,
    },

    /// The ledger reports the transaction executed and failed
    ///
    /// Terminal, never retried automatically. The caller decides whether to
    /// rebuild.
    #[error("transaction failed on-chain: {err}")]
    OnChain {
        /// Signature of the failed transaction, when known
        signature: Option<Signature>,
        /// The on-chain execution error
        err: TransactionError,
    },

    /// Block height advanced past `last_valid_block_height` before
    /// confirmation
    ///
    /// Distinct from `OnChain`: the transaction's fate is unknown, not
    /// failed. Callers are expected to rebuild with a fresh blockhash and
    /// resend, not assume failure.
    #[error(
        "transaction {signature} expired: block height {block_height} exceeds last valid {last_valid_block_height}"
    )]
    Expired {
        /// Signature of the expired submission
        signature: Signature,
        /// The height bound the transaction carried
        last_valid_block_height: u64,
        /// The observed ledger height that exceeded it
        block_height: u64,
    },

    /// Wall-clock budget exhausted while polling for confirmation
    ///
    /// Distinct from `Expired`: the ledger-height bound may not yet have
    /// been reached; this purely reflects the caller's patience budget.
    #[error("confirmation timed out after {elapsed_ms}ms")]
    Timeout {
        /// Milliseconds elapsed when the budget ran out
        elapsed_ms: u64,
        /// Last submitted signature, when one was accepted
        signature: Option<Signature>,
    },

    /// Signing the draft or final transaction failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// Message compilation or wire encoding failed
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl LanderError {
    /// Check whether retrying (after rebuilding where applicable) might
    /// succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            // Rebuild with a fresh blockhash and resend
            Self::Expired { .. } => true,
            Self::Timeout { .. } => true,

            Self::Validation(_) => false,
            Self::Configuration(_) => false,
            Self::Oracle(_) => false,
            Self::Simulation { .. } => false,
            Self::OnChain { .. } => false,
            Self::Signing(_) => false,
            Self::Serialization(_) => false,
        }
    }

    /// Error category for metrics and log fields
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Configuration(_) => "config",
            Self::Oracle(_) => "oracle",
            Self::Network { .. } => "network",
            Self::Simulation { .. } => "simulation",
            Self::OnChain { .. } => "onchain",
            Self::Expired { .. } => "expired",
            Self::Timeout { .. } => "timeout",
            Self::Signing(_) => "signing",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Whether a submission failure reports the transaction's blockhash
    /// lifetime as elapsed
    ///
    /// The ledger client surfaces this as a generic error string rather than
    /// a typed condition, so classification is textual.
    pub fn is_blockhash_expired(&self) -> bool {
        match self {
            Self::Network { message, .. } => {
                let msg = message.to_ascii_lowercase();
                msg.contains("blockhash not found")
                    || msg.contains("blockhash expired")
                    || msg.contains("block height exceeded")
            }
            Self::Expired { .. } => true,
            _ => false,
        }
    }
}

// Convenience constructors for common error scenarios
impl LanderError {
    /// Create a network error for the given operation
    pub fn network(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Network {
            context,
            message: err.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Create an oracle error
    pub fn oracle(reason: impl Into<String>) -> Self {
        Self::Oracle(reason.into())
    }
}
