//! Confirmation polling state machine
//!
//! States: polling, confirmed, failed on-chain, expired, timed out; all but
//! the first are terminal. The block-height bound is checked before a stale
//! "still polling" answer, so a transaction that can provably never land is
//! reported expired without waiting out the full wall-clock budget.

use std::time::{Duration, Instant};

use solana_sdk::{commitment_config::CommitmentLevel, signature::Signature};
use solana_transaction_status::TransactionConfirmationStatus;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::engine::TxLander;
use crate::errors::LanderError;
use crate::ledger::LedgerRpc;
use crate::types::{ConfirmationOutcome, SendOptions};

/// Whether a reported confirmation status satisfies the target commitment.
///
/// `confirmed` accepts `{confirmed, finalized}`; `finalized` accepts only
/// itself; `processed` accepts any reported status.
pub(crate) fn satisfies_commitment(
    target: CommitmentLevel,
    status: &TransactionConfirmationStatus,
) -> bool {
    match target {
        CommitmentLevel::Finalized => {
            matches!(status, TransactionConfirmationStatus::Finalized)
        }
        CommitmentLevel::Confirmed => matches!(
            status,
            TransactionConfirmationStatus::Confirmed | TransactionConfirmationStatus::Finalized
        ),
        _ => true,
    }
}

/// Map a terminal outcome to the channel-level result: confirmed yields the
/// signature, everything else is a typed error carrying the context the
/// caller needs to branch
pub(crate) fn outcome_into_signature(
    outcome: ConfirmationOutcome,
    signature: Signature,
) -> Result<Signature, LanderError> {
    match outcome {
        ConfirmationOutcome::Confirmed(signature) => Ok(signature),
        ConfirmationOutcome::FailedOnChain(err) => Err(LanderError::OnChain {
            signature: Some(signature),
            err,
        }),
        ConfirmationOutcome::Expired {
            last_valid_block_height,
            block_height,
        } => Err(LanderError::Expired {
            signature,
            last_valid_block_height,
            block_height,
        }),
        ConfirmationOutcome::TimedOut { elapsed_ms } => Err(LanderError::Timeout {
            elapsed_ms,
            signature: Some(signature),
        }),
    }
}

/// Poll signature status (and, when a bound is supplied, block height)
/// until a terminal state is reached.
pub(crate) async fn poll_transaction_confirmation(
    ledger: &dyn LedgerRpc,
    signature: Signature,
    last_valid_block_height: Option<u64>,
    timeout: Duration,
    options: &SendOptions,
) -> Result<ConfirmationOutcome, LanderError> {
    let started = Instant::now();
    let target = options.commitment.commitment;
    loop {
        let elapsed = started.elapsed();
        if elapsed > timeout {
            warn!(%signature, elapsed_ms = elapsed.as_millis() as u64, "Confirmation polling timed out");
            return Ok(ConfirmationOutcome::TimedOut {
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }

        if let Some(bound) = last_valid_block_height {
            let block_height = ledger.block_height(options.commitment).await?;
            if block_height > bound {
                // One last status check: the transaction may have landed in
                // the final slots of its window
                if let Some(status) = ledger.signature_status(&signature).await? {
                    if status.err.is_none() {
                        if let Some(ref confirmation) = status.confirmation_status {
                            if satisfies_commitment(target, confirmation) {
                                return Ok(ConfirmationOutcome::Confirmed(signature));
                            }
                        }
                    }
                }
                warn!(
                    %signature,
                    last_valid_block_height = bound,
                    block_height,
                    "Blockhash lifetime elapsed before confirmation"
                );
                return Ok(ConfirmationOutcome::Expired {
                    last_valid_block_height: bound,
                    block_height,
                });
            }
        }

        if let Some(status) = ledger.signature_status(&signature).await? {
            if let Some(err) = status.err {
                return Ok(ConfirmationOutcome::FailedOnChain(err));
            }
            if let Some(ref confirmation) = status.confirmation_status {
                if satisfies_commitment(target, confirmation) {
                    debug!(%signature, status = ?confirmation, "Transaction confirmed");
                    return Ok(ConfirmationOutcome::Confirmed(signature));
                }
            }
        }

        sleep(options.poll_interval).await;
    }
}

impl TxLander {
    /// Poll until the signature confirms, fails on-chain, expires past the
    /// supplied height bound, or the wall-clock budget in `options`
    /// elapses.
    pub async fn poll_confirmation(
        &self,
        signature: &Signature,
        last_valid_block_height: Option<u64>,
        options: &SendOptions,
    ) -> Result<ConfirmationOutcome, LanderError> {
        poll_transaction_confirmation(
            self.ledger.as_ref(),
            *signature,
            last_valid_block_height,
            options.poll_timeout,
            options,
        )
        .await
    }
}
