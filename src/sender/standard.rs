//! Standard delivery channel: the ledger's own RPC endpoint
//!
//! Three entry points at increasing levels of service: a single raw submit,
//! a self-contained broadcast with its own height bound, and the full
//! assemble-submit-confirm loop.

use std::time::Instant;

use solana_sdk::signature::Signature;
use tracing::{debug, info, warn};

use super::confirm::{outcome_into_signature, poll_transaction_confirmation};
use super::send_config;
use crate::engine::TxLander;
use crate::errors::LanderError;
use crate::types::{SendOptions, SendableTransaction, SmartTransactionRequest};

impl TxLander {
    /// Submit once via ledger RPC with the caller's preflight options and
    /// return the raw send result. No confirmation polling.
    pub async fn send_transaction(
        &self,
        transaction: &SendableTransaction,
        options: &SendOptions,
    ) -> Result<Signature, LanderError> {
        let wire = transaction.wire_base64()?;
        let signature = self
            .ledger
            .send_wire_transaction(&wire, send_config(options))
            .await?;
        debug!(%signature, "Transaction submitted");
        Ok(signature)
    }

    /// Assemble a smart transaction, submit it, and confirm.
    ///
    /// If submission specifically fails because the blockhash lifetime is
    /// reported as elapsed, the same already-signed transaction is
    /// resubmitted until the wall-clock budget runs out; any other
    /// submission error is fatal immediately. Budget exhaustion is reported
    /// as a timeout, never swallowed.
    pub async fn send_smart_transaction(
        &self,
        request: &SmartTransactionRequest<'_>,
        options: &SendOptions,
    ) -> Result<Signature, LanderError> {
        let smart = self.create_smart_transaction(request).await?;
        let started = Instant::now();
        loop {
            let elapsed = started.elapsed();
            if elapsed >= options.poll_timeout {
                return Err(LanderError::Timeout {
                    elapsed_ms: elapsed.as_millis() as u64,
                    signature: None,
                });
            }
            match self
                .ledger
                .send_wire_transaction(&smart.wire_base64, send_config(options))
                .await
            {
                Ok(signature) => {
                    let remaining = options.poll_timeout.saturating_sub(started.elapsed());
                    let outcome = poll_transaction_confirmation(
                        self.ledger.as_ref(),
                        signature,
                        None,
                        remaining,
                        options,
                    )
                    .await?;
                    return outcome_into_signature(outcome, signature);
                }
                Err(err) if err.is_blockhash_expired() => {
                    warn!(error = %err, "Submission reported lifetime expiry, resubmitting");
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Submit and confirm with a self-computed expiry.
    ///
    /// The expiry is `min(last_valid_block_height, current_height +
    /// configured offset)`; block height and signature status are polled
    /// together until confirmed, failed on-chain, height-expired, or
    /// wall-clock-timed-out.
    pub async fn broadcast_transaction(
        &self,
        transaction: &SendableTransaction,
        last_valid_block_height: Option<u64>,
        options: &SendOptions,
    ) -> Result<Signature, LanderError> {
        let wire = transaction.wire_base64()?;
        let current_height = self.ledger.block_height(options.commitment).await?;
        let offset_bound = current_height + self.config.confirm.block_height_offset;
        let expiry = match last_valid_block_height {
            Some(bound) => bound.min(offset_bound),
            None => offset_bound,
        };

        let signature = self
            .ledger
            .send_wire_transaction(&wire, send_config(options))
            .await?;
        info!(%signature, expiry, "Transaction broadcast");

        let outcome = poll_transaction_confirmation(
            self.ledger.as_ref(),
            signature,
            Some(expiry),
            options.poll_timeout,
            options,
        )
        .await?;
        outcome_into_signature(outcome, signature)
    }
}
