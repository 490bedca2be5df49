//! Compute budget estimation
//!
//! Simulates a draft transaction under the ledger's compute-unit ceiling to
//! predict consumption, then applies the configured floor and safety buffer.

use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    compute_budget::ComputeBudgetInstruction,
    hash::Hash,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use tracing::debug;

use super::TxLander;
use crate::config::MAX_COMPUTE_UNIT_LIMIT;
use crate::errors::LanderError;

/// Apply the safety buffer and floor to simulated consumption.
///
/// The buffer is applied in parts-per-million integer math: with a 10%
/// buffer, 5000 consumed units must come out as 5500, not the 5501 a float
/// product would round up to.
pub fn buffered_units(consumed: u64, min_units: u32, buffer_pct: f64) -> u32 {
    let buffer_ppm = (buffer_pct * 1_000_000.0).round() as u64;
    let buffered = consumed
        .saturating_mul(1_000_000 + buffer_ppm)
        .div_ceil(1_000_000);
    buffered.max(u64::from(min_units)).min(u64::from(u32::MAX)) as u32
}

impl TxLander {
    /// Predict the compute-unit budget for a draft instruction set.
    ///
    /// The probe transaction carries a ceiling compute-unit-limit
    /// instruction so the simulation is not truncated by the node's default
    /// budget, and is simulated without signatures. A simulation-reported
    /// on-chain error is fatal and surfaced to the caller unretried.
    pub async fn estimate_compute_units(
        &self,
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        lookup_tables: &[AddressLookupTableAccount],
        recent_blockhash: Hash,
    ) -> Result<u32, LanderError> {
        let mut probe = Vec::with_capacity(instructions.len() + 1);
        probe.push(ComputeBudgetInstruction::set_compute_unit_limit(
            MAX_COMPUTE_UNIT_LIMIT,
        ));
        probe.extend(instructions.iter().cloned());

        let message = v0::Message::try_compile(fee_payer, &probe, lookup_tables, recent_blockhash)
            .map_err(|e| {
                LanderError::Serialization(format!("failed to compile simulation message: {e}"))
            })?;
        let signature_slots = usize::from(message.header.num_required_signatures);
        let transaction = VersionedTransaction {
            signatures: vec![Signature::default(); signature_slots],
            message: VersionedMessage::V0(message),
        };

        let summary = self.ledger.simulate_transaction(&transaction).await?;
        if let Some(err) = summary.err {
            return Err(LanderError::Simulation {
                reason: err.to_string(),
                logs: summary.logs,
            });
        }
        let consumed = summary.units_consumed.ok_or_else(|| LanderError::Simulation {
            reason: "simulation reported no consumed units".to_string(),
            logs: summary.logs,
        })?;

        let units = buffered_units(
            consumed,
            self.config.budget.min_units,
            self.config.budget.buffer_pct,
        );
        debug!(consumed, units, "Compute unit estimate");
        Ok(units)
    }
}
