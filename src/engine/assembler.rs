//! Smart-transaction assembly
//!
//! A linear state machine with no internal retries: validate, fetch a draft
//! lifetime, estimate the budget, sample the fee off a signed draft, refresh
//! the lifetime, and sign the final message. Transient failures propagate to
//! the caller.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    commitment_config::CommitmentConfig,
    compute_budget::{self, ComputeBudgetInstruction},
    hash::Hash,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signer::Signer,
    transaction::VersionedTransaction,
};
use tracing::{debug, info};

use super::TxLander;
use crate::errors::LanderError;
use crate::types::{SmartTransaction, SmartTransactionRequest};

/// Resolve the fee payer: explicit override matched against the supplied
/// signers, else the first signer.
pub(crate) fn resolve_fee_payer(
    signers: &[&dyn Signer],
    fee_payer: Option<Pubkey>,
) -> Result<Pubkey, LanderError> {
    let first = signers
        .first()
        .ok_or_else(|| LanderError::validation("at least one signer is required"))?;
    match fee_payer {
        None => Ok(first.pubkey()),
        Some(pubkey) => signers
            .iter()
            .find(|signer| signer.pubkey() == pubkey)
            .map(|signer| signer.pubkey())
            .ok_or_else(|| {
                LanderError::Validation(format!(
                    "fee payer {pubkey} does not match any supplied signer"
                ))
            }),
    }
}

/// The engine owns the compute-budget slots exclusively; caller-supplied
/// compute-budget instructions are rejected outright.
pub(crate) fn reject_compute_budget_instructions(
    instructions: &[Instruction],
) -> Result<(), LanderError> {
    if instructions
        .iter()
        .any(|ix| ix.program_id == compute_budget::id())
    {
        return Err(LanderError::validation(
            "instructions must not contain compute budget instructions; \
             the engine sets the compute unit price and limit itself",
        ));
    }
    Ok(())
}

/// Cap the oracle estimate when a cap is configured
pub(crate) fn cap_priority_fee(estimate: u64, cap: Option<u64>) -> u64 {
    match cap {
        None => estimate,
        Some(cap) => estimate.min(cap),
    }
}

/// Final instruction list: price, then limit, then the caller's
/// instructions in their original relative order
pub(crate) fn with_compute_budget(
    priority_fee: u64,
    units: u32,
    caller_instructions: &[Instruction],
) -> Vec<Instruction> {
    let mut instructions = Vec::with_capacity(caller_instructions.len() + 2);
    instructions.push(ComputeBudgetInstruction::set_compute_unit_price(priority_fee));
    instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(units));
    instructions.extend(caller_instructions.iter().cloned());
    instructions
}

pub(crate) fn compile_message(
    fee_payer: &Pubkey,
    instructions: &[Instruction],
    lookup_tables: &[AddressLookupTableAccount],
    recent_blockhash: Hash,
) -> Result<VersionedMessage, LanderError> {
    let message = v0::Message::try_compile(fee_payer, instructions, lookup_tables, recent_blockhash)
        .map_err(|e| LanderError::Serialization(format!("failed to compile message: {e}")))?;
    Ok(VersionedMessage::V0(message))
}

pub(crate) fn sign_message(
    message: VersionedMessage,
    signers: &[&dyn Signer],
) -> Result<VersionedTransaction, LanderError> {
    let signer_refs: Vec<&dyn Signer> = signers.to_vec();
    VersionedTransaction::try_new(message, &signer_refs)
        .map_err(|e| LanderError::Signing(e.to_string()))
}

pub(crate) fn encode_wire(transaction: &VersionedTransaction) -> Result<String, LanderError> {
    let bytes =
        bincode::serialize(transaction).map_err(|e| LanderError::Serialization(e.to_string()))?;
    Ok(BASE64_STANDARD.encode(bytes))
}

impl TxLander {
    /// Assemble, price, and sign a smart transaction.
    ///
    /// The returned artifact carries the negotiated compute-unit limit and
    /// priority fee, and a lifetime fetched immediately before the final
    /// signature. The draft lifetime used for sampling is never reused for
    /// the final transaction: the sampling round trips may consume a
    /// meaningful share of the draft's validity window.
    pub async fn create_smart_transaction(
        &self,
        request: &SmartTransactionRequest<'_>,
    ) -> Result<SmartTransaction, LanderError> {
        let fee_payer = resolve_fee_payer(request.signers, request.fee_payer)?;
        reject_compute_budget_instructions(&request.instructions)?;

        let commitment = CommitmentConfig::confirmed();
        let draft_lifetime = self.ledger.latest_blockhash(commitment).await?;
        debug!(blockhash = %draft_lifetime.blockhash, "Draft blockhash fetched");

        let units = self
            .estimate_compute_units(
                &request.instructions,
                &fee_payer,
                &request.lookup_tables,
                draft_lifetime.blockhash,
            )
            .await?;

        // Sign the draft so fee sampling sees a realistic-size transaction
        let draft_message = compile_message(
            &fee_payer,
            &request.instructions,
            &request.lookup_tables,
            draft_lifetime.blockhash,
        )?;
        let draft_transaction = sign_message(draft_message, request.signers)?;
        let draft_base64 = encode_wire(&draft_transaction)?;

        let estimate = match request.priority_level {
            None => {
                self.fee_oracle
                    .recommended_for_transaction(&draft_base64)
                    .await?
            }
            Some(level) => {
                self.fee_oracle
                    .level_for_transaction(&draft_base64, level)
                    .await?
            }
        };
        let priority_fee = cap_priority_fee(estimate, self.config.fee_oracle.priority_fee_cap);
        debug!(estimate, priority_fee, "Priority fee negotiated");

        let lifetime = self.ledger.latest_blockhash(commitment).await?;

        let final_instructions = with_compute_budget(priority_fee, units, &request.instructions);
        let message = compile_message(
            &fee_payer,
            &final_instructions,
            &request.lookup_tables,
            lifetime.blockhash,
        )?;
        let transaction = sign_message(message.clone(), request.signers)?;
        let wire_base64 = encode_wire(&transaction)?;

        info!(
            units,
            priority_fee,
            last_valid_block_height = lifetime.last_valid_block_height,
            "Smart transaction assembled"
        );
        Ok(SmartTransaction {
            transaction,
            wire_base64,
            units,
            priority_fee,
            lifetime,
            message,
        })
    }
}
