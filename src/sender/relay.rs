//! Relay delivery channel
//!
//! Delivers through a staked, region-aware broadcast endpoint in exchange
//! for an economic tip. The relay mandates skip-preflight and zero
//! node-level retries; fan-out is the relay's responsibility. Confirmation
//! is bounded by the final transaction's own lifetime.

use std::str::FromStr;

use rand::seq::SliceRandom;
use solana_sdk::{pubkey::Pubkey, signature::Signature, system_instruction};
use tracing::{debug, info};

use super::confirm::{outcome_into_signature, poll_transaction_confirmation};
use crate::engine::assembler::resolve_fee_payer;
use crate::engine::TxLander;
use crate::errors::LanderError;
use crate::types::{RelayOptions, SendOptions, SmartTransactionRequest};

/// Convert a SOL amount to lamports, rounding to the nearest unit
pub(crate) fn sol_to_lamports(sol: f64) -> u64 {
    (sol * 1e9).round() as u64
}

/// Tip in lamports from an observed floor and a routing-mode minimum, both
/// in SOL: the chosen value is the floor when one is available and above
/// the minimum, the minimum otherwise.
pub(crate) fn tip_from_floor(floor_sol: Option<f64>, min_sol: f64) -> u64 {
    sol_to_lamports(floor_sol.unwrap_or(min_sol).max(min_sol))
}

/// Accept either a bare JSON string signature or a JSON-RPC
/// `{result}`/`{error}` object; an `{error}` is fatal immediately
pub(crate) fn parse_relay_response(body: &str) -> Result<Signature, LanderError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| LanderError::Network {
        context: "relay sendTransaction",
        message: format!("malformed relay response: {e}"),
    })?;
    let signature = match &value {
        serde_json::Value::String(signature) => signature.clone(),
        serde_json::Value::Object(map) => {
            if let Some(err) = map.get("error") {
                return Err(LanderError::Network {
                    context: "relay sendTransaction",
                    message: format!("relay error: {err}"),
                });
            }
            match map.get("result") {
                Some(serde_json::Value::String(signature)) => signature.clone(),
                _ => {
                    return Err(LanderError::Network {
                        context: "relay sendTransaction",
                        message: "relay response carried no result".to_string(),
                    })
                }
            }
        }
        _ => {
            return Err(LanderError::Network {
                context: "relay sendTransaction",
                message: format!("unexpected relay response shape: {value}"),
            })
        }
    };
    Signature::from_str(&signature).map_err(|e| {
        LanderError::Serialization(format!("relay returned malformed signature: {e}"))
    })
}

impl TxLander {
    fn mode_min_sol(&self, swqos_only: bool) -> f64 {
        if swqos_only {
            self.config.tip.swqos_min_sol
        } else {
            self.config.tip.dual_min_sol
        }
    }

    /// Tip for one relay delivery.
    ///
    /// An explicit caller tip still passes through the routing-mode floor;
    /// otherwise the tip-floor oracle is consulted and its absence falls
    /// back to the mode minimum.
    pub async fn calculate_tip(&self, relay_options: &RelayOptions) -> u64 {
        let min_sol = self.mode_min_sol(relay_options.swqos_only);
        match relay_options.tip_lamports {
            Some(explicit) => explicit.max(sol_to_lamports(min_sol)),
            None => {
                let floor = self.tip_floor.landed_tip_floor().await;
                tip_from_floor(floor, min_sol)
            }
        }
    }

    /// Tip destination drawn uniformly at random from the configured pool.
    ///
    /// Many concurrent callers may tip in the same period; random selection
    /// spreads write locks across the pool instead of hot-spotting one
    /// account. It does not prevent two callers from choosing the same
    /// account, it only reduces the probability.
    fn random_tip_account(&self) -> Result<Pubkey, LanderError> {
        let pool = self.config.tip_account_pool()?;
        pool.choose(&mut rand::thread_rng())
            .copied()
            .ok_or_else(|| LanderError::Configuration("tip account pool is empty".to_string()))
    }

    async fn submit_to_relay(
        &self,
        url: &str,
        wire_base64: &str,
    ) -> Result<Signature, LanderError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "sendTransaction",
            "params": [wire_base64, { "encoding": "base64", "skipPreflight": true, "maxRetries": 0 }],
        });
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LanderError::network("relay sendTransaction", e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LanderError::network("relay sendTransaction", e))?;
        if !status.is_success() {
            return Err(LanderError::Network {
                context: "relay sendTransaction",
                message: format!("relay returned HTTP {status}: {text}"),
            });
        }
        parse_relay_response(&text)
    }

    /// Assemble a tipped smart transaction, deliver it through the region's
    /// relay endpoint, and confirm bounded by the transaction's own
    /// lifetime.
    pub async fn send_transaction_with_sender(
        &self,
        request: &SmartTransactionRequest<'_>,
        relay_options: &RelayOptions,
        options: &SendOptions,
    ) -> Result<Signature, LanderError> {
        let endpoint = self.config.relay_endpoint(relay_options.region)?.to_string();
        let tip_lamports = self.calculate_tip(relay_options).await;
        let tip_account = self.random_tip_account()?;
        let fee_payer = resolve_fee_payer(request.signers, request.fee_payer)?;
        debug!(tip_lamports, tip_account = %tip_account, "Tip computed");

        // The tip is economic payment, not a budget instruction: appended
        // after the caller's instructions so the two reserved
        // compute-budget slots stay untouched
        let mut instructions = request.instructions.clone();
        instructions.push(system_instruction::transfer(
            &fee_payer,
            &tip_account,
            tip_lamports,
        ));
        let tipped = SmartTransactionRequest {
            instructions,
            signers: request.signers,
            fee_payer: request.fee_payer,
            lookup_tables: request.lookup_tables.clone(),
            priority_level: request.priority_level,
        };
        let smart = self.create_smart_transaction(&tipped).await?;

        let url = if relay_options.swqos_only {
            format!("{endpoint}?swqos_only=true")
        } else {
            endpoint
        };
        info!(
            region = %relay_options.region,
            tip_lamports,
            swqos_only = relay_options.swqos_only,
            "Submitting through relay"
        );
        let signature = self.submit_to_relay(&url, &smart.wire_base64).await?;

        let outcome = poll_transaction_confirmation(
            self.ledger.as_ref(),
            signature,
            Some(smart.lifetime.last_valid_block_height),
            options.poll_timeout,
            options,
        )
        .await?;
        outcome_into_signature(outcome, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tip_floor_above_minimum_wins() {
        // Dual-route: floor 0.002 SOL beats the 0.001 minimum
        assert_eq!(tip_from_floor(Some(0.002), 0.001), 2_000_000);
    }

    #[test]
    fn test_tip_floor_below_minimum_is_floored() {
        // SWQoS: floor 0.0001 SOL is held up to the 0.0005 minimum
        assert_eq!(tip_from_floor(Some(0.0001), 0.0005), 500_000);
    }

    #[test]
    fn test_tip_oracle_absent_uses_minimum() {
        assert_eq!(tip_from_floor(None, 0.001), 1_000_000);
    }

    #[test]
    fn test_tip_conversion_rounds_to_nearest_lamport() {
        assert_eq!(sol_to_lamports(0.0000000014), 1);
        assert_eq!(sol_to_lamports(0.0000000016), 2);
    }

    #[test]
    fn test_tip_is_deterministic_for_identical_inputs() {
        for _ in 0..3 {
            assert_eq!(tip_from_floor(Some(0.002), 0.001), 2_000_000);
        }
    }

    #[test]
    fn test_relay_response_bare_string() {
        let signature = Signature::default();
        let body = format!("\"{signature}\"");
        assert_eq!(parse_relay_response(&body).unwrap(), signature);
    }

    #[test]
    fn test_relay_response_jsonrpc_result() {
        let signature = Signature::default();
        let body = format!("{{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":\"{signature}\"}}");
        assert_eq!(parse_relay_response(&body).unwrap(), signature);
    }

    #[test]
    fn test_relay_response_error_is_fatal() {
        let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"sanitize failure"}}"#;
        let err = parse_relay_response(body).unwrap_err();
        assert!(matches!(err, LanderError::Network { .. }));
        assert!(err.to_string().contains("sanitize failure"));
    }

    #[test]
    fn test_relay_response_garbage_rejected() {
        assert!(parse_relay_response("not json").is_err());
        assert!(parse_relay_response("42").is_err());
        assert!(parse_relay_response("{}").is_err());
        assert!(parse_relay_response("{\"result\": 17}").is_err());
    }
}
