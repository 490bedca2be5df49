//! Smart-transaction assembly end to end: compute budget negotiation, fee
//! capping, lifetime handling, and final message shape

mod common;

use std::sync::Arc;

use solana_sdk::{
    compute_budget, pubkey::Pubkey, signature::Keypair, signer::Signer, system_instruction,
    system_program, transaction::TransactionError,
};

use common::*;
use lander::{LanderError, SmartTransactionRequest, TxLander};

fn fee_oracle_body(estimate: f64) -> String {
    format!("{{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{{\"priorityFeeEstimate\":{estimate}}}}}")
}

#[tokio::test]
async fn end_to_end_negotiation_and_final_shape() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let fee_mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(fee_oracle_body(10_000.0))
        .expect(1)
        .create_async()
        .await;

    let mut config = test_config();
    config.fee_oracle.url = server.url();
    config.fee_oracle.priority_fee_cap = Some(7_000);

    let ledger = Arc::new(MockLedger::new());
    let draft_lifetime = lifetime(1_000);
    let final_lifetime = lifetime(1_100);
    ledger.push_blockhash(draft_lifetime);
    ledger.push_blockhash(final_lifetime);
    ledger.push_simulation(sim_ok(42_000));

    let engine = TxLander::new(ledger.clone(), config).unwrap();
    let payer = Keypair::new();
    let recipient = Pubkey::new_unique();
    let transfer = system_instruction::transfer(&payer.pubkey(), &recipient, 1_000);
    let signers: Vec<&dyn Signer> = vec![&payer];
    let request = SmartTransactionRequest::new(vec![transfer], &signers);

    let smart = engine.create_smart_transaction(&request).await.unwrap();

    // units = max(1000, ceil(42_000 * 1.1)), fee capped at 7_000
    assert_eq!(smart.units, 46_200);
    assert_eq!(smart.priority_fee, 7_000);

    // The final transaction carries the second fetched lifetime, never the
    // draft one
    assert_eq!(smart.lifetime, final_lifetime);
    assert_eq!(*smart.message.recent_blockhash(), final_lifetime.blockhash);
    assert_ne!(*smart.message.recent_blockhash(), draft_lifetime.blockhash);

    // Exactly three instructions: price, limit, then the caller's transfer
    let keys = smart.message.static_account_keys();
    let instructions = smart.message.instructions();
    assert_eq!(instructions.len(), 3);
    assert_eq!(
        keys[usize::from(instructions[0].program_id_index)],
        compute_budget::id()
    );
    assert_eq!(
        keys[usize::from(instructions[1].program_id_index)],
        compute_budget::id()
    );
    assert_eq!(
        keys[usize::from(instructions[2].program_id_index)],
        system_program::id()
    );
    // Compute budget discriminants: 3 = unit price, 2 = unit limit
    assert_eq!(instructions[0].data.first(), Some(&3));
    assert_eq!(instructions[1].data.first(), Some(&2));

    // Signed and wire-encoded
    assert_eq!(smart.transaction.signatures.len(), 1);
    assert!(!smart.wire_base64.is_empty());

    // Exactly one oracle call per assembly
    fee_mock.assert_async().await;
}

#[tokio::test]
async fn uncapped_fee_uses_oracle_estimate() {
    let mut server = mockito::Server::new_async().await;
    let _fee_mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(fee_oracle_body(10_000.0))
        .create_async()
        .await;

    let mut config = test_config();
    config.fee_oracle.url = server.url();

    let ledger = Arc::new(MockLedger::new());
    ledger.push_blockhash(lifetime(1_000));
    ledger.push_blockhash(lifetime(1_100));
    ledger.push_simulation(sim_ok(5_000));

    let engine = TxLander::new(ledger, config).unwrap();
    let payer = Keypair::new();
    let transfer = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
    let signers: Vec<&dyn Signer> = vec![&payer];
    let request = SmartTransactionRequest::new(vec![transfer], &signers);

    let smart = engine.create_smart_transaction(&request).await.unwrap();
    assert_eq!(smart.priority_fee, 10_000);
    assert_eq!(smart.units, 5_500);
}

#[tokio::test]
async fn caller_compute_budget_instruction_fails_before_any_network_call() {
    let ledger = Arc::new(MockLedger::new());
    let engine = TxLander::new(ledger.clone(), test_config()).unwrap();

    let payer = Keypair::new();
    let instructions = vec![
        solana_sdk::compute_budget::ComputeBudgetInstruction::set_compute_unit_limit(200_000),
        system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1),
    ];
    let signers: Vec<&dyn Signer> = vec![&payer];
    let request = SmartTransactionRequest::new(instructions, &signers);

    let err = engine.create_smart_transaction(&request).await.unwrap_err();
    assert!(matches!(err, LanderError::Validation(_)));
    // The empty ledger script was never touched
    assert!(ledger.blockhashes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fee_payer_override_without_matching_signer_fails() {
    let ledger = Arc::new(MockLedger::new());
    let engine = TxLander::new(ledger, test_config()).unwrap();

    let payer = Keypair::new();
    let transfer = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
    let signers: Vec<&dyn Signer> = vec![&payer];
    let request =
        SmartTransactionRequest::new(vec![transfer], &signers).with_fee_payer(Pubkey::new_unique());

    let err = engine.create_smart_transaction(&request).await.unwrap_err();
    assert!(matches!(err, LanderError::Validation(_)));
}

#[tokio::test]
async fn simulation_error_is_fatal() {
    let ledger = Arc::new(MockLedger::new());
    ledger.push_blockhash(lifetime(1_000));
    ledger.push_simulation(sim_err(TransactionError::AccountNotFound));
    let engine = TxLander::new(ledger, test_config()).unwrap();

    let payer = Keypair::new();
    let transfer = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
    let signers: Vec<&dyn Signer> = vec![&payer];
    let request = SmartTransactionRequest::new(vec![transfer], &signers);

    let err = engine.create_smart_transaction(&request).await.unwrap_err();
    assert!(matches!(err, LanderError::Simulation { .. }));
}

#[tokio::test]
async fn missing_oracle_estimate_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _fee_mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#)
        .create_async()
        .await;

    let mut config = test_config();
    config.fee_oracle.url = server.url();

    let ledger = Arc::new(MockLedger::new());
    ledger.push_blockhash(lifetime(1_000));
    ledger.push_simulation(sim_ok(5_000));
    let engine = TxLander::new(ledger, config).unwrap();

    let payer = Keypair::new();
    let transfer = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
    let signers: Vec<&dyn Signer> = vec![&payer];
    let request = SmartTransactionRequest::new(vec![transfer], &signers);

    let err = engine.create_smart_transaction(&request).await.unwrap_err();
    assert!(matches!(err, LanderError::Oracle(_)));
}
