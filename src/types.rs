//! Core data model for the landing engine
//!
//! All entities here are created per call and discarded after the call
//! returns; the engine holds no persistent state between invocations.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    commitment_config::CommitmentConfig,
    hash::Hash,
    instruction::Instruction,
    message::VersionedMessage,
    pubkey::Pubkey,
    signature::Signature,
    signer::Signer,
    transaction::{Transaction, TransactionError, VersionedTransaction},
};

use crate::errors::LanderError;
use crate::oracle::priority_fee::PriorityLevel;

/// A recent blockhash plus the last block height at which a transaction
/// referencing it remains valid.
///
/// A lifetime is implicitly dead once the ledger's block height exceeds
/// `last_valid_block_height`; this is checked during confirmation, never
/// enforced by a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockhashLifetime {
    /// The recent blockhash
    pub blockhash: Hash,
    /// Last block height at which this blockhash is accepted
    pub last_valid_block_height: u64,
}

/// The caller-facing artifact of smart-transaction assembly.
///
/// Invariants: `units` is at least the configured floor, and `priority_fee`
/// does not exceed the configured cap when one is set. The lifetime is the
/// one fetched immediately before final signing, not the draft lifetime.
#[derive(Debug, Clone)]
pub struct SmartTransaction {
    /// Fully signed final transaction
    pub transaction: VersionedTransaction,
    /// Base64 wire encoding of `transaction`
    pub wire_base64: String,
    /// Negotiated compute-unit limit
    pub units: u32,
    /// Negotiated priority fee in micro-lamports per compute unit
    pub priority_fee: u64,
    /// Blockhash lifetime the final transaction carries
    pub lifetime: BlockhashLifetime,
    /// The final compiled message
    pub message: VersionedMessage,
}

/// Input to smart-transaction assembly.
///
/// The first signer is the default fee payer unless `fee_payer` overrides it
/// (the override must match one of the supplied signers).
pub struct SmartTransactionRequest<'a> {
    /// Caller instructions, in execution order. Must not contain
    /// compute-budget instructions; the engine owns that slot exclusively.
    pub instructions: Vec<Instruction>,
    /// All signers for the transaction
    pub signers: &'a [&'a dyn Signer],
    /// Optional fee-payer override, matched against `signers`
    pub fee_payer: Option<Pubkey>,
    /// Address lookup tables referenced by the instructions
    pub lookup_tables: Vec<AddressLookupTableAccount>,
    /// Explicit fee level; `None` asks the oracle for its recommendation
    pub priority_level: Option<PriorityLevel>,
}

impl<'a> SmartTransactionRequest<'a> {
    /// Create a request with defaults: first signer pays, no lookup tables,
    /// recommended fee mode.
    pub fn new(instructions: Vec<Instruction>, signers: &'a [&'a dyn Signer]) -> Self {
        Self {
            instructions,
            signers,
            fee_payer: None,
            lookup_tables: Vec::new(),
            priority_level: None,
        }
    }

    /// Override the fee payer by pubkey
    pub fn with_fee_payer(mut self, fee_payer: Pubkey) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Attach address lookup tables
    pub fn with_lookup_tables(mut self, tables: Vec<AddressLookupTableAccount>) -> Self {
        self.lookup_tables = tables;
        self
    }

    /// Request an explicit fee level instead of the oracle recommendation
    pub fn with_priority_level(mut self, level: PriorityLevel) -> Self {
        self.priority_level = Some(level);
        self
    }
}

/// Accepted transaction shapes for submission, normalized once at the
/// boundary to wire bytes.
#[derive(Debug, Clone)]
pub enum SendableTransaction {
    /// Already base64-encoded wire transaction
    Base64(String),
    /// Raw serialized wire bytes
    Bytes(Vec<u8>),
    /// A signed versioned transaction
    Versioned(VersionedTransaction),
    /// A signed legacy transaction
    Legacy(Transaction),
}

impl SendableTransaction {
    /// Normalize to the base64 wire form submitted over RPC
    pub fn wire_base64(&self) -> Result<String, LanderError> {
        match self {
            Self::Base64(encoded) => Ok(encoded.clone()),
            Self::Bytes(bytes) => Ok(BASE64_STANDARD.encode(bytes)),
            Self::Versioned(tx) => {
                let bytes = bincode::serialize(tx)
                    .map_err(|e| LanderError::Serialization(e.to_string()))?;
                Ok(BASE64_STANDARD.encode(bytes))
            }
            Self::Legacy(tx) => {
                let bytes = bincode::serialize(tx)
                    .map_err(|e| LanderError::Serialization(e.to_string()))?;
                Ok(BASE64_STANDARD.encode(bytes))
            }
        }
    }
}

impl From<VersionedTransaction> for SendableTransaction {
    fn from(tx: VersionedTransaction) -> Self {
        Self::Versioned(tx)
    }
}

impl From<Transaction> for SendableTransaction {
    fn from(tx: Transaction) -> Self {
        Self::Legacy(tx)
    }
}

impl From<Vec<u8>> for SendableTransaction {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<String> for SendableTransaction {
    fn from(encoded: String) -> Self {
        Self::Base64(encoded)
    }
}

/// Delivery and confirmation tuning for one send
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Commitment used for preflight and accepted for confirmation
    pub commitment: CommitmentConfig,
    /// Skip the RPC node's preflight simulation
    pub skip_preflight: bool,
    /// Ledger-level resubmit count performed by the RPC node
    pub max_retries: Option<usize>,
    /// Wall-clock budget for submission plus confirmation
    pub poll_timeout: Duration,
    /// Sleep between confirmation status checks
    pub poll_interval: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            commitment: CommitmentConfig::confirmed(),
            skip_preflight: false,
            max_retries: None,
            poll_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl SendOptions {
    /// Set the commitment level
    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    /// Toggle preflight skipping
    pub fn with_skip_preflight(mut self, skip: bool) -> Self {
        self.skip_preflight = skip;
        self
    }

    /// Set the RPC node's resubmit count
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the wall-clock confirmation budget
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Set the interval between status checks
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Relay delivery region
///
/// Regions are explicit: relay delivery fails fast when no region is
/// supplied rather than guessing a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Salt Lake City
    #[serde(rename = "slc")]
    SaltLakeCity,
    /// Newark
    #[serde(rename = "ewr")]
    Newark,
    /// London
    #[serde(rename = "lon")]
    London,
    /// Frankfurt
    #[serde(rename = "fra")]
    Frankfurt,
    /// Amsterdam
    #[serde(rename = "ams")]
    Amsterdam,
    /// Singapore
    #[serde(rename = "sg")]
    Singapore,
    /// Tokyo
    #[serde(rename = "tyo")]
    Tokyo,
}

impl Region {
    /// All supported regions
    pub const ALL: [Region; 7] = [
        Region::SaltLakeCity,
        Region::Newark,
        Region::London,
        Region::Frankfurt,
        Region::Amsterdam,
        Region::Singapore,
        Region::Tokyo,
    ];

    /// Short region code used in endpoint hostnames
    pub fn code(&self) -> &'static str {
        match self {
            Region::SaltLakeCity => "slc",
            Region::Newark => "ewr",
            Region::London => "lon",
            Region::Frankfurt => "fra",
            Region::Amsterdam => "ams",
            Region::Singapore => "sg",
            Region::Tokyo => "tyo",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.code() == s)
            .ok_or_else(|| format!("unknown relay region: {s}"))
    }
}

/// Relay delivery tuning for one send
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Target relay region (required)
    pub region: Region,
    /// Route exclusively through staked-weighted QoS infrastructure instead
    /// of dual (staked + public) broadcast
    pub swqos_only: bool,
    /// Explicit tip in lamports; still floored at the routing-mode minimum
    pub tip_lamports: Option<u64>,
}

impl RelayOptions {
    /// Relay options for a region with dual-route defaults
    pub fn new(region: Region) -> Self {
        Self {
            region,
            swqos_only: false,
            tip_lamports: None,
        }
    }

    /// Route through SWQoS only
    pub fn with_swqos_only(mut self, swqos_only: bool) -> Self {
        self.swqos_only = swqos_only;
        self
    }

    /// Override the tip amount in lamports
    pub fn with_tip_lamports(mut self, lamports: u64) -> Self {
        self.tip_lamports = Some(lamports);
        self
    }
}

/// Terminal result of confirmation polling
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationOutcome {
    /// The signature reached the accepted confirmation level
    Confirmed(Signature),
    /// The ledger reports the transaction executed and failed
    FailedOnChain(TransactionError),
    /// Block height overtook the lifetime bound without confirmation; the
    /// transaction's fate is unknown
    Expired {
        /// The height bound that was exceeded
        last_valid_block_height: u64,
        /// The observed height that exceeded it
        block_height: u64,
    },
    /// The wall-clock budget elapsed while still polling
    TimedOut {
        /// Milliseconds spent polling
        elapsed_ms: u64,
    },
}
