//! External pricing oracles
//!
//! Two HTTP collaborators feed the engine's fee decisions: a JSON-RPC
//! priority-fee estimation service and a public tip-floor statistics
//! endpoint. Their failure semantics differ deliberately: a missing
//! priority-fee estimate is fatal for assembly, a missing tip floor falls
//! back to the routing-mode minimum.

pub mod priority_fee;
pub mod tip_floor;

pub use priority_fee::{
    FeeEstimateOptions, FeeEstimateRequest, PriorityFeeClient, PriorityFeeEstimate,
    PriorityFeeLevels, PriorityLevel,
};
pub use tip_floor::TipFloorClient;
