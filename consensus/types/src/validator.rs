use crate::Epoch;
use serde::{Deserialize, Serialize};

/// Information about a `BeaconChain` validator.
///
/// Only the fields that affect committee assignment and crosslink tallies are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    #[serde(with = "serde_utils::quoted_u64")]
    pub effective_balance: u64,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
    pub slashed: bool,
}

impl Validator {
    /// Returns `true` if the validator is considered active at some epoch.
    pub fn is_active_at(&self, epoch: Epoch) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }
}
