use crate::AttestationData;
use serde::{Deserialize, Serialize};

/// An attestation that has been included in the state but not yet fully processed.
///
/// `aggregation_bits[i]` is set when the `i`th member of the committee at
/// `(data.slot, data.index)` attested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttestation {
    pub aggregation_bits: Vec<bool>,
    pub data: AttestationData,
    /// Slots between `data.slot` and the slot of the including block.
    #[serde(with = "serde_utils::quoted_u64")]
    pub inclusion_delay: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub proposer_index: u64,
}
