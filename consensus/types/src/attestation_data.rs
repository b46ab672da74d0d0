use crate::{CommitteeIndex, Hash256, Shard, Slot};
use serde::{Deserialize, Serialize};

/// The data upon which an attestation is based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttestationData {
    pub slot: Slot,
    #[serde(with = "serde_utils::quoted_u64")]
    pub index: CommitteeIndex,
    #[serde(with = "serde_utils::quoted_u64")]
    pub shard: Shard,
    pub crosslink_data_root: Hash256,
}
