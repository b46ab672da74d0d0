use crate::{Epoch, Hash256, Shard};
use serde::{Deserialize, Serialize};

/// The most recent data root agreed upon by a supermajority of a shard's committees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Crosslink {
    #[serde(with = "serde_utils::quoted_u64")]
    pub shard: Shard,
    /// The epoch in which the data root was crosslinked.
    pub epoch: Epoch,
    pub data_root: Hash256,
}

impl Crosslink {
    /// The crosslink every shard starts with at genesis.
    pub fn genesis(shard: Shard, genesis_epoch: Epoch) -> Self {
        Self {
            shard,
            epoch: genesis_epoch,
            data_root: Hash256::zero(),
        }
    }
}
