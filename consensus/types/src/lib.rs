//! Types for committee assignment and crosslink processing on the beacon chain.

pub mod test_utils;

pub mod attestation_data;
pub mod attestation_duty;
pub mod beacon_committee;
pub mod beacon_state;
pub mod chain_spec;
pub mod crosslink;
pub mod pending_attestation;
pub mod seed;
pub mod shuffling_id;
pub mod validator;
#[macro_use]
pub mod slot_epoch_macros;
pub mod relative_epoch;
pub mod slot_epoch;

pub use crate::attestation_data::AttestationData;
pub use crate::attestation_duty::AttestationDuty;
pub use crate::beacon_committee::{BeaconCommittee, OwnedBeaconCommittee};
pub use crate::beacon_state::{
    compute_beacon_committee, compute_committee_index_in_epoch, compute_committee_range_in_epoch,
    get_active_validator_indices, BeaconState, CommitteeCache, Error as BeaconStateError,
};
pub use crate::chain_spec::{ChainSpec, ConfigError, Domain, PresetBase, YamlConfig};
pub use crate::crosslink::Crosslink;
pub use crate::pending_attestation::PendingAttestation;
pub use crate::relative_epoch::{Error as RelativeEpochError, RelativeEpoch};
pub use crate::seed::{derive_seed, seed_lookback_epoch};
pub use crate::shuffling_id::ShufflingId;
pub use crate::slot_epoch::{Epoch, Slot};
pub use crate::validator::Validator;

pub type CommitteeIndex = u64;
pub type Shard = u64;
pub type Hash256 = ethereum_types::H256;
