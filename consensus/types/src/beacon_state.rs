use crate::*;
use safe_arith::{ArithError, SafeArith};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use self::committee_cache::{
    compute_beacon_committee, compute_committee_index_in_epoch, compute_committee_range_in_epoch,
    get_active_validator_indices, CommitteeCache,
};

mod committee_cache;

pub const CACHED_EPOCHS: usize = 3;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    EpochOutOfBounds,
    EpochPrecedesGenesis {
        epoch: Epoch,
        genesis_epoch: Epoch,
    },
    /// The active set for the epoch is empty, so there is nothing to shuffle.
    InsufficientValidators,
    UnableToShuffle,
    InvalidSeedLength(usize),
    ZeroSlotsPerEpoch,
    ZeroShardCount,
    UnknownValidator(usize),
    RandaoMixesOutOfBounds(usize),
    NoCommittee {
        slot: Slot,
        index: CommitteeIndex,
    },
    CommitteeCacheUninitialized(Option<RelativeEpoch>),
    RelativeEpochError(RelativeEpochError),
    ArithError(ArithError),
}

impl From<RelativeEpochError> for Error {
    fn from(e: RelativeEpochError) -> Error {
        Error::RelativeEpochError(e)
    }
}

impl From<ArithError> for Error {
    fn from(e: ArithError) -> Error {
        Error::ArithError(e)
    }
}

/// The state of the `BeaconChain` at some slot.
///
/// Only the parts of the state which feed committee assignment and crosslink processing are
/// represented. The committee caches are derived data: they are never serialized and take no part
/// in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconState {
    pub slot: Slot,

    // Registry
    pub validators: Vec<Validator>,

    // Randomness
    pub randao_mixes: Vec<Hash256>,

    // Crosslinks
    pub previous_crosslinks: Vec<Crosslink>,
    pub current_crosslinks: Vec<Crosslink>,

    // Attestations
    pub previous_epoch_attestations: Vec<PendingAttestation>,
    pub current_epoch_attestations: Vec<PendingAttestation>,

    // Caching
    #[serde(skip_serializing, skip_deserializing)]
    pub committee_caches: [Arc<CommitteeCache>; CACHED_EPOCHS],
}

impl PartialEq for BeaconState {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
            && self.validators == other.validators
            && self.randao_mixes == other.randao_mixes
            && self.previous_crosslinks == other.previous_crosslinks
            && self.current_crosslinks == other.current_crosslinks
            && self.previous_epoch_attestations == other.previous_epoch_attestations
            && self.current_epoch_attestations == other.current_epoch_attestations
    }
}

impl BeaconState {
    /// Create a new state at the genesis slot with a zeroed crosslink for every shard.
    pub fn new(validators: Vec<Validator>, randao_mixes: Vec<Hash256>, spec: &ChainSpec) -> Self {
        let crosslinks: Vec<Crosslink> = (0..spec.shard_count)
            .map(|shard| Crosslink::genesis(shard, spec.genesis_epoch))
            .collect();

        BeaconState {
            slot: spec.genesis_epoch.start_slot(spec.slots_per_epoch),
            validators,
            randao_mixes,
            previous_crosslinks: crosslinks.clone(),
            current_crosslinks: crosslinks,
            previous_epoch_attestations: vec![],
            current_epoch_attestations: vec![],
            committee_caches: Default::default(),
        }
    }

    /// The epoch corresponding to `self.slot`.
    pub fn current_epoch(&self, spec: &ChainSpec) -> Epoch {
        self.slot.epoch(spec.slots_per_epoch)
    }

    /// The epoch prior to `self.current_epoch()`.
    ///
    /// If the current epoch is the genesis epoch, the genesis_epoch is returned.
    pub fn previous_epoch(&self, spec: &ChainSpec) -> Epoch {
        let current_epoch = self.current_epoch(spec);
        if current_epoch > spec.genesis_epoch {
            current_epoch.saturating_sub(1u64)
        } else {
            current_epoch
        }
    }

    /// The epoch following `self.current_epoch()`.
    pub fn next_epoch(&self, spec: &ChainSpec) -> Result<Epoch, Error> {
        Ok(self.current_epoch(spec).safe_add(1u64)?)
    }

    /// Returns the RANDAO mix recorded for `epoch`.
    ///
    /// `randao_mixes` is treated as a ring buffer over its own length.
    pub fn get_randao_mix(&self, epoch: Epoch) -> Result<&Hash256, Error> {
        let i = epoch.as_usize().safe_rem(self.randao_mixes.len())?;
        self.randao_mixes
            .get(i)
            .ok_or(Error::RandaoMixesOutOfBounds(i))
    }

    /// Generate a seed for the given `epoch`.
    pub fn get_seed(
        &self,
        epoch: Epoch,
        domain_type: Domain,
        spec: &ChainSpec,
    ) -> Result<Hash256, Error> {
        let mix = self.get_randao_mix(seed_lookback_epoch(epoch, spec))?;
        derive_seed(
            epoch,
            spec.get_domain_constant(domain_type),
            mix.as_bytes(),
        )
    }

    /// Returns the registry indices of all validators active at `epoch`, in registry order.
    pub fn get_active_validator_indices(
        &self,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<Vec<usize>, Error> {
        get_active_validator_indices(&self.validators, epoch, spec)
    }

    /// Return the combined effective balance of an array of validators.
    ///
    /// The result is never less than one.
    pub fn get_total_balance(&self, validator_indices: &[usize]) -> Result<u64, Error> {
        let total = validator_indices.iter().try_fold(0_u64, |acc, i| -> Result<u64, Error> {
            let balance = self
                .validators
                .get(*i)
                .ok_or(Error::UnknownValidator(*i))?
                .effective_balance;
            acc.safe_add(balance).map_err(Error::from)
        })?;
        Ok(std::cmp::max(total, 1))
    }

    /// Get the Beacon committee at the given slot and index.
    ///
    /// Utilises the committee cache.
    pub fn get_beacon_committee(
        &self,
        slot: Slot,
        index: CommitteeIndex,
        spec: &ChainSpec,
    ) -> Result<BeaconCommittee<'_>, Error> {
        let epoch = slot.epoch(spec.slots_per_epoch);
        let relative_epoch = RelativeEpoch::from_epoch(self.current_epoch(spec), epoch)?;
        let cache = self.committee_cache(relative_epoch, spec)?;

        cache
            .get_beacon_committee(slot, index)
            .ok_or(Error::NoCommittee { slot, index })
    }

    /// Get all of the Beacon committees at a given slot.
    ///
    /// Utilises the committee cache.
    pub fn get_beacon_committees_at_slot(
        &self,
        slot: Slot,
        spec: &ChainSpec,
    ) -> Result<Vec<BeaconCommittee<'_>>, Error> {
        let cache = self.committee_cache_at_slot(slot, spec)?;
        cache.get_beacon_committees_at_slot(slot)
    }

    /// Get all of the Beacon committees for the epoch `relative_epoch` refers to.
    pub fn get_beacon_committees_at_epoch(
        &self,
        relative_epoch: RelativeEpoch,
        spec: &ChainSpec,
    ) -> Result<Vec<BeaconCommittee<'_>>, Error> {
        let cache = self.committee_cache(relative_epoch, spec)?;
        cache.get_all_beacon_committees()
    }

    /// Returns the crosslink committee duties of `validator_index` in `relative_epoch`.
    pub fn get_attestation_duties(
        &self,
        validator_index: usize,
        relative_epoch: RelativeEpoch,
        spec: &ChainSpec,
    ) -> Result<Option<AttestationDuty>, Error> {
        let cache = self.committee_cache(relative_epoch, spec)?;
        Ok(cache.get_attestation_duties(validator_index))
    }

    /// Build all committee caches, if they need to be built.
    pub fn build_all_committee_caches(&mut self, spec: &ChainSpec) -> Result<(), Error> {
        self.build_committee_cache(RelativeEpoch::Previous, spec)?;
        self.build_committee_cache(RelativeEpoch::Current, spec)?;
        self.build_committee_cache(RelativeEpoch::Next, spec)?;
        Ok(())
    }

    /// Build a committee cache, unless it is has already been built.
    pub fn build_committee_cache(
        &mut self,
        relative_epoch: RelativeEpoch,
        spec: &ChainSpec,
    ) -> Result<(), Error> {
        let i = relative_epoch.index();
        let epoch = relative_epoch.into_epoch(self.current_epoch(spec));

        if !self.committee_caches[i].is_initialized_at(epoch) {
            self.committee_caches[i] = Arc::new(CommitteeCache::initialized(self, epoch, spec)?);
        }
        Ok(())
    }

    /// Install a committee cache computed elsewhere, e.g. one served by a shared cache.
    pub fn set_committee_cache(
        &mut self,
        relative_epoch: RelativeEpoch,
        cache: Arc<CommitteeCache>,
        spec: &ChainSpec,
    ) -> Result<(), Error> {
        let epoch = relative_epoch.into_epoch(self.current_epoch(spec));
        if cache.is_initialized_at(epoch) {
            self.committee_caches[relative_epoch.index()] = cache;
            Ok(())
        } else {
            Err(Error::CommitteeCacheUninitialized(Some(relative_epoch)))
        }
    }

    /// Drop all committee caches.
    pub fn drop_committee_caches(&mut self) {
        self.committee_caches = Default::default();
    }

    /// Returns the cache for some `RelativeEpoch`. Returns an error if the cache has not been
    /// initialized.
    pub fn committee_cache(
        &self,
        relative_epoch: RelativeEpoch,
        spec: &ChainSpec,
    ) -> Result<&Arc<CommitteeCache>, Error> {
        let cache = &self.committee_caches[relative_epoch.index()];
        let epoch = relative_epoch.into_epoch(self.current_epoch(spec));

        if cache.is_initialized_at(epoch) {
            Ok(cache)
        } else {
            Err(Error::CommitteeCacheUninitialized(Some(relative_epoch)))
        }
    }

    /// Returns the cache for the epoch of `slot`.
    pub fn committee_cache_at_slot(
        &self,
        slot: Slot,
        spec: &ChainSpec,
    ) -> Result<&Arc<CommitteeCache>, Error> {
        let epoch = slot.epoch(spec.slots_per_epoch);
        let relative_epoch = RelativeEpoch::from_epoch(self.current_epoch(spec), epoch)?;
        self.committee_cache(relative_epoch, spec)
    }
}
