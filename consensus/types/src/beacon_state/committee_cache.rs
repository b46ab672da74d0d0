use super::{BeaconState, Error};
use crate::*;
use core::num::NonZeroUsize;
use safe_arith::SafeArith;
use std::ops::Range;
use swap_or_not_shuffle::shuffle_list;


/// Computes and stores the shuffling for an epoch. Provides various getters to allow callers to
/// read the committees for the given epoch.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct CommitteeCache {
    initialized_epoch: Option<Epoch>,
    seed: Hash256,
    active_validator_indices: Vec<usize>,
    shuffling: Vec<usize>,
    shuffling_positions: Vec<Option<NonZeroUsize>>,
    committees_per_slot: u64,
    slots_per_epoch: u64,
    shard_count: u64,
}

impl CommitteeCache {
    /// Return a new, fully initialized cache.
    pub fn initialized(
        state: &BeaconState,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<CommitteeCache, Error> {
        RelativeEpoch::from_epoch(state.current_epoch(spec), epoch)
            .map_err(|_| Error::EpochOutOfBounds)?;

        let active_validator_indices = get_active_validator_indices(&state.validators, epoch, spec)?;
        let seed = state.get_seed(epoch, Domain::BeaconAttester, spec)?;

        Self::from_parts(epoch, seed, active_validator_indices, spec)
    }

    /// Build a cache from an epoch's seed and its active validator indices (in registry order).
    ///
    /// This is the only place a shuffling is computed; the result depends on nothing but the
    /// arguments.
    pub fn from_parts(
        epoch: Epoch,
        seed: Hash256,
        active_validator_indices: Vec<usize>,
        spec: &ChainSpec,
    ) -> Result<CommitteeCache, Error> {
        // May cause divide-by-zero errors.
        if spec.slots_per_epoch == 0 {
            return Err(Error::ZeroSlotsPerEpoch);
        }
        if spec.shard_count == 0 {
            return Err(Error::ZeroShardCount);
        }

        if active_validator_indices.is_empty() {
            return Err(Error::InsufficientValidators);
        }

        let committees_per_slot =
            spec.get_committee_count_per_slot(active_validator_indices.len())? as u64;

        let shuffling = shuffle_list(
            active_validator_indices.clone(),
            spec.shuffle_round_count,
            seed.as_bytes(),
            false,
        )
        .ok_or(Error::UnableToShuffle)?;

        let max_index = shuffling.iter().copied().max().unwrap_or(0);

        // The use of `NonZeroUsize` reduces the maximum number of possible validators by one.
        if max_index >= usize::MAX - 1 {
            return Err(Error::UnknownValidator(max_index));
        }

        let mut shuffling_positions = vec![None; max_index.safe_add(1)?];
        for (i, &v) in shuffling.iter().enumerate() {
            *shuffling_positions
                .get_mut(v)
                .ok_or(Error::UnknownValidator(v))? = NonZeroUsize::new(i.safe_add(1)?);
        }

        Ok(CommitteeCache {
            initialized_epoch: Some(epoch),
            seed,
            active_validator_indices,
            shuffling,
            shuffling_positions,
            committees_per_slot,
            slots_per_epoch: spec.slots_per_epoch,
            shard_count: spec.shard_count,
        })
    }

    /// Returns `true` if the cache has been initialized at the supplied `epoch`.
    ///
    /// An non-initialized cache does not provide any useful information.
    pub fn is_initialized_at(&self, epoch: Epoch) -> bool {
        Some(epoch) == self.initialized_epoch
    }

    pub fn initialized_epoch(&self) -> Option<Epoch> {
        self.initialized_epoch
    }

    /// The seed the shuffling was computed from.
    pub fn seed(&self) -> Hash256 {
        self.seed
    }

    /// Returns the active validator indices for the initialized epoch, in registry order.
    ///
    /// Always returns `&[]` for a non-initialized epoch.
    pub fn active_validator_indices(&self) -> &[usize] {
        &self.active_validator_indices
    }

    /// Returns the **shuffled** list of active validator indices for the initialized epoch.
    ///
    /// Always returns `&[]` for a non-initialized epoch.
    pub fn shuffling(&self) -> &[usize] {
        &self.shuffling
    }

    /// Returns the number of active validators in the initialized epoch.
    ///
    /// Always returns `usize::default()` for a non-initialized epoch.
    pub fn active_validator_count(&self) -> usize {
        self.shuffling.len()
    }

    pub fn committees_per_slot(&self) -> u64 {
        self.committees_per_slot
    }

    /// Returns the total number of committees in the initialized epoch.
    ///
    /// Always returns `usize::default()` for a non-initialized epoch.
    pub fn epoch_committee_count(&self) -> usize {
        epoch_committee_count(
            self.committees_per_slot as usize,
            self.slots_per_epoch as usize,
        )
    }

    /// Get the Beacon committee for the given `slot` and `index`.
    ///
    /// Return `None` if the cache is uninitialized, or the `slot` or `index` is out of range.
    pub fn get_beacon_committee(
        &self,
        slot: Slot,
        index: CommitteeIndex,
    ) -> Option<BeaconCommittee<'_>> {
        if self.initialized_epoch.is_none()
            || !self.is_initialized_at(slot.epoch(self.slots_per_epoch))
            || index >= self.committees_per_slot
        {
            return None;
        }

        let committee_index = compute_committee_index_in_epoch(
            slot,
            self.slots_per_epoch as usize,
            self.committees_per_slot as usize,
            index as usize,
        );
        let committee = self.compute_committee(committee_index)?;

        Some(BeaconCommittee {
            slot,
            index,
            shard: self.shard_for_index_in_epoch(committee_index),
            committee,
        })
    }

    /// Get all the Beacon committees at a given `slot`.
    ///
    /// Committees are sorted by ascending index order 0..committees_per_slot
    pub fn get_beacon_committees_at_slot(
        &self,
        slot: Slot,
    ) -> Result<Vec<BeaconCommittee<'_>>, Error> {
        if self.initialized_epoch.is_none() {
            return Err(Error::CommitteeCacheUninitialized(None));
        }

        (0..self.committees_per_slot)
            .map(|index| {
                self.get_beacon_committee(slot, index)
                    .ok_or(Error::NoCommittee { slot, index })
            })
            .collect()
    }

    /// Returns all committees for `self.initialized_epoch`.
    pub fn get_all_beacon_committees(&self) -> Result<Vec<BeaconCommittee<'_>>, Error> {
        let initialized_epoch = self
            .initialized_epoch
            .ok_or(Error::CommitteeCacheUninitialized(None))?;

        initialized_epoch
            .slot_iter(self.slots_per_epoch)
            .try_fold(
                Vec::with_capacity(self.epoch_committee_count()),
                |mut vec, slot| {
                    vec.append(&mut self.get_beacon_committees_at_slot(slot)?);
                    Ok(vec)
                },
            )
    }

    /// Returns the committees of every slot of the epoch, ordered by slot and then by index.
    ///
    /// The outer `Vec` always has `slots_per_epoch` entries.
    pub fn committees_by_slot(&self) -> Result<Vec<Vec<&[usize]>>, Error> {
        let initialized_epoch = self
            .initialized_epoch
            .ok_or(Error::CommitteeCacheUninitialized(None))?;

        initialized_epoch
            .slot_iter(self.slots_per_epoch)
            .map(|slot| {
                self.get_beacon_committees_at_slot(slot)
                    .map(|committees| committees.into_iter().map(|c| c.committee).collect())
            })
            .collect()
    }

    /// Returns the `AttestationDuty` for the given `validator_index`.
    ///
    /// Returns `None` if the `validator_index` does not exist, does not have duties or `Self` is
    /// non-initialized.
    pub fn get_attestation_duties(&self, validator_index: usize) -> Option<AttestationDuty> {
        let i = self.shuffled_position(validator_index)?;

        (0..self.epoch_committee_count())
            .map(|nth_committee| (nth_committee, self.compute_committee_range(nth_committee)))
            .find(|(_, range)| {
                if let Some(range) = range {
                    range.start <= i && range.end > i
                } else {
                    false
                }
            })
            .and_then(|(nth_committee, range)| {
                let (slot, index) = self.convert_to_slot_and_index(nth_committee as u64)?;
                let range = range?;
                let committee_position = i - range.start;
                let committee_len = range.end - range.start;

                Some(AttestationDuty {
                    slot,
                    index,
                    shard: self.shard_for_index_in_epoch(nth_committee),
                    committee_position,
                    committee_len,
                })
            })
    }

    /// Returns the shard crosslinked by the committee at (`slot`, `index`).
    pub fn shard_for_committee(&self, slot: Slot, index: CommitteeIndex) -> Option<Shard> {
        self.get_beacon_committee(slot, index).map(|c| c.shard)
    }

    /// Returns every committee of the epoch which crosslinks `shard`.
    pub fn get_committees_for_shard(
        &self,
        shard: Shard,
    ) -> Result<Vec<BeaconCommittee<'_>>, Error> {
        Ok(self
            .get_all_beacon_committees()?
            .into_iter()
            .filter(|c| c.shard == shard)
            .collect())
    }

    /// Convert an index addressing the list of all epoch committees into a slot and per-slot index.
    fn convert_to_slot_and_index(
        &self,
        global_committee_index: u64,
    ) -> Option<(Slot, CommitteeIndex)> {
        let epoch_start_slot = self.initialized_epoch?.start_slot(self.slots_per_epoch);
        let slot_offset = global_committee_index / self.committees_per_slot;
        let index = global_committee_index % self.committees_per_slot;
        Some((epoch_start_slot.safe_add(slot_offset).ok()?, index))
    }

    fn shard_for_index_in_epoch(&self, index_in_epoch: usize) -> Shard {
        index_in_epoch as u64 % self.shard_count
    }

    /// Returns a slice of `self.shuffling` that represents the `index`'th committee in the epoch.
    fn compute_committee(&self, index: usize) -> Option<&[usize]> {
        self.shuffling.get(self.compute_committee_range(index)?)
    }

    /// Returns a range of `self.shuffling` that represents the `index`'th committee in the epoch.
    ///
    /// To avoid a divide-by-zero, returns `None` if `self.committee_count` is zero.
    ///
    /// Will also return `None` if the index is out of bounds.
    fn compute_committee_range(&self, index: usize) -> Option<Range<usize>> {
        compute_committee_range_in_epoch(
            self.epoch_committee_count(),
            index,
            self.shuffling.len(),
        )
    }

    /// Returns the index of some validator in `self.shuffling`.
    ///
    /// Always returns `None` for a non-initialized epoch.
    fn shuffled_position(&self, validator_index: usize) -> Option<usize> {
        self.shuffling_positions
            .get(validator_index)?
            .map(|p| p.get() - 1)
    }
}

/// Computes the position of the given `committee_index` with respect to all committees in the
/// epoch.
///
/// The return result may be used to provide input to the `compute_committee_range_in_epoch`
/// function.
pub fn compute_committee_index_in_epoch(
    slot: Slot,
    slots_per_epoch: usize,
    committees_per_slot: usize,
    committee_index: usize,
) -> usize {
    (slot.as_usize() % slots_per_epoch) * committees_per_slot + committee_index
}

/// Computes the range for slicing the shuffled indices to determine the members of a committee.
///
/// The `index_in_epoch` parameter can be computed using `compute_committee_index_in_epoch`.
///
/// Multiplication happens before division so that every implementation lands on the same
/// boundaries when the list does not divide evenly.
pub fn compute_committee_range_in_epoch(
    epoch_committee_count: usize,
    index_in_epoch: usize,
    shuffling_len: usize,
) -> Option<Range<usize>> {
    if epoch_committee_count == 0 || index_in_epoch >= epoch_committee_count {
        return None;
    }

    let start = (shuffling_len.checked_mul(index_in_epoch)?) / epoch_committee_count;
    let end = (shuffling_len.checked_mul(index_in_epoch.checked_add(1)?)?) / epoch_committee_count;

    Some(start..end)
}

/// Returns the committee at (`slot`, `index`) computed directly from an epoch's active indices and
/// seed, without building a `CommitteeCache`.
///
/// `active_validator_indices` must be in registry order.
pub fn compute_beacon_committee(
    active_validator_indices: &[usize],
    seed: &[u8],
    slot: Slot,
    index: CommitteeIndex,
    committees_per_slot: usize,
    spec: &ChainSpec,
) -> Result<Vec<usize>, Error> {
    if spec.slots_per_epoch == 0 {
        return Err(Error::ZeroSlotsPerEpoch);
    }
    if active_validator_indices.is_empty() {
        return Err(Error::InsufficientValidators);
    }
    if index as usize >= committees_per_slot {
        return Err(Error::NoCommittee { slot, index });
    }

    let shuffled = shuffle_list(
        active_validator_indices.to_vec(),
        spec.shuffle_round_count,
        seed,
        false,
    )
    .ok_or(Error::UnableToShuffle)?;

    let index_in_epoch = compute_committee_index_in_epoch(
        slot,
        spec.slots_per_epoch as usize,
        committees_per_slot,
        index as usize,
    );
    let range = compute_committee_range_in_epoch(
        epoch_committee_count(committees_per_slot, spec.slots_per_epoch as usize),
        index_in_epoch,
        shuffled.len(),
    )
    .ok_or(Error::NoCommittee { slot, index })?;

    shuffled
        .get(range)
        .map(<[usize]>::to_vec)
        .ok_or(Error::NoCommittee { slot, index })
}

/// Returns a list of all `validators` indices where the validator is active at the given
/// `epoch`.
pub fn get_active_validator_indices(
    validators: &[Validator],
    epoch: Epoch,
    spec: &ChainSpec,
) -> Result<Vec<usize>, Error> {
    if epoch < spec.genesis_epoch {
        return Err(Error::EpochPrecedesGenesis {
            epoch,
            genesis_epoch: spec.genesis_epoch,
        });
    }

    let mut active = Vec::with_capacity(validators.len());

    for (index, validator) in validators.iter().enumerate() {
        if validator.is_active_at(epoch) {
            active.push(index)
        }
    }

    active.shrink_to_fit();

    Ok(active)
}

fn epoch_committee_count(committees_per_slot: usize, slots_per_epoch: usize) -> usize {
    committees_per_slot * slots_per_epoch
}
