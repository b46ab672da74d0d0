//! Access to the canonical head, as required to answer committee queries for live epochs.
use crate::shuffling_cache::ShufflingCache;
use crate::BeaconChainError;
use slog::{debug, Logger};
use std::sync::Arc;
use types::{
    BeaconState, ChainSpec, CommitteeCache, Domain, Epoch, Hash256, RelativeEpoch, ShufflingId,
    Slot,
};

/// Read access to the current head of the chain.
pub trait HeadFetcher: Send + Sync {
    fn head_slot(&self) -> Slot;

    /// The active validator indices at `epoch`, according to the head registry.
    fn head_validator_indices(
        &self,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<Vec<usize>, BeaconChainError>;

    /// The attester shuffling seed for `epoch`, according to the head RANDAO mixes.
    fn head_seed(&self, epoch: Epoch, spec: &ChainSpec) -> Result<Hash256, BeaconChainError>;

    fn head_epoch(&self, spec: &ChainSpec) -> Epoch {
        self.head_slot().epoch(spec.slots_per_epoch)
    }

    /// Returns the committees of `epoch` as seen from the head.
    ///
    /// The default implementation shuffles from scratch on every call.
    fn head_committee_cache(
        &self,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<Arc<CommitteeCache>, BeaconChainError> {
        let seed = self.head_seed(epoch, spec)?;
        let active_indices = self.head_validator_indices(epoch, spec)?;
        let committee_cache = CommitteeCache::from_parts(epoch, seed, active_indices, spec)?;
        Ok(Arc::new(committee_cache))
    }
}

/// A snapshot of the head block and its post-state.
///
/// Committee caches already present in the state are used directly; anything else is computed
/// through the shared `ShufflingCache`.
pub struct HeadState {
    state: BeaconState,
    head_block_root: Hash256,
    shuffling_cache: Arc<ShufflingCache>,
    log: Logger,
}

impl HeadState {
    /// Installs a new head, advancing the retention window of `shuffling_cache` to its epoch.
    pub fn new(
        state: BeaconState,
        head_block_root: Hash256,
        shuffling_cache: Arc<ShufflingCache>,
        spec: &ChainSpec,
        log: Logger,
    ) -> Self {
        shuffling_cache.update_head_epoch(state.current_epoch(spec));
        Self {
            state,
            head_block_root,
            shuffling_cache,
            log,
        }
    }

    pub fn state(&self) -> &BeaconState {
        &self.state
    }

    pub fn head_block_root(&self) -> Hash256 {
        self.head_block_root
    }

    pub fn shuffling_id(&self, epoch: Epoch) -> ShufflingId {
        ShufflingId::from_components(epoch, self.head_block_root)
    }
}

impl HeadFetcher for HeadState {
    fn head_slot(&self) -> Slot {
        self.state.slot
    }

    fn head_validator_indices(
        &self,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<Vec<usize>, BeaconChainError> {
        Ok(self.state.get_active_validator_indices(epoch, spec)?)
    }

    fn head_seed(&self, epoch: Epoch, spec: &ChainSpec) -> Result<Hash256, BeaconChainError> {
        Ok(self.state.get_seed(epoch, Domain::BeaconAttester, spec)?)
    }

    fn head_committee_cache(
        &self,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<Arc<CommitteeCache>, BeaconChainError> {
        // If the head state can serve this request, use it.
        if let Ok(relative_epoch) = RelativeEpoch::from_epoch(self.state.current_epoch(spec), epoch)
        {
            if let Ok(committee_cache) = self.state.committee_cache(relative_epoch, spec) {
                return Ok(committee_cache.clone());
            }
        }

        self.shuffling_cache
            .get_or_compute(&self.shuffling_id(epoch), || {
                debug!(
                    self.log,
                    "Committee cache miss";
                    "shuffling_epoch" => epoch,
                    "head_block_root" => ?self.head_block_root,
                );
                let seed = self.head_seed(epoch, spec)?;
                let active_indices = self.head_validator_indices(epoch, spec)?;
                Ok(CommitteeCache::from_parts(
                    epoch,
                    seed,
                    active_indices,
                    spec,
                )?)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_logger;
    use types::test_utils::TestingBeaconStateBuilder;

    fn head(spec: &ChainSpec, build_caches: bool) -> (HeadState, Arc<ShufflingCache>) {
        let mut builder = TestingBeaconStateBuilder::new(64, spec);
        builder.teleport_to_epoch(Epoch::new(3), spec);
        if build_caches {
            builder.build_caches(spec).unwrap();
        }
        let shuffling_cache = Arc::new(ShufflingCache::new(16, 1, test_logger()));
        let head = HeadState::new(
            builder.build(),
            Hash256::repeat_byte(7),
            shuffling_cache.clone(),
            spec,
            test_logger(),
        );
        (head, shuffling_cache)
    }

    #[test]
    fn advances_retention_window() {
        let spec = ChainSpec::minimal();
        let (head, shuffling_cache) = head(&spec, false);

        assert_eq!(head.head_epoch(&spec), Epoch::new(3));
        assert_eq!(shuffling_cache.head_epoch(), Epoch::new(3));
    }

    #[test]
    fn computes_through_shuffling_cache() {
        let spec = ChainSpec::minimal();
        let (head, shuffling_cache) = head(&spec, false);
        let epoch = Epoch::new(3);

        let committee_cache = head.head_committee_cache(epoch, &spec).unwrap();

        assert!(shuffling_cache.contains(&head.shuffling_id(epoch)));
        assert_eq!(
            committee_cache.seed(),
            head.state()
                .get_seed(epoch, Domain::BeaconAttester, &spec)
                .unwrap()
        );

        let again = head.head_committee_cache(epoch, &spec).unwrap();
        assert!(Arc::ptr_eq(&committee_cache, &again));
    }

    #[test]
    fn prefers_state_committee_caches() {
        let spec = ChainSpec::minimal();
        let (head, shuffling_cache) = head(&spec, true);

        let committee_cache = head.head_committee_cache(Epoch::new(2), &spec).unwrap();

        assert!(shuffling_cache.is_empty());
        assert!(committee_cache.is_initialized_at(Epoch::new(2)));
    }

    #[test]
    fn matches_uncached_default() {
        let spec = ChainSpec::minimal();
        let (head, _) = head(&spec, false);
        let epoch = Epoch::new(4);

        let cached = head.head_committee_cache(epoch, &spec).unwrap();
        let seed = head.head_seed(epoch, &spec).unwrap();
        let fresh = CommitteeCache::from_parts(
            epoch,
            seed,
            head.head_validator_indices(epoch, &spec).unwrap(),
            &spec,
        )
        .unwrap();

        assert_eq!(*cached, fresh);
    }
}
