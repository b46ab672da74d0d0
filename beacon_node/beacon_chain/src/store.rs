//! Persistence for committee data which can no longer be derived from live state.

mod memory_store;

pub use self::memory_store::MemoryStore;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use types::{ChainSpec, CommitteeCache, Epoch, Hash256};

#[derive(Debug, PartialEq, Clone)]
pub enum StoreError {
    /// The store could not be read within the allotted time. Retrying may succeed.
    Timeout { epoch: Epoch, timeout: Duration },
    /// A different value is already archived for the epoch.
    ArchiveConflict(Epoch),
    DBError { message: String },
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Timeout { .. })
    }
}

/// The seed and active validator set of a past epoch.
///
/// Together with a `ChainSpec` this is sufficient to rebuild every committee of the epoch.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ArchivedCommitteeInfo {
    pub epoch: Epoch,
    pub seed: Hash256,
    /// Active validator indices in registry order.
    pub active_indices: Vec<usize>,
}

impl ArchivedCommitteeInfo {
    pub fn from_committee_cache(committee_cache: &CommitteeCache) -> Option<Self> {
        Some(Self {
            epoch: committee_cache.initialized_epoch()?,
            seed: committee_cache.seed(),
            active_indices: committee_cache.active_validator_indices().to_vec(),
        })
    }

    pub fn active_validator_count(&self) -> usize {
        self.active_indices.len()
    }

    /// Rebuild the committees of the archived epoch.
    pub fn committee_cache(
        &self,
        spec: &ChainSpec,
    ) -> Result<CommitteeCache, types::BeaconStateError> {
        CommitteeCache::from_parts(self.epoch, self.seed, self.active_indices.clone(), spec)
    }
}

/// An object capable of storing and retrieving archived committee information.
///
/// Entries are immutable: once an epoch has been written, it may only be re-written with an
/// identical value.
pub trait ArchiveStore: Sync + Send + Sized + 'static {
    /// Fetch the archived info for `epoch`, giving up after `timeout`.
    fn get_archived_committee_info(
        &self,
        epoch: Epoch,
        timeout: Duration,
    ) -> Result<Option<ArchivedCommitteeInfo>, StoreError>;

    /// Store `info`, keyed by its epoch.
    fn put_archived_committee_info(&self, info: ArchivedCommitteeInfo) -> Result<(), StoreError>;

    /// Returns `true` if `epoch` has been archived.
    fn contains_epoch(&self, epoch: Epoch, timeout: Duration) -> Result<bool, StoreError> {
        self.get_archived_committee_info(epoch, timeout)
            .map(|info| info.is_some())
    }
}
