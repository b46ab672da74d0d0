use crate::head::HeadFetcher;
use crate::store::{ArchiveStore, ArchivedCommitteeInfo, StoreError};
use crate::{metrics, BeaconChainError};
use parking_lot::Mutex;
use slog::{debug, info, warn, Logger};
use std::time::Duration;
use types::{BeaconStateError, ChainSpec, CommitteeCache, Epoch};

/// Serves the seed and active validator set of epochs which have fallen out of the live window.
///
/// Archived epochs are never recomputed: the registry that produced them is no longer available.
pub struct CommitteeArchive<S: ArchiveStore> {
    store: S,
    enabled: bool,
    read_timeout: Duration,
    /// The highest epoch written by `on_finalized`.
    archived_through: Mutex<Option<Epoch>>,
    log: Logger,
}

impl<S: ArchiveStore> CommitteeArchive<S> {
    pub fn new(store: S, enabled: bool, read_timeout: Duration, log: Logger) -> Self {
        Self {
            store,
            enabled,
            read_timeout,
            archived_through: Mutex::new(None),
            log,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist the seed and active indices of the epoch `committee_cache` was built for.
    ///
    /// Does nothing when archiving is disabled. Writing the same epoch twice is only an error if
    /// the two values differ.
    pub fn archive_epoch(&self, committee_cache: &CommitteeCache) -> Result<(), BeaconChainError> {
        if !self.enabled {
            return Ok(());
        }

        let info = ArchivedCommitteeInfo::from_committee_cache(committee_cache)
            .ok_or(BeaconStateError::CommitteeCacheUninitialized(None))?;
        let epoch = info.epoch;

        self.store.put_archived_committee_info(info)?;
        metrics::inc_counter(&metrics::COMMITTEE_ARCHIVE_WRITES);

        debug!(
            self.log,
            "Archived committee info";
            "epoch" => epoch,
            "active_validators" => committee_cache.active_validator_count(),
        );

        Ok(())
    }

    /// Archive every epoch up to and including `finalized_epoch` which has not been archived by a
    /// previous call, starting from genesis.
    ///
    /// Each epoch is rebuilt from the seed and registry of `head`, so this must run while the
    /// head can still derive them. Epochs after the head epoch are left for a later call.
    pub fn on_finalized<H: HeadFetcher>(
        &self,
        head: &H,
        finalized_epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<(), BeaconChainError> {
        if !self.enabled {
            return Ok(());
        }

        let mut archived_through = self.archived_through.lock();
        let start_epoch = match *archived_through {
            Some(epoch) => epoch.safe_add(1u64)?,
            None => spec.genesis_epoch,
        };
        let end_epoch = std::cmp::min(finalized_epoch, head.head_epoch(spec));
        if start_epoch > end_epoch {
            return Ok(());
        }

        for epoch in (start_epoch.as_u64()..=end_epoch.as_u64()).map(Epoch::new) {
            let seed = head.head_seed(epoch, spec)?;
            let active_indices = head.head_validator_indices(epoch, spec)?;
            let committee_cache = CommitteeCache::from_parts(epoch, seed, active_indices, spec)?;
            self.archive_epoch(&committee_cache)?;
            *archived_through = Some(epoch);
        }

        info!(
            self.log,
            "Archived finalized committees";
            "start_epoch" => start_epoch,
            "end_epoch" => end_epoch,
        );

        Ok(())
    }

    pub fn archived_through(&self) -> Option<Epoch> {
        *self.archived_through.lock()
    }

    /// Fetch the archived info for `epoch`.
    pub fn lookup(&self, epoch: Epoch) -> Result<ArchivedCommitteeInfo, BeaconChainError> {
        if !self.enabled {
            return Err(BeaconChainError::CommitteeArchiveDisabled);
        }

        let timer = metrics::start_timer(&metrics::COMMITTEE_ARCHIVE_READ_TIMES);
        let result = self.store.get_archived_committee_info(epoch, self.read_timeout);
        metrics::stop_timer(timer);

        match result {
            Ok(Some(info)) => Ok(info),
            Ok(None) => Err(BeaconChainError::ArchivedCommitteeInfoMissing(epoch)),
            Err(e @ StoreError::Timeout { .. }) => {
                metrics::inc_counter(&metrics::COMMITTEE_ARCHIVE_READ_TIMEOUTS);
                warn!(
                    self.log,
                    "Committee archive read timed out";
                    "epoch" => epoch,
                    "timeout_ms" => self.read_timeout.as_millis() as u64,
                );
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
