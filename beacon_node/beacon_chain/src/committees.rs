//! Read-only committee queries, as served to the HTTP API.
//!
//! Epochs within `live_committee_epochs` of the head are served from the head via the shuffling
//! cache. Older epochs are rebuilt from the committee archive. Epochs after the head are rejected.
use crate::chain_config::ChainConfig;
use crate::committee_archive::CommitteeArchive;
use crate::head::HeadFetcher;
use crate::store::ArchiveStore;
use crate::{metrics, BeaconChainError};
use serde::{Deserialize, Serialize};
use slog::{debug, error, Logger};
use std::fmt;
use std::sync::Arc;
use types::{ChainSpec, CommitteeCache, Epoch, Slot};

/// Selects the epoch of a committee query.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum CommitteesFilter {
    Epoch(Epoch),
    /// `true` selects the genesis epoch, `false` is the same as `Head`.
    Genesis(bool),
    #[default]
    Head,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CommitteesAtSlot {
    pub slot: Slot,
    /// Committees ordered by committee index.
    pub committees: Vec<Vec<u64>>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct BeaconCommittees {
    pub epoch: Epoch,
    /// One entry per slot of the epoch, in slot order.
    pub committees: Vec<CommitteesAtSlot>,
    pub active_validator_count: usize,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidArgument(String),
    Internal { message: String, retryable: bool },
}

impl ApiError {
    /// Returns `true` if the same request may succeed later without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Internal { retryable: true, .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "NOT_FOUND: {}", msg),
            ApiError::InvalidArgument(msg) => write!(f, "BAD_REQUEST: {}", msg),
            ApiError::Internal { message, .. } => write!(f, "INTERNAL_ERROR: {}", message),
        }
    }
}

pub fn custom_not_found(msg: String) -> ApiError {
    ApiError::NotFound(msg)
}

pub fn custom_bad_request(msg: String) -> ApiError {
    ApiError::InvalidArgument(msg)
}

pub fn beacon_chain_error(e: BeaconChainError) -> ApiError {
    let retryable = matches!(&e, BeaconChainError::StoreError(e) if e.is_retryable());
    ApiError::Internal {
        message: format!("{:?}", e),
        retryable,
    }
}

/// Answers `ListCommittees` requests.
pub struct CommitteeQueryService<H: HeadFetcher, S: ArchiveStore> {
    head: Arc<H>,
    archive: Arc<CommitteeArchive<S>>,
    spec: Arc<ChainSpec>,
    live_committee_epochs: u64,
    log: Logger,
}

impl<H: HeadFetcher, S: ArchiveStore> CommitteeQueryService<H, S> {
    pub fn new(
        head: Arc<H>,
        archive: Arc<CommitteeArchive<S>>,
        spec: Arc<ChainSpec>,
        config: &ChainConfig,
        log: Logger,
    ) -> Self {
        Self {
            head,
            archive,
            spec,
            live_committee_epochs: config.live_committee_epochs,
            log,
        }
    }

    /// Returns every committee of the epoch selected by `filter`.
    pub fn list_committees(&self, filter: CommitteesFilter) -> Result<BeaconCommittees, ApiError> {
        let _timer = metrics::start_timer(&metrics::COMMITTEE_QUERY_TIMES);

        let slots_per_epoch = self.spec.slots_per_epoch;
        let head_epoch = self.head.head_epoch(&self.spec);
        let start_slot = self.start_slot(filter, head_epoch);
        let epoch = start_slot.epoch(slots_per_epoch);

        if epoch > head_epoch {
            metrics::inc_counter(&metrics::COMMITTEE_QUERY_REJECTED_REQUESTS);
            return Err(custom_bad_request(format!(
                "epoch {} is after the head epoch {}",
                epoch, head_epoch
            )));
        }

        let committee_cache = if epoch.saturating_add(self.live_committee_epochs) < head_epoch {
            metrics::inc_counter(&metrics::COMMITTEE_QUERY_ARCHIVE_REQUESTS);
            self.archived_committee_cache(epoch, start_slot)?
        } else {
            metrics::inc_counter(&metrics::COMMITTEE_QUERY_LIVE_REQUESTS);
            self.live_committee_cache(epoch, start_slot)?
        };

        let committees = committee_cache
            .committees_by_slot()
            .map_err(|e| self.internal_error(epoch, start_slot, e.into()))?
            .into_iter()
            .zip(epoch.slot_iter(slots_per_epoch))
            .map(|(committees, slot)| CommitteesAtSlot {
                slot,
                committees: committees
                    .into_iter()
                    .map(|committee| committee.iter().map(|i| *i as u64).collect())
                    .collect(),
            })
            .collect();

        Ok(BeaconCommittees {
            epoch,
            committees,
            active_validator_count: committee_cache.active_validator_count(),
        })
    }

    /// Archive the committees of every newly finalized epoch, so they can still be served once
    /// they leave the live window.
    pub fn on_finalized(&self, finalized_epoch: Epoch) -> Result<(), BeaconChainError> {
        self.archive
            .on_finalized(self.head.as_ref(), finalized_epoch, &self.spec)
            .map_err(|e| {
                error!(
                    self.log,
                    "Failed to archive finalized committees";
                    "error" => ?e,
                    "finalized_epoch" => finalized_epoch,
                );
                e
            })
    }

    fn start_slot(&self, filter: CommitteesFilter, head_epoch: Epoch) -> Slot {
        let epoch = match filter {
            CommitteesFilter::Epoch(epoch) => epoch,
            CommitteesFilter::Genesis(true) => self.spec.genesis_epoch,
            CommitteesFilter::Genesis(false) | CommitteesFilter::Head => head_epoch,
        };
        epoch.start_slot(self.spec.slots_per_epoch)
    }

    fn live_committee_cache(
        &self,
        epoch: Epoch,
        start_slot: Slot,
    ) -> Result<Arc<CommitteeCache>, ApiError> {
        self.head
            .head_committee_cache(epoch, &self.spec)
            .map_err(|e| self.internal_error(epoch, start_slot, e))
    }

    fn archived_committee_cache(
        &self,
        epoch: Epoch,
        start_slot: Slot,
    ) -> Result<Arc<CommitteeCache>, ApiError> {
        let info = self.archive.lookup(epoch).map_err(|e| match e {
            BeaconChainError::CommitteeArchiveDisabled => {
                debug!(
                    self.log,
                    "Committee query for unarchived epoch";
                    "epoch" => epoch,
                    "slot" => start_slot,
                );
                custom_not_found(format!(
                    "epoch {} is not retained and committee archiving is disabled",
                    epoch
                ))
            }
            BeaconChainError::ArchivedCommitteeInfoMissing(_) => {
                custom_not_found(format!("no archived committees for epoch {}", epoch))
            }
            e => self.internal_error(epoch, start_slot, e),
        })?;

        info.committee_cache(&self.spec)
            .map(Arc::new)
            .map_err(|e| self.internal_error(epoch, start_slot, e.into()))
    }

    fn internal_error(&self, epoch: Epoch, start_slot: Slot, e: BeaconChainError) -> ApiError {
        error!(
            self.log,
            "Committee query failed";
            "error" => ?e,
            "epoch" => epoch,
            "slot" => start_slot,
        );
        beacon_chain_error(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn store_timeouts_are_retryable() {
        let timeout = beacon_chain_error(BeaconChainError::StoreError(StoreError::Timeout {
            epoch: Epoch::new(1),
            timeout: std::time::Duration::from_millis(1),
        }));
        assert!(timeout.is_retryable());

        let db = beacon_chain_error(BeaconChainError::StoreError(StoreError::DBError {
            message: "corrupt".into(),
        }));
        assert!(!db.is_retryable());

        assert!(!custom_not_found("gone".into()).is_retryable());
        assert!(!custom_bad_request("future".into()).is_retryable());
    }

    #[test]
    fn default_filter_is_head() {
        assert_eq!(CommitteesFilter::default(), CommitteesFilter::Head);
    }
}
