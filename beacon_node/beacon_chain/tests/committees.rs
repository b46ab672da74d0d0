use beacon_chain::store::{ArchiveStore, ArchivedCommitteeInfo, StoreError};
use beacon_chain::test_utils::{test_logger, CommitteeHarness, HEAD_BLOCK_ROOT};
use beacon_chain::{
    ApiError, BeaconCommittees, ChainConfig, CommitteeArchive, CommitteeQueryService,
    CommitteesFilter, HeadState, ShufflingCache,
};
use std::sync::Arc;
use std::time::Duration;
use types::test_utils::TestingBeaconStateBuilder;
use types::{ChainSpec, CommitteeCache, Epoch};

const VALIDATOR_COUNT: usize = 64;

fn harness(head_epoch: u64, config: ChainConfig) -> CommitteeHarness {
    CommitteeHarness::new(
        VALIDATOR_COUNT,
        Epoch::new(head_epoch),
        config,
        ChainSpec::minimal(),
    )
}

fn archiving_config() -> ChainConfig {
    ChainConfig {
        archive_committees: true,
        ..ChainConfig::default()
    }
}

fn assert_matches_committee_cache(response: &BeaconCommittees, expected: &CommitteeCache) {
    let spec = ChainSpec::minimal();
    let expected_by_slot = expected.committees_by_slot().unwrap();

    assert_eq!(Some(response.epoch), expected.initialized_epoch());
    assert_eq!(response.active_validator_count, expected.active_validator_count());
    assert_eq!(response.committees.len(), spec.slots_per_epoch as usize);

    for ((at_slot, expected_committees), slot) in response
        .committees
        .iter()
        .zip(expected_by_slot)
        .zip(response.epoch.slot_iter(spec.slots_per_epoch))
    {
        assert_eq!(at_slot.slot, slot);
        let expected_committees: Vec<Vec<u64>> = expected_committees
            .iter()
            .map(|committee| committee.iter().map(|i| *i as u64).collect())
            .collect();
        assert_eq!(at_slot.committees, expected_committees);
    }
}

#[test]
fn head_filter_covers_one_epoch_in_slot_order() {
    let harness = harness(3, ChainConfig::default());

    let response = harness.service.list_committees(CommitteesFilter::Head).unwrap();

    assert_eq!(response.epoch, Epoch::new(3));
    assert_matches_committee_cache(&response, &harness.expected_committee_cache(Epoch::new(3)));

    // Every active validator appears exactly once across the epoch.
    let mut all: Vec<u64> = response
        .committees
        .iter()
        .flat_map(|at_slot| at_slot.committees.iter().flatten().copied())
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..VALIDATOR_COUNT as u64).collect::<Vec<_>>());
}

#[test]
fn genesis_filters() {
    let harness = harness(1, ChainConfig::default());

    let genesis = harness
        .service
        .list_committees(CommitteesFilter::Genesis(true))
        .unwrap();
    assert_eq!(genesis.epoch, Epoch::new(0));
    assert_matches_committee_cache(&genesis, &harness.expected_committee_cache(Epoch::new(0)));

    let not_genesis = harness
        .service
        .list_committees(CommitteesFilter::Genesis(false))
        .unwrap();
    assert_eq!(
        not_genesis,
        harness.service.list_committees(CommitteesFilter::Head).unwrap()
    );
}

#[test]
fn future_epoch_is_invalid_argument() {
    let harness = harness(3, archiving_config());

    match harness
        .service
        .list_committees(CommitteesFilter::Epoch(Epoch::new(4)))
    {
        Err(ApiError::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
    assert!(harness.shuffling_cache.is_empty());
}

#[test]
fn archival_epoch_with_archiving_disabled_is_not_found() {
    let harness = harness(5, ChainConfig::default());
    harness.archive_epochs(0..5);

    let result = harness
        .service
        .list_committees(CommitteesFilter::Epoch(Epoch::new(3)));

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert!(!result.unwrap_err().is_retryable());
}

#[test]
fn missing_archived_epoch_is_not_found() {
    let harness = harness(5, archiving_config());
    harness.archive_epochs(1..5);

    assert!(matches!(
        harness
            .service
            .list_committees(CommitteesFilter::Epoch(Epoch::new(0))),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn archival_epoch_is_rebuilt_from_archive() {
    let harness = harness(5, archiving_config());
    harness.archive_epochs(0..5);

    let response = harness
        .service
        .list_committees(CommitteesFilter::Epoch(Epoch::new(2)))
        .unwrap();

    assert_matches_committee_cache(&response, &harness.expected_committee_cache(Epoch::new(2)));
    // The archive path never touches the shuffling cache.
    assert!(harness.shuffling_cache.is_empty());
}

#[test]
fn finalized_epochs_remain_servable_after_the_head_advances() {
    let config = archiving_config();
    let harness = harness(3, config.clone());

    harness.service.on_finalized(Epoch::new(2)).unwrap();
    assert_eq!(harness.archive.archived_through(), Some(Epoch::new(2)));

    // A later head, where epoch 1 has left the live window.
    let spec = harness.spec.clone();
    let mut builder = TestingBeaconStateBuilder::new(VALIDATOR_COUNT, &spec);
    builder.teleport_to_epoch(Epoch::new(8), &spec);
    let head = Arc::new(HeadState::new(
        builder.build(),
        HEAD_BLOCK_ROOT,
        harness.shuffling_cache.clone(),
        &spec,
        test_logger(),
    ));
    let service = CommitteeQueryService::new(
        head,
        harness.archive.clone(),
        spec,
        &config,
        test_logger(),
    );

    let response = service
        .list_committees(CommitteesFilter::Epoch(Epoch::new(1)))
        .unwrap();
    assert_matches_committee_cache(&response, &harness.expected_committee_cache(Epoch::new(1)));

    // Nothing past the finalized epoch was archived.
    assert!(matches!(
        service.list_committees(CommitteesFilter::Epoch(Epoch::new(4))),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn previous_epoch_is_live() {
    let harness = harness(5, ChainConfig::default());

    let response = harness
        .service
        .list_committees(CommitteesFilter::Epoch(Epoch::new(4)))
        .unwrap();

    assert_matches_committee_cache(&response, &harness.expected_committee_cache(Epoch::new(4)));
    assert!(harness
        .shuffling_cache
        .contains(&harness.head.shuffling_id(Epoch::new(4))));

    // Two epochs back is archival.
    assert!(matches!(
        harness
            .service
            .list_committees(CommitteesFilter::Epoch(Epoch::new(3))),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn wider_live_window() {
    let config = ChainConfig {
        live_committee_epochs: 3,
        ..ChainConfig::default()
    };
    let harness = harness(5, config);

    let response = harness
        .service
        .list_committees(CommitteesFilter::Epoch(Epoch::new(2)))
        .unwrap();
    assert_matches_committee_cache(&response, &harness.expected_committee_cache(Epoch::new(2)));

    assert!(matches!(
        harness
            .service
            .list_committees(CommitteesFilter::Epoch(Epoch::new(1))),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn concurrent_queries_share_one_shuffling() {
    let harness = Arc::new(harness(5, ChainConfig::default()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let harness = harness.clone();
            std::thread::spawn(move || harness.service.list_committees(CommitteesFilter::Head))
        })
        .collect();
    let responses: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();

    for response in &responses {
        assert_eq!(response, &responses[0]);
    }
    assert_eq!(harness.shuffling_cache.len(), 1);
}

/// A store which never answers in time.
struct UnavailableStore;

impl ArchiveStore for UnavailableStore {
    fn get_archived_committee_info(
        &self,
        epoch: Epoch,
        timeout: Duration,
    ) -> Result<Option<ArchivedCommitteeInfo>, StoreError> {
        Err(StoreError::Timeout { epoch, timeout })
    }

    fn put_archived_committee_info(&self, _: ArchivedCommitteeInfo) -> Result<(), StoreError> {
        Ok(())
    }
}

#[test]
fn archive_timeout_is_retryable_internal_error() {
    let spec = Arc::new(ChainSpec::minimal());
    let config = archiving_config();

    let mut builder = TestingBeaconStateBuilder::new(VALIDATOR_COUNT, &spec);
    builder.teleport_to_epoch(Epoch::new(5), &spec);
    let shuffling_cache = Arc::new(ShufflingCache::new(16, 1, test_logger()));
    let head = Arc::new(HeadState::new(
        builder.build(),
        HEAD_BLOCK_ROOT,
        shuffling_cache,
        &spec,
        test_logger(),
    ));
    let archive = Arc::new(CommitteeArchive::new(
        UnavailableStore,
        true,
        config.archive_read_timeout(),
        test_logger(),
    ));
    let service = CommitteeQueryService::new(head, archive, spec, &config, test_logger());

    match service.list_committees(CommitteesFilter::Epoch(Epoch::new(1))) {
        Err(e @ ApiError::Internal { .. }) => assert!(e.is_retryable()),
        other => panic!("expected a retryable internal error, got {:?}", other),
    }
}
