use crate::chain_config::ChainConfig;
use crate::committee_archive::CommitteeArchive;
use crate::committees::CommitteeQueryService;
use crate::head::{HeadFetcher, HeadState};
use crate::shuffling_cache::ShufflingCache;
use crate::store::MemoryStore;
use slog::Logger;
use sloggers::{null::NullLoggerBuilder, Build};
use std::sync::Arc;
use types::{test_utils::TestingBeaconStateBuilder, ChainSpec, CommitteeCache, Epoch, Hash256};

pub const HEAD_BLOCK_ROOT: Hash256 = Hash256::repeat_byte(0xaa);

pub fn test_logger() -> Logger {
    NullLoggerBuilder.build().expect("logger should build")
}

/// Wires a head state, shuffling cache, in-memory archive and query service together.
///
/// Used for testing only.
pub struct CommitteeHarness {
    pub spec: Arc<ChainSpec>,
    pub config: ChainConfig,
    pub head: Arc<HeadState>,
    pub shuffling_cache: Arc<ShufflingCache>,
    pub archive: Arc<CommitteeArchive<MemoryStore>>,
    pub service: CommitteeQueryService<HeadState, MemoryStore>,
}

impl CommitteeHarness {
    /// Builds a head at the first slot of `head_epoch` with `validator_count` active validators.
    pub fn new(
        validator_count: usize,
        head_epoch: Epoch,
        config: ChainConfig,
        spec: ChainSpec,
    ) -> Self {
        let spec = Arc::new(spec);
        let log = test_logger();

        let mut builder = TestingBeaconStateBuilder::new(validator_count, &spec);
        builder.teleport_to_epoch(head_epoch, &spec);

        let shuffling_cache = Arc::new(ShufflingCache::new(
            config.shuffling_cache_size,
            config.live_committee_epochs,
            log.clone(),
        ));
        let head = Arc::new(HeadState::new(
            builder.build(),
            HEAD_BLOCK_ROOT,
            shuffling_cache.clone(),
            &spec,
            log.clone(),
        ));
        let archive = Arc::new(CommitteeArchive::new(
            MemoryStore::open(),
            config.archive_committees,
            config.archive_read_timeout(),
            log.clone(),
        ));
        let service =
            CommitteeQueryService::new(head.clone(), archive.clone(), spec.clone(), &config, log);

        Self {
            spec,
            config,
            head,
            shuffling_cache,
            archive,
            service,
        }
    }

    /// The committees of `epoch` computed from the head, without any caching.
    pub fn expected_committee_cache(&self, epoch: Epoch) -> CommitteeCache {
        let seed = self
            .head
            .head_seed(epoch, &self.spec)
            .expect("should compute seed");
        let active_indices = self
            .head
            .head_validator_indices(epoch, &self.spec)
            .expect("should compute active indices");
        CommitteeCache::from_parts(epoch, seed, active_indices, &self.spec)
            .expect("should build committee cache")
    }

    /// Archive every epoch in `epochs`, as happens when they are finalized.
    pub fn archive_epochs(&self, epochs: impl IntoIterator<Item = u64>) {
        for epoch in epochs {
            let committee_cache = self.expected_committee_cache(Epoch::new(epoch));
            self.archive
                .archive_epoch(&committee_cache)
                .expect("should archive epoch");
        }
    }
}
