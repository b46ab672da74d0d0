pub mod chain_config;
pub mod committee_archive;
pub mod committees;
mod errors;
pub mod head;
pub mod metrics;
pub mod shuffling_cache;
pub mod store;
pub mod test_utils;

pub use self::chain_config::ChainConfig;
pub use self::committee_archive::CommitteeArchive;
pub use self::committees::{
    ApiError, BeaconCommittees, CommitteeQueryService, CommitteesAtSlot, CommitteesFilter,
};
pub use self::errors::BeaconChainError;
pub use self::head::{HeadFetcher, HeadState};
pub use self::shuffling_cache::ShufflingCache;
pub use self::store::{ArchiveStore, ArchivedCommitteeInfo, MemoryStore, StoreError};
