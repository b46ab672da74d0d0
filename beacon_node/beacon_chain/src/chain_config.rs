use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The default number of shufflings held by the `ShufflingCache`.
pub const DEFAULT_SHUFFLING_CACHE_SIZE: usize = 16;
/// The default number of epochs before the head epoch which are served from live state.
pub const DEFAULT_LIVE_COMMITTEE_EPOCHS: u64 = 1;
/// The default time allowed for a committee archive read.
pub const DEFAULT_ARCHIVE_READ_TIMEOUT_MS: u64 = 1_000;

#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Maximum number of shufflings held by the shuffling cache.
    pub shuffling_cache_size: usize,
    /// An epoch `e` is served from live state while `e + live_committee_epochs >= head_epoch`.
    /// Older epochs are only available from the committee archive.
    pub live_committee_epochs: u64,
    /// Persist the seed and active indices of each finalized epoch.
    pub archive_committees: bool,
    /// Time allowed for a single committee archive read before it is abandoned.
    pub archive_read_timeout_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            shuffling_cache_size: DEFAULT_SHUFFLING_CACHE_SIZE,
            live_committee_epochs: DEFAULT_LIVE_COMMITTEE_EPOCHS,
            archive_committees: false,
            archive_read_timeout_ms: DEFAULT_ARCHIVE_READ_TIMEOUT_MS,
        }
    }
}

impl ChainConfig {
    pub fn archive_read_timeout(&self) -> Duration {
        Duration::from_millis(self.archive_read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_uses_defaults() {
        let config: ChainConfig =
            serde_yaml::from_str("archive_committees: true\nlive_committee_epochs: 3\n").unwrap();

        assert!(config.archive_committees);
        assert_eq!(config.live_committee_epochs, 3);
        assert_eq!(config.shuffling_cache_size, DEFAULT_SHUFFLING_CACHE_SIZE);
        assert_eq!(
            config.archive_read_timeout(),
            Duration::from_millis(DEFAULT_ARCHIVE_READ_TIMEOUT_MS)
        );
    }
}
