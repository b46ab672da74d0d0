use crate::store::StoreError;
use safe_arith::ArithError;
use types::*;

macro_rules! easy_from_to {
    ($from: ident, $to: ident) => {
        impl From<$from> for $to {
            fn from(e: $from) -> $to {
                $to::$from(e)
            }
        }
    };
}

#[derive(Debug, PartialEq, Clone)]
pub enum BeaconChainError {
    BeaconStateError(BeaconStateError),
    StoreError(StoreError),
    ArithError(ArithError),
    /// The shuffling for `epoch` has fallen out of the live window and must be read from the
    /// archive instead.
    EpochBelowRetention {
        epoch: Epoch,
        head_epoch: Epoch,
    },
    /// The epoch cannot be placed relative to the retention window without overflowing.
    ShufflingCacheEpochOverflow(Epoch),
    /// A computed committee cache was for a different epoch than its key.
    ShufflingCacheEpochMismatch {
        expected: Epoch,
        found: Option<Epoch>,
    },
    CommitteeArchiveDisabled,
    ArchivedCommitteeInfoMissing(Epoch),
}

easy_from_to!(BeaconStateError, BeaconChainError);
easy_from_to!(StoreError, BeaconChainError);
easy_from_to!(ArithError, BeaconChainError);
