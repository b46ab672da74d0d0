use types::{BeaconStateError, CommitteeIndex, Shard, Slot};

#[derive(Debug, PartialEq)]
pub enum EpochProcessingError {
    /// An attestation refers to a committee which does not exist in its epoch.
    NoCommittee {
        slot: Slot,
        index: CommitteeIndex,
    },
    /// An attestation names a different shard than the one its committee crosslinks.
    ShardMismatch {
        slot: Slot,
        index: CommitteeIndex,
        attestation_shard: Shard,
        committee_shard: Shard,
    },
    InvalidBitfieldLength {
        slot: Slot,
        index: CommitteeIndex,
        expected: usize,
        found: usize,
    },
    /// A committee crosslinks a shard with no entry in the state's crosslinks.
    UnknownShard(Shard),
    BeaconStateError(BeaconStateError),
    ArithError(safe_arith::ArithError),
}

impl EpochProcessingError {
    /// Returns `true` if the error indicates a defect in the state transition itself rather than
    /// bad input. Such an error must halt processing; the state must not be committed.
    pub fn is_fatal(&self) -> bool {
        match self {
            EpochProcessingError::ArithError(_)
            | EpochProcessingError::BeaconStateError(BeaconStateError::ArithError(_))
            | EpochProcessingError::ShardMismatch { .. }
            | EpochProcessingError::UnknownShard(_) => true,
            EpochProcessingError::NoCommittee { .. }
            | EpochProcessingError::InvalidBitfieldLength { .. }
            | EpochProcessingError::BeaconStateError(_) => false,
        }
    }
}

impl From<BeaconStateError> for EpochProcessingError {
    fn from(e: BeaconStateError) -> EpochProcessingError {
        EpochProcessingError::BeaconStateError(e)
    }
}

impl From<safe_arith::ArithError> for EpochProcessingError {
    fn from(e: safe_arith::ArithError) -> EpochProcessingError {
        EpochProcessingError::ArithError(e)
    }
}
