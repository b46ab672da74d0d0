use super::{ArchiveStore, ArchivedCommitteeInfo, StoreError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use types::Epoch;

type DBHashMap = HashMap<Epoch, ArchivedCommitteeInfo>;

/// A thread-safe `HashMap` wrapper.
#[derive(Clone, Default)]
pub struct MemoryStore {
    db: Arc<RwLock<DBHashMap>>,
}

impl MemoryStore {
    /// Create a new, empty database.
    pub fn open() -> Self {
        Self::default()
    }

    /// Block all readers until the returned guard is dropped.
    #[cfg(test)]
    pub(crate) fn lock_for_writing(&self) -> parking_lot::RwLockWriteGuard<'_, DBHashMap> {
        self.db.write()
    }
}

impl ArchiveStore for MemoryStore {
    fn get_archived_committee_info(
        &self,
        epoch: Epoch,
        timeout: Duration,
    ) -> Result<Option<ArchivedCommitteeInfo>, StoreError> {
        let db = self
            .db
            .try_read_for(timeout)
            .ok_or(StoreError::Timeout { epoch, timeout })?;

        Ok(db.get(&epoch).cloned())
    }

    fn put_archived_committee_info(&self, info: ArchivedCommitteeInfo) -> Result<(), StoreError> {
        let mut db = self.db.write();

        match db.get(&info.epoch) {
            Some(existing) if *existing == info => Ok(()),
            Some(_) => Err(StoreError::ArchiveConflict(info.epoch)),
            None => {
                db.insert(info.epoch, info);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Hash256;

    const TIMEOUT: Duration = Duration::from_millis(50);

    fn info(epoch: u64, seed: u8) -> ArchivedCommitteeInfo {
        ArchivedCommitteeInfo {
            epoch: Epoch::new(epoch),
            seed: Hash256::repeat_byte(seed),
            active_indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn put_and_get() {
        let store = MemoryStore::open();

        assert_eq!(
            store.get_archived_committee_info(Epoch::new(3), TIMEOUT),
            Ok(None)
        );

        store.put_archived_committee_info(info(3, 1)).unwrap();

        assert_eq!(
            store.get_archived_committee_info(Epoch::new(3), TIMEOUT),
            Ok(Some(info(3, 1)))
        );
        assert_eq!(store.contains_epoch(Epoch::new(3), TIMEOUT), Ok(true));
        assert_eq!(store.contains_epoch(Epoch::new(4), TIMEOUT), Ok(false));
    }

    #[test]
    fn entries_are_write_once() {
        let store = MemoryStore::open();

        store.put_archived_committee_info(info(3, 1)).unwrap();
        assert_eq!(store.put_archived_committee_info(info(3, 1)), Ok(()));
        assert_eq!(
            store.put_archived_committee_info(info(3, 2)),
            Err(StoreError::ArchiveConflict(Epoch::new(3)))
        );
        assert_eq!(
            store.get_archived_committee_info(Epoch::new(3), TIMEOUT),
            Ok(Some(info(3, 1)))
        );
    }

    #[test]
    fn read_times_out_while_locked() {
        let store = MemoryStore::open();
        let _guard = store.lock_for_writing();

        let err = store
            .get_archived_committee_info(Epoch::new(1), TIMEOUT)
            .unwrap_err();

        assert_eq!(
            err,
            StoreError::Timeout {
                epoch: Epoch::new(1),
                timeout: TIMEOUT
            }
        );
        assert!(err.is_retryable());
    }
}
