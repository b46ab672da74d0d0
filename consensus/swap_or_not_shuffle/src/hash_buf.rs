use crate::SEED_SIZE;
use ethereum_hashing::hash_fixed;

const ROUND_SIZE: usize = 1;
const POSITION_WINDOW_SIZE: usize = 4;
const PIVOT_VIEW_SIZE: usize = SEED_SIZE + ROUND_SIZE;
const TOTAL_SIZE: usize = SEED_SIZE + ROUND_SIZE + POSITION_WINDOW_SIZE;

/// A fixed-size hash pre-image of the form `seed || round || position_window`.
///
/// Re-used across rounds to avoid allocating on every hash.
pub struct HashBuf([u8; TOTAL_SIZE]);

impl HashBuf {
    /// Create a new buffer. The caller must ensure `seed.len() == SEED_SIZE`.
    pub fn new(seed: &[u8]) -> Self {
        let mut buf = [0; TOTAL_SIZE];
        buf[..SEED_SIZE].copy_from_slice(seed);
        Self(buf)
    }

    pub fn set_round(&mut self, round: u8) {
        self.0[SEED_SIZE] = round;
    }

    /// Returns the first 8 bytes of `hash(seed || round)` as a little-endian integer.
    pub fn raw_pivot(&self) -> u64 {
        let digest = hash_fixed(&self.0[..PIVOT_VIEW_SIZE]);
        let mut bytes = [0; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Returns `hash(seed || round || (position >> 8))`, the source of the swap bits for the 256
    /// positions sharing the same upper bits as `position`.
    pub fn source_for(&mut self, position: usize) -> [u8; 32] {
        let window = (position >> 8) as u32;
        self.0[PIVOT_VIEW_SIZE..].copy_from_slice(&window.to_le_bytes());
        hash_fixed(&self.0)
    }
}
