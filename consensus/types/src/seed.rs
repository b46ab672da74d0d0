use crate::{BeaconStateError as Error, ChainSpec, Epoch, Hash256};
use ethereum_hashing::hash_fixed;

const NUM_DOMAIN_BYTES: usize = 1;
const NUM_EPOCH_BYTES: usize = 8;
const MIX_OFFSET: usize = NUM_DOMAIN_BYTES + NUM_EPOCH_BYTES;
pub const NUM_MIX_BYTES: usize = 32;

/// Returns the epoch whose RANDAO mix feeds the seed for `epoch`.
///
/// This is `epoch - min_seed_lookahead - 1`, clamped to the genesis epoch.
pub fn seed_lookback_epoch(epoch: Epoch, spec: &ChainSpec) -> Epoch {
    std::cmp::max(
        epoch
            .saturating_sub(spec.min_seed_lookahead)
            .saturating_sub(1u64),
        spec.genesis_epoch,
    )
}

/// Derives the seed for `epoch` from a `mix` read at `seed_lookback_epoch(epoch)`.
///
/// The pre-image is `domain_tag || epoch (little-endian) || mix`.
pub fn derive_seed(epoch: Epoch, domain_tag: u8, mix: &[u8]) -> Result<Hash256, Error> {
    if mix.len() != NUM_MIX_BYTES {
        return Err(Error::InvalidSeedLength(mix.len()));
    }

    let mut preimage = [0; NUM_DOMAIN_BYTES + NUM_EPOCH_BYTES + NUM_MIX_BYTES];
    preimage[0] = domain_tag;
    preimage[NUM_DOMAIN_BYTES..MIX_OFFSET].copy_from_slice(&epoch.as_u64().to_le_bytes());
    preimage[MIX_OFFSET..].copy_from_slice(mix);

    Ok(Hash256::from(hash_fixed(&preimage)))
}
