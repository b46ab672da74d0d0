//! Provides list-shuffling functions matching the beacon chain "swap-or-not" shuffle.
//!
//! There are two functions exported by this crate:
//!
//! - `compute_shuffled_index`: given a single index, computes the index resulting from a shuffle.
//! Runs in less time than it takes to run `shuffle_list`.
//! - `shuffle_list`: shuffles an entire list in-place. Runs in less time than it takes to run
//! `compute_shuffled_index` on each index.
//!
//! In general, use `compute_shuffled_index` to calculate the shuffling of a small subset of a much
//! larger list (~250x larger is a good guide, but solid figures yet to be calculated).
//!
//! Both functions are pure: the result depends only on the list, the seed and the round count.

mod compute_shuffled_index;
mod hash_buf;
mod shuffle_list;

pub use compute_shuffled_index::compute_shuffled_index;
pub use shuffle_list::shuffle_list;

/// The length in bytes of a shuffling seed.
pub const SEED_SIZE: usize = 32;

/// Lists longer than this cannot be shuffled, since positions are mixed into the hash pre-image as
/// `u32` values after being shifted right by 8 bits.
pub const MAX_LIST_SIZE: usize = 1 << 24;

/// Returns `true` if a list of `list_size` can be shuffled with `seed` over `rounds` rounds.
fn is_shuffleable(list_size: usize, seed: &[u8], rounds: u8) -> bool {
    list_size > 0
        && list_size <= MAX_LIST_SIZE
        && list_size <= usize::MAX / 2
        && seed.len() == SEED_SIZE
        && rounds > 0
}
