use crate::hash_buf::HashBuf;
use crate::is_shuffleable;
use std::cmp::max;

/// Return `p(index)` in a pseudorandom permutation `p` of `0...list_size-1` with ``seed`` as entropy.
///
/// Utilizes 'swap or not' shuffling found in
/// https://link.springer.com/content/pdf/10.1007%2F978-3-642-32009-5_1.pdf
/// See the 'generalized domain' algorithm on page 3.
///
/// Returns `None` under any of the following conditions:
///  - `list_size == 0`
///  - `index >= list_size`
///  - `list_size > 2**24`
///  - `list_size > usize::MAX / 2`
///  - `seed.len() != 32`
///  - `shuffle_round_count == 0`
pub fn compute_shuffled_index(
    index: usize,
    list_size: usize,
    seed: &[u8],
    shuffle_round_count: u8,
) -> Option<usize> {
    if !is_shuffleable(list_size, seed, shuffle_round_count) || index >= list_size {
        return None;
    }

    let mut index = index;
    let mut buf = HashBuf::new(seed);

    for round in 0..shuffle_round_count {
        buf.set_round(round);
        let pivot = buf.raw_pivot() as usize % list_size;
        index = do_round(&mut buf, pivot, index, list_size);
    }

    Some(index)
}

fn do_round(buf: &mut HashBuf, pivot: usize, index: usize, list_size: usize) -> usize {
    let flip = (pivot + (list_size - index)) % list_size;
    let position = max(index, flip);
    let source = buf.source_for(position);
    let byte = source[(position % 256) / 8];
    let bit = (byte >> (position % 8)) % 2;

    if bit == 1 {
        flip
    } else {
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; 32] = [42; 32];

    #[test]
    fn returns_none_for_zero_length_list() {
        assert_eq!(None, compute_shuffled_index(100, 0, &SEED, 90));
    }

    #[test]
    fn returns_none_for_out_of_bounds_index() {
        assert_eq!(None, compute_shuffled_index(100, 100, &SEED, 90));
    }

    #[test]
    fn returns_none_for_too_large_list() {
        assert_eq!(
            None,
            compute_shuffled_index(100, crate::MAX_LIST_SIZE + 1, &SEED, 90)
        );
    }

    #[test]
    fn returns_none_for_short_seed() {
        assert_eq!(None, compute_shuffled_index(1, 10, &[42; 31], 90));
    }

    #[test]
    fn single_element_list_is_fixed() {
        assert_eq!(Some(0), compute_shuffled_index(0, 1, &SEED, 90));
    }

    #[test]
    fn produces_a_permutation() {
        let list_size = 311;
        let mut seen = vec![false; list_size];

        for i in 0..list_size {
            let shuffled = compute_shuffled_index(i, list_size, &SEED, 10).unwrap();
            assert!(!seen[shuffled], "index {} produced twice", shuffled);
            seen[shuffled] = true;
        }

        assert!(seen.iter().all(|s| *s));
    }
}
