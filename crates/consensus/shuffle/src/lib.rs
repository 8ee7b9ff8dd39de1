//! Swap-or-not index shuffling (design §4.3).
//!
//! `shuffle_index` computes the shuffled position of a single index in
//! `O(rounds)` time and `O(1)` space; `compute_committee` slices a
//! contiguous range of the permutation to form a committee without
//! materializing the whole shuffle.

pub mod errors;

use std::cmp::max;

use alloy_primitives::B256;
pub use errors::ShuffleError;

pub const SHUFFLE_ROUND_COUNT: u8 = 90;

fn bytes_to_u64(slice: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    let len = slice.len().min(8);
    bytes[..len].copy_from_slice(&slice[..len]);
    u64::from_le_bytes(bytes)
}

/// Computes `shuffle(index, count, seed)`: the position `index` maps to
/// under the swap-or-not permutation keyed by `seed`.
pub fn shuffle_index(index: u64, count: u64, seed: B256) -> Result<u64, ShuffleError> {
    if count == 0 {
        return Err(ShuffleError::ZeroCount);
    }
    if index >= count {
        return Err(ShuffleError::IndexOutOfBounds { index, count });
    }
    if count == 1 {
        return Ok(0);
    }

    let mut cur = index;
    for round in 0..SHUFFLE_ROUND_COUNT {
        let seed_with_round = [seed.as_slice(), &[round]].concat();
        let pivot = bytes_to_u64(&ethereum_hashing::hash_fixed(&seed_with_round)) % count;

        let flip = (pivot + (count - cur)) % count;
        let pos = max(cur, flip);

        let seed_with_position =
            [seed_with_round.as_slice(), &(pos / 256).to_le_bytes()[0..4]].concat();
        let source = ethereum_hashing::hash_fixed(&seed_with_position);
        let byte = source[((pos % 256) / 8) as usize];
        let bit = (byte >> (pos % 8)) & 1;

        if bit == 1 {
            cur = flip;
        }
    }

    Ok(cur)
}

/// Returns `indices[shuffle(i)]` for `i` in `[start, end)`, where `start`
/// and `end` are the contiguous slice of the shuffled permutation assigned
/// to one committee out of `total_committees` over `indices`.
pub fn compute_committee(
    indices: &[u64],
    seed: B256,
    committee_global_index: u64,
    total_committees: u64,
) -> Result<Vec<u64>, ShuffleError> {
    let count = indices.len() as u64;
    let start = (count * committee_global_index) / total_committees;
    let end = (count * (committee_global_index + 1)) / total_committees;

    (start..end)
        .map(|i| {
            let shuffled = shuffle_index(i, count, seed)?;
            Ok(indices[shuffled as usize])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;

    #[test]
    fn zero_count_errors() {
        assert_eq!(shuffle_index(0, 0, B256::ZERO), Err(ShuffleError::ZeroCount));
    }

    #[test]
    fn single_element_is_identity() {
        assert_eq!(shuffle_index(0, 1, B256::repeat_byte(9)).unwrap(), 0);
    }

    #[test]
    fn index_out_of_bounds_errors() {
        assert_eq!(
            shuffle_index(5, 5, B256::ZERO),
            Err(ShuffleError::IndexOutOfBounds { index: 5, count: 5 })
        );
    }

    #[rstest]
    #[case(8)]
    #[case(37)]
    #[case(128)]
    fn shuffle_is_a_permutation(#[case] count: u64) {
        let seed = B256::repeat_byte(0x42);
        let mut seen = HashSet::new();
        for i in 0..count {
            let shuffled = shuffle_index(i, count, seed).unwrap();
            assert!(shuffled < count);
            assert!(seen.insert(shuffled), "duplicate shuffled position for count={count}");
        }
    }

    #[test]
    fn shuffle_is_deterministic_for_fixed_seed() {
        let seed = B256::repeat_byte(0x7);
        assert_eq!(shuffle_index(3, 50, seed).unwrap(), shuffle_index(3, 50, seed).unwrap());
    }

    #[test]
    fn different_seeds_usually_diverge() {
        let a = shuffle_index(10, 200, B256::repeat_byte(1)).unwrap();
        let b = shuffle_index(10, 200, B256::repeat_byte(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn compute_committee_partitions_indices_without_overlap() {
        let indices: Vec<u64> = (0..100).collect();
        let seed = B256::repeat_byte(0x11);
        let total_committees = 4;

        let mut all = HashSet::new();
        for global_index in 0..total_committees {
            let committee = compute_committee(&indices, seed, global_index, total_committees).unwrap();
            for member in committee {
                assert!(all.insert(member), "validator assigned to more than one committee");
            }
        }
        assert_eq!(all.len(), indices.len());
    }
}
