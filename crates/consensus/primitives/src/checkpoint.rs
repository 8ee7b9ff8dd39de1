use std::cmp::Ordering;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// A block root paired with the epoch at which it was justified or
/// finalized. Two checkpoints are equal iff both fields match, but they are
/// *ordered* by epoch alone — two checkpoints at the same epoch with
/// different roots compare equal under `Ord` even though they are not equal
/// under `Eq`. This is why `Ord` is implemented by hand instead of derived.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode, TreeHash,
)]
pub struct Checkpoint {
    pub epoch: u64,
    pub root: B256,
}

impl Checkpoint {
    pub const fn new(epoch: u64, root: B256) -> Self {
        Self { epoch, root }
    }
}

impl PartialOrd for Checkpoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Checkpoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch.cmp(&other.epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_by_epoch_only() {
        let a = Checkpoint::new(1, B256::repeat_byte(0xff));
        let b = Checkpoint::new(2, B256::ZERO);
        assert!(a < b);
    }

    #[test]
    fn equality_requires_both_fields_but_ordering_ignores_root() {
        let a = Checkpoint::new(1, B256::repeat_byte(1));
        let b = Checkpoint::new(1, B256::repeat_byte(2));
        assert_ne!(a, b);
        assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
    }
}
