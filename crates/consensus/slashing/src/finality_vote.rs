use alloy_primitives::B256;
use corebeam_bls::Signature;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalityVoteEvidence {
    pub slot: u64,
    pub validator: u64,
    pub root_a: B256,
    pub signature_a: Signature,
    pub root_b: B256,
    pub signature_b: Signature,
}

#[derive(Debug, Clone)]
struct FirstVote {
    block_root: B256,
    signature: Signature,
}

/// Tracks the first finality vote seen per `(slot, validator)`; a second
/// vote for a different root is an equivocation.
#[derive(Debug, Default)]
pub struct FinalityEquivocationDetector {
    first_votes: HashMap<(u64, u64), FirstVote>,
}

impl FinalityEquivocationDetector {
    pub fn new() -> Self {
        Self { first_votes: HashMap::new() }
    }

    pub fn record(
        &mut self,
        slot: u64,
        validator: u64,
        block_root: B256,
        signature: Signature,
    ) -> Option<FinalityVoteEvidence> {
        match self.first_votes.entry((slot, validator)) {
            Entry::Vacant(entry) => {
                entry.insert(FirstVote { block_root, signature });
                None
            }
            Entry::Occupied(entry) => {
                let first = entry.get();
                if first.block_root == block_root {
                    None
                } else {
                    Some(FinalityVoteEvidence {
                        slot,
                        validator,
                        root_a: first.block_root,
                        signature_a: first.signature.clone(),
                        root_b: block_root,
                        signature_b: signature,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_vote_is_recorded_without_evidence() {
        let mut detector = FinalityEquivocationDetector::new();
        let evidence = detector.record(1, 0, B256::repeat_byte(1), Signature::infinity());
        assert!(evidence.is_none());
    }

    #[test]
    fn conflicting_second_vote_is_evidence() {
        let mut detector = FinalityEquivocationDetector::new();
        detector.record(1, 0, B256::repeat_byte(1), Signature::infinity());
        let evidence = detector.record(1, 0, B256::repeat_byte(2), Signature::infinity()).unwrap();
        assert_eq!(evidence.root_a, B256::repeat_byte(1));
        assert_eq!(evidence.root_b, B256::repeat_byte(2));
    }

    #[test]
    fn repeating_the_same_vote_is_not_equivocation() {
        let mut detector = FinalityEquivocationDetector::new();
        detector.record(1, 0, B256::repeat_byte(1), Signature::infinity());
        let evidence = detector.record(1, 0, B256::repeat_byte(1), Signature::infinity());
        assert!(evidence.is_none());
    }
}
