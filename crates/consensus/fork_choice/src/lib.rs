//! LMD-GHOST fork-choice store (design §4.6).

pub mod config;
pub mod errors;

use alloy_primitives::B256;
pub use config::ForkChoiceConfig;
use corebeam_primitives::checkpoint::Checkpoint;
pub use errors::ForkChoiceError;
use hashbrown::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone)]
struct BlockNode {
    parent_root: B256,
    #[allow(dead_code)]
    state_root: B256,
    slot: u64,
    justified_epoch: u64,
    finalized_epoch: u64,
    children: Vec<B256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LatestMessage {
    target_root: B256,
    target_epoch: u64,
    weight: u64,
}

#[derive(Debug, Clone)]
pub struct Store {
    nodes: HashMap<B256, BlockNode>,
    latest_messages: HashMap<u64, LatestMessage>,
    justified_checkpoint: Checkpoint,
    finalized_checkpoint: Checkpoint,
    best_justified: Checkpoint,
    current_slot: u64,
    slots_per_epoch: u64,
    genesis_root: Option<B256>,
    head_cache: Option<B256>,
}

impl Store {
    pub fn new(slots_per_epoch: u64, justified: Checkpoint, finalized: Checkpoint) -> Self {
        Self {
            nodes: HashMap::new(),
            latest_messages: HashMap::new(),
            justified_checkpoint: justified,
            finalized_checkpoint: finalized,
            best_justified: justified,
            current_slot: 0,
            slots_per_epoch,
            genesis_root: None,
            head_cache: None,
        }
    }

    pub fn from_config(config: ForkChoiceConfig) -> Self {
        Self::new(config.slots_per_epoch, config.justified_checkpoint, config.finalized_checkpoint)
    }

    pub fn justified_checkpoint(&self) -> Checkpoint {
        self.justified_checkpoint
    }

    pub fn finalized_checkpoint(&self) -> Checkpoint {
        self.finalized_checkpoint
    }

    pub fn best_justified(&self) -> Checkpoint {
        self.best_justified
    }

    pub fn contains_block(&self, root: B256) -> bool {
        self.nodes.contains_key(&root)
    }

    /// Inserts a block. The store's very first block requires no existing
    /// parent; every subsequent one does.
    pub fn on_block(
        &mut self,
        root: B256,
        parent_root: B256,
        state_root: B256,
        slot: u64,
        justified: Checkpoint,
        finalized: Checkpoint,
    ) -> Result<(), ForkChoiceError> {
        if self.nodes.contains_key(&root) {
            return Err(ForkChoiceError::DuplicateBlock(root));
        }

        let is_genesis = self.nodes.is_empty();
        if !is_genesis && !self.nodes.contains_key(&parent_root) {
            return Err(ForkChoiceError::UnknownParent(parent_root));
        }
        self.nodes.insert(
            root,
            BlockNode { parent_root, state_root, slot, justified_epoch: justified.epoch, finalized_epoch: finalized.epoch, children: Vec::new() },
        );

        if is_genesis {
            self.genesis_root = Some(root);
        } else {
            self.nodes.get_mut(&parent_root).expect("checked above").children.push(root);
        }

        self.current_slot = self.current_slot.max(slot);
        self.head_cache = None;

        if justified.epoch > self.best_justified.epoch {
            self.best_justified = justified;
        }

        debug!(%root, slot, "block inserted into fork choice store");
        Ok(())
    }

    /// Records `validator`'s newest attestation target. Rejects stale
    /// attestations (non-increasing target epoch) and attestations for an
    /// unknown target block.
    pub fn on_attestation(
        &mut self,
        validator: u64,
        target_root: B256,
        target_epoch: u64,
        weight: u64,
    ) -> Result<(), ForkChoiceError> {
        if !self.nodes.contains_key(&target_root) {
            return Err(ForkChoiceError::UnknownBlock(target_root));
        }
        if let Some(existing) = self.latest_messages.get(&validator) {
            if target_epoch <= existing.target_epoch {
                return Err(ForkChoiceError::StaleAttestation {
                    validator,
                    target_epoch,
                    existing_epoch: existing.target_epoch,
                });
            }
        }
        self.latest_messages.insert(validator, LatestMessage { target_root, target_epoch, weight });
        self.head_cache = None;
        Ok(())
    }

    /// Advances the store's notion of wall-clock slot. Must be strictly
    /// increasing; blocks may still arrive for slots at or below this once
    /// inserted via `on_block`, but the clock itself never rewinds.
    pub fn tick(&mut self, slot: u64) -> Result<(), ForkChoiceError> {
        if slot <= self.current_slot && !self.nodes.is_empty() {
            return Err(ForkChoiceError::SlotRegression { new_slot: slot, current_slot: self.current_slot });
        }
        self.current_slot = slot;
        Ok(())
    }

    pub fn current_slot(&self) -> u64 {
        self.current_slot
    }

    pub fn update_checkpoints(&mut self, justified: Checkpoint, finalized: Checkpoint) {
        if justified.epoch > self.justified_checkpoint.epoch {
            self.justified_checkpoint = justified;
            self.head_cache = None;
        }
        if finalized.epoch > self.finalized_checkpoint.epoch {
            self.finalized_checkpoint = finalized;
        }
    }

    fn is_descendant_or_self(&self, mut node: B256, ancestor: B256) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(&node) {
                Some(n) if n.parent_root != node => node = n.parent_root,
                _ => return false,
            }
        }
    }

    fn subtree_weight(&self, root: B256) -> u64 {
        self.latest_messages
            .values()
            .filter(|message| self.is_descendant_or_self(message.target_root, root))
            .map(|message| message.weight)
            .sum()
    }

    /// Greedily walks from the justified root (or the tree's genesis root
    /// if the justified root is not yet known) to the child with the
    /// greatest subtree weight at each step, tie-breaking on the
    /// lexicographically smaller root. Cached until the next mutation.
    pub fn get_head(&mut self) -> Result<B256, ForkChoiceError> {
        if let Some(cached) = self.head_cache {
            return Ok(cached);
        }
        let mut cur = if self.nodes.contains_key(&self.justified_checkpoint.root) {
            self.justified_checkpoint.root
        } else {
            self.genesis_root.ok_or(ForkChoiceError::EmptyStore)?
        };

        loop {
            let children = &self.nodes[&cur].children;
            if children.is_empty() {
                break;
            }
            let mut best: Option<(u64, B256)> = None;
            for &child in children {
                let weight = self.subtree_weight(child);
                best = match best {
                    None => Some((weight, child)),
                    Some((best_weight, best_root)) => {
                        if weight > best_weight || (weight == best_weight && child < best_root) {
                            Some((weight, child))
                        } else {
                            Some((best_weight, best_root))
                        }
                    }
                };
            }
            cur = best.expect("non-empty children").1;
        }

        self.head_cache = Some(cur);
        Ok(cur)
    }

    /// Retains only descendants (inclusive) of the finalized root and
    /// clears its parent pointer, per the pruning invariant.
    pub fn prune_before_finalized(&mut self) -> Result<(), ForkChoiceError> {
        let finalized_root = self.finalized_checkpoint.root;
        if !self.nodes.contains_key(&finalized_root) {
            return Err(ForkChoiceError::UnknownBlock(finalized_root));
        }

        let mut keep = HashSet::new();
        let mut stack = vec![finalized_root];
        while let Some(root) = stack.pop() {
            if keep.insert(root) {
                if let Some(node) = self.nodes.get(&root) {
                    stack.extend(node.children.iter().copied());
                }
            }
        }

        self.nodes.retain(|root, _| keep.contains(root));
        self.latest_messages.retain(|_, message| keep.contains(&message.target_root));
        if let Some(node) = self.nodes.get_mut(&finalized_root) {
            node.parent_root = B256::ZERO;
        }
        self.genesis_root = Some(finalized_root);
        self.head_cache = None;

        debug!(%finalized_root, retained = self.nodes.len(), "pruned fork choice store");
        Ok(())
    }

    pub fn slots_per_epoch(&self) -> u64 {
        self.slots_per_epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(byte: u8) -> B256 {
        B256::repeat_byte(byte)
    }

    fn fresh_store() -> Store {
        let genesis = Checkpoint::new(0, root(0));
        let mut store = Store::new(32, genesis, genesis);
        store.on_block(root(0), B256::ZERO, B256::ZERO, 0, genesis, genesis).unwrap();
        store
    }

    #[test]
    fn duplicate_block_is_rejected() {
        let mut store = fresh_store();
        let genesis = Checkpoint::new(0, root(0));
        let err = store.on_block(root(0), B256::ZERO, B256::ZERO, 0, genesis, genesis).unwrap_err();
        assert_eq!(err, ForkChoiceError::DuplicateBlock(root(0)));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut store = fresh_store();
        let genesis = Checkpoint::new(0, root(0));
        let err = store.on_block(root(1), root(9), B256::ZERO, 1, genesis, genesis).unwrap_err();
        assert_eq!(err, ForkChoiceError::UnknownParent(root(9)));
    }

    #[test]
    fn head_follows_heavier_branch() {
        let mut store = fresh_store();
        let genesis = Checkpoint::new(0, root(0));
        store.on_block(root(1), root(0), B256::ZERO, 1, genesis, genesis).unwrap();
        store.on_block(root(2), root(0), B256::ZERO, 1, genesis, genesis).unwrap();

        store.on_attestation(0, root(1), 1, 100).unwrap();
        store.on_attestation(1, root(2), 1, 10).unwrap();

        assert_eq!(store.get_head().unwrap(), root(1));
    }

    #[test]
    fn tie_breaks_on_lexicographically_smaller_root() {
        let mut store = fresh_store();
        let genesis = Checkpoint::new(0, root(0));
        store.on_block(root(0x10), root(0), B256::ZERO, 1, genesis, genesis).unwrap();
        store.on_block(root(0x20), root(0), B256::ZERO, 1, genesis, genesis).unwrap();

        assert_eq!(store.get_head().unwrap(), root(0x10));
    }

    #[test]
    fn stale_attestation_is_rejected() {
        let mut store = fresh_store();
        store.on_attestation(0, root(0), 2, 50).unwrap();
        let err = store.on_attestation(0, root(0), 1, 50).unwrap_err();
        assert_eq!(
            err,
            ForkChoiceError::StaleAttestation { validator: 0, target_epoch: 1, existing_epoch: 2 }
        );
    }

    #[test]
    fn prune_keeps_only_descendants_of_finalized_root() {
        let mut store = fresh_store();
        let genesis = Checkpoint::new(0, root(0));
        store.on_block(root(1), root(0), B256::ZERO, 1, genesis, genesis).unwrap();
        store.on_block(root(2), root(1), B256::ZERO, 2, genesis, genesis).unwrap();
        store.on_block(root(3), root(0), B256::ZERO, 1, genesis, genesis).unwrap();

        store.update_checkpoints(genesis, Checkpoint::new(1, root(1)));
        store.prune_before_finalized().unwrap();

        assert!(store.contains_block(root(1)));
        assert!(store.contains_block(root(2)));
        assert!(!store.contains_block(root(3)));
    }

    #[test]
    fn tick_rejects_non_increasing_slots() {
        let mut store = fresh_store();
        store.tick(5).unwrap();
        let err = store.tick(5).unwrap_err();
        assert_eq!(err, ForkChoiceError::SlotRegression { new_slot: 5, current_slot: 5 });
    }

    #[test]
    fn empty_store_has_no_head() {
        let genesis = Checkpoint::new(0, B256::ZERO);
        let mut store = Store::new(32, genesis, genesis);
        assert_eq!(store.get_head().unwrap_err(), ForkChoiceError::EmptyStore);
    }
}
