//! Committee and proposer assignment (design §4.5).
//!
//! Given an epoch's sorted active index set and a RANDAO-derived seed, this
//! crate slices the swap-or-not permutation into beacon committees, samples
//! a proposer per slot weighted by effective balance, and assigns a sync
//! committee per sync period. Results are memoized: once computed for an
//! epoch or sync period, they never change underneath a caller until
//! `clear_caches` is called explicitly.

pub mod config;
pub mod errors;

use std::sync::Arc;

use alloy_primitives::B256;
pub use config::CommitteeConfig;
use corebeam_shuffle::shuffle_index;
pub use errors::CommitteeError;
use hashbrown::HashMap;
use tracing::debug;

/// Proposer-selection rejection sampling is bounded: beyond this many
/// candidates we give up and fall back to the first shuffled candidate
/// rather than loop forever on a pathological balance distribution.
const PROPOSER_SELECTION_SAFETY_CAP: usize = 1 << 16;

#[derive(Debug, Clone)]
pub struct EpochCommittees {
    pub committees_per_slot: u64,
    committees: Vec<Vec<u64>>,
    proposers: Vec<u64>,
}

impl EpochCommittees {
    pub fn committee(&self, slot_offset: u64, committee_index: u64) -> Result<&[u64], CommitteeError> {
        if committee_index >= self.committees_per_slot {
            return Err(CommitteeError::CommitteeIndexOutOfRange {
                index: committee_index,
                committees_per_slot: self.committees_per_slot,
            });
        }
        let global_index = slot_offset * self.committees_per_slot + committee_index;
        Ok(&self.committees[global_index as usize])
    }

    pub fn proposer(&self, slot_offset: u64) -> u64 {
        self.proposers[slot_offset as usize]
    }
}

fn hash_concat(parts: &[&[u8]]) -> B256 {
    let mut preimage = Vec::new();
    for part in parts {
        preimage.extend_from_slice(part);
    }
    B256::from(ethereum_hashing::hash_fixed(&preimage))
}

/// Samples a proposer from `indices` (already permuted by `shuffle_index`
/// under `seed`), weighted by effective balance: candidate `c` is accepted
/// when `effective_balance(c) * 255 >= max_effective_balance * byte`.
fn compute_proposer_index(
    indices: &[u64],
    seed: B256,
    max_effective_balance: u64,
    effective_balance: &impl Fn(u64) -> u64,
) -> Result<u64, CommitteeError> {
    if indices.is_empty() {
        return Err(CommitteeError::EmptyActiveSet);
    }
    let total = indices.len() as u64;

    for i in 0..PROPOSER_SELECTION_SAFETY_CAP as u64 {
        let shuffled = shuffle_index(i % total, total, seed)?;
        let candidate = indices[shuffled as usize];

        let source = hash_concat(&[seed.as_slice(), &(i / 32).to_le_bytes()]);
        let byte = source[(i % 32) as usize];

        if effective_balance(candidate) * 255 >= max_effective_balance * byte as u64 {
            return Ok(candidate);
        }
    }

    let fallback = shuffle_index(0, total, seed)?;
    Ok(indices[fallback as usize])
}

#[derive(Debug, Default)]
pub struct CommitteeAssigner {
    config: CommitteeConfig,
    epochs: HashMap<u64, Arc<EpochCommittees>>,
    sync_periods: HashMap<u64, Arc<Vec<u64>>>,
}

impl CommitteeAssigner {
    pub fn new(config: CommitteeConfig) -> Self {
        Self { config, epochs: HashMap::new(), sync_periods: HashMap::new() }
    }

    pub fn clear_caches(&mut self) {
        self.epochs.clear();
        self.sync_periods.clear();
    }

    /// Computes (or returns the memoized) committee assignment for `epoch`.
    pub fn compute_epoch(
        &mut self,
        epoch: u64,
        active_indices: &[u64],
        seed: B256,
        effective_balance: impl Fn(u64) -> u64,
    ) -> Result<Arc<EpochCommittees>, CommitteeError> {
        if let Some(cached) = self.epochs.get(&epoch) {
            return Ok(cached.clone());
        }
        if active_indices.is_empty() {
            return Err(CommitteeError::EmptyActiveSet);
        }

        let count = active_indices.len() as u64;
        let committees_per_slot = (count / self.config.slots_per_epoch / self.config.target_committee_size)
            .clamp(1, self.config.max_committees_per_slot);
        let total_committees = committees_per_slot * self.config.slots_per_epoch;

        let mut committees = Vec::with_capacity(total_committees as usize);
        for global_index in 0..total_committees {
            committees.push(corebeam_shuffle::compute_committee(
                active_indices,
                seed,
                global_index,
                total_committees,
            )?);
        }

        let mut proposers = Vec::with_capacity(self.config.slots_per_epoch as usize);
        for slot_offset in 0..self.config.slots_per_epoch {
            let per_slot_seed = hash_concat(&[seed.as_slice(), &slot_offset.to_le_bytes()]);
            proposers.push(compute_proposer_index(
                active_indices,
                per_slot_seed,
                self.config.max_effective_balance,
                &effective_balance,
            )?);
        }

        let computed = Arc::new(EpochCommittees { committees_per_slot, committees, proposers });
        self.epochs.insert(epoch, computed.clone());
        debug!(epoch, committees_per_slot, "computed epoch committees");
        Ok(computed)
    }

    pub fn epoch_committees(&self, epoch: u64) -> Result<Arc<EpochCommittees>, CommitteeError> {
        self.epochs.get(&epoch).cloned().ok_or(CommitteeError::EpochNotCached(epoch))
    }

    /// Computes (or returns the memoized) sync committee for `period`, by
    /// repeatedly drawing balance-weighted candidates with replacement
    /// until `sync_committee_size` members have been picked.
    pub fn compute_sync_committee(
        &mut self,
        period: u64,
        active_indices: &[u64],
        seed: B256,
        effective_balance: impl Fn(u64) -> u64,
    ) -> Result<Arc<Vec<u64>>, CommitteeError> {
        if let Some(cached) = self.sync_periods.get(&period) {
            return Ok(cached.clone());
        }
        if active_indices.is_empty() {
            return Err(CommitteeError::EmptyActiveSet);
        }

        let total = active_indices.len() as u64;
        let mut members = Vec::with_capacity(self.config.sync_committee_size as usize);
        let mut i = 0u64;
        while (members.len() as u64) < self.config.sync_committee_size {
            let shuffled = shuffle_index(i % total, total, seed)?;
            let candidate = active_indices[shuffled as usize];

            let source = hash_concat(&[seed.as_slice(), &(i / 32).to_le_bytes()]);
            let byte = source[(i % 32) as usize];

            if effective_balance(candidate) * 255 >= self.config.max_effective_balance * byte as u64 {
                members.push(candidate);
            }
            i += 1;
        }

        let computed = Arc::new(members);
        self.sync_periods.insert(period, computed.clone());
        Ok(computed)
    }

    pub fn sync_committee(&self, period: u64) -> Result<Arc<Vec<u64>>, CommitteeError> {
        self.sync_periods.get(&period).cloned().ok_or(CommitteeError::SyncPeriodNotCached(period))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn uniform_balance(_: u64) -> u64 {
        32_000_000_000
    }

    #[test]
    fn compute_epoch_partitions_active_indices() {
        let mut assigner = CommitteeAssigner::new(CommitteeConfig {
            slots_per_epoch: 4,
            target_committee_size: 2,
            max_committees_per_slot: 4,
            sync_committee_size: 8,
            epochs_per_sync_period: 16,
            max_effective_balance: 32_000_000_000,
        });
        let active: Vec<u64> = (0..64).collect();
        let committees = assigner.compute_epoch(0, &active, B256::repeat_byte(3), uniform_balance).unwrap();

        let mut seen = HashSet::new();
        for slot_offset in 0..4 {
            for committee_index in 0..committees.committees_per_slot {
                for member in committees.committee(slot_offset, committee_index).unwrap() {
                    assert!(seen.insert(*member));
                }
            }
        }
        assert_eq!(seen.len(), active.len());
    }

    #[test]
    fn repeated_compute_epoch_returns_the_cached_value() {
        let mut assigner = CommitteeAssigner::new(CommitteeConfig::default());
        let active: Vec<u64> = (0..500).collect();
        let first = assigner.compute_epoch(7, &active, B256::repeat_byte(1), uniform_balance).unwrap();
        let second = assigner.compute_epoch(7, &[], B256::ZERO, uniform_balance).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn clear_caches_forgets_previous_results() {
        let mut assigner = CommitteeAssigner::new(CommitteeConfig::default());
        let active: Vec<u64> = (0..500).collect();
        assigner.compute_epoch(7, &active, B256::repeat_byte(1), uniform_balance).unwrap();
        assigner.clear_caches();
        assert!(matches!(assigner.epoch_committees(7), Err(CommitteeError::EpochNotCached(7))));
    }

    #[test]
    fn sync_committee_has_the_configured_size() {
        let mut assigner = CommitteeAssigner::new(CommitteeConfig::default());
        let active: Vec<u64> = (0..2000).collect();
        let sync = assigner.compute_sync_committee(0, &active, B256::repeat_byte(9), uniform_balance).unwrap();
        assert_eq!(sync.len(), assigner.config.sync_committee_size as usize);
    }

    #[test]
    fn empty_active_set_errors() {
        let mut assigner = CommitteeAssigner::new(CommitteeConfig::default());
        assert!(matches!(
            assigner.compute_epoch(0, &[], B256::ZERO, uniform_balance),
            Err(CommitteeError::EmptyActiveSet)
        ));
    }
}
