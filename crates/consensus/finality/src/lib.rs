//! Per-slot weighted finality voting (design §4.7).

pub mod config;
pub mod errors;

use alloy_primitives::B256;
pub use config::FinalityConfig;
use corebeam_primitives::encode_bitfield;
pub use errors::FinalityError;
use hashbrown::HashMap;
use tracing::info;

#[derive(Debug, Clone)]
struct Round {
    proposed_at_ms: u64,
    votes: HashMap<u64, B256>,
    stake_by_root: HashMap<B256, u64>,
    finalized: bool,
    final_root: Option<B256>,
    finalized_at_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizationOutcome {
    pub slot: u64,
    pub final_root: B256,
    pub finalized_at_ms: u64,
}

#[derive(Debug)]
pub struct FinalityEngine {
    config: FinalityConfig,
    rounds: HashMap<u64, Round>,
    latest_finalized_slot: u64,
    latencies_ms: Vec<u64>,
}

impl FinalityEngine {
    pub fn new(config: FinalityConfig) -> Self {
        Self { config, rounds: HashMap::new(), latest_finalized_slot: 0, latencies_ms: Vec::new() }
    }

    pub fn config(&self) -> FinalityConfig {
        self.config
    }

    pub fn latest_finalized_slot(&self) -> u64 {
        self.latest_finalized_slot
    }

    /// Opens a round for `slot` if none exists. Idempotent once the round
    /// is open and not yet finalized.
    pub fn propose(
        &mut self,
        slot: u64,
        block_root: B256,
        proposed_at_ms: u64,
        execution_valid: bool,
    ) -> Result<(), FinalityError> {
        if !execution_valid {
            return Err(FinalityError::InvalidExecution);
        }
        if let Some(round) = self.rounds.get(&slot) {
            if round.finalized {
                return Err(FinalityError::SlotAlreadyFinalized(slot));
            }
            return Ok(());
        }
        self.rounds.insert(
            slot,
            Round {
                proposed_at_ms,
                votes: HashMap::new(),
                stake_by_root: {
                    let mut map = HashMap::new();
                    map.insert(block_root, 0);
                    map
                },
                finalized: false,
                final_root: None,
                finalized_at_ms: None,
            },
        );
        Ok(())
    }

    /// Records `validator`'s vote for `block_root` in `slot`'s round,
    /// weighted by `stake`. Returns `Some(outcome)` the moment a root
    /// crosses the configured supermajority threshold of `total_stake`.
    pub fn receive_vote(
        &mut self,
        slot: u64,
        validator: u64,
        block_root: B256,
        stake: u64,
        total_stake: u64,
        now_ms: u64,
    ) -> Result<Option<FinalizationOutcome>, FinalityError> {
        let round = self.rounds.get_mut(&slot).ok_or(FinalityError::UnknownRound(slot))?;
        if round.finalized {
            return Err(FinalityError::SlotAlreadyFinalized(slot));
        }
        if round.votes.contains_key(&validator) {
            return Err(FinalityError::DuplicateVote(validator));
        }

        round.votes.insert(validator, block_root);
        *round.stake_by_root.entry(block_root).or_insert(0) += stake;

        let threshold = self.config.threshold(total_stake);
        let accumulated = round.stake_by_root[&block_root];
        if accumulated < threshold {
            return Ok(None);
        }

        round.finalized = true;
        round.final_root = Some(block_root);
        round.finalized_at_ms = Some(now_ms);

        let latency = now_ms.saturating_sub(round.proposed_at_ms);
        self.latencies_ms.push(latency);
        self.latest_finalized_slot = self.latest_finalized_slot.max(slot);

        info!(slot, %block_root, latency, "slot finalized");
        Ok(Some(FinalizationOutcome { slot, final_root: block_root, finalized_at_ms: now_ms }))
    }

    /// Participant bitfield for `slot`'s (finalized or in-flight) round,
    /// over validators voting for the leading root.
    pub fn participant_bitfield(&self, slot: u64, max_validator_index: u64) -> Option<Vec<u8>> {
        let round = self.rounds.get(&slot)?;
        let target = round.final_root.or_else(|| {
            round.stake_by_root.iter().max_by_key(|(_, stake)| **stake).map(|(root, _)| *root)
        })?;
        let participants: Vec<u64> =
            round.votes.iter().filter(|(_, root)| **root == target).map(|(validator, _)| *validator).collect();
        Some(encode_bitfield(&participants, max_validator_index))
    }

    pub fn average_latency_ms(&self) -> Option<f64> {
        if self.latencies_ms.is_empty() {
            return None;
        }
        Some(self.latencies_ms.iter().sum::<u64>() as f64 / self.latencies_ms.len() as f64)
    }

    pub fn p95_latency_ms(&self) -> Option<u64> {
        if self.latencies_ms.is_empty() {
            return None;
        }
        let mut sorted = self.latencies_ms.clone();
        sorted.sort_unstable();
        let index = ((sorted.len() as f64) * 0.95).ceil() as usize;
        Some(sorted[index.saturating_sub(1).min(sorted.len() - 1)])
    }

    /// Drops rounds older than `retain_rounds` epochs behind the latest
    /// finalized slot.
    pub fn prune(&mut self, slots_per_epoch: u64) {
        let retain_slots = self.config.retain_rounds * slots_per_epoch;
        let cutoff = self.latest_finalized_slot.saturating_sub(retain_slots);
        self.rounds.retain(|&slot, _| slot >= cutoff);
    }
}
