use std::sync::Arc;

use corebeam_primitives::{AttestationData, IndexedAttestation};
use hashbrown::{HashMap, HashSet};
use std::collections::VecDeque;
use tracing::debug;

use crate::config::SlashingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquivocationKind {
    DoubleVote,
    SurroundVote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttesterSlashingEvidence {
    pub kind: EquivocationKind,
    pub attestation_a: IndexedAttestation,
    pub attestation_b: IndexedAttestation,
    pub slashable_indices: Vec<u64>,
}

fn is_double_vote(a: &AttestationData, b: &AttestationData) -> bool {
    a.target.epoch == b.target.epoch && (a.target.root != b.target.root || a.source != b.source)
}

fn is_surround_vote(a: &AttestationData, b: &AttestationData) -> bool {
    (a.source.epoch < b.source.epoch && b.source.epoch < b.target.epoch && b.target.epoch < a.target.epoch)
        || (b.source.epoch < a.source.epoch
            && a.source.epoch < a.target.epoch
            && a.target.epoch < b.target.epoch)
}

fn classify(existing: &AttestationData, incoming: &AttestationData) -> Option<EquivocationKind> {
    if is_double_vote(existing, incoming) {
        Some(EquivocationKind::DoubleVote)
    } else if is_surround_vote(existing, incoming) {
        Some(EquivocationKind::SurroundVote)
    } else {
        None
    }
}

fn intersect(a: &[u64], b: &[u64]) -> Vec<u64> {
    let set: HashSet<u64> = a.iter().copied().collect();
    let mut out: Vec<u64> = b.iter().copied().filter(|i| set.contains(i)).collect();
    out.sort_unstable();
    out
}

type DedupKey = (EquivocationKind, u64, u64, u64, u64);

/// Detects double-votes and surround-votes by tracking, per validator, the
/// attestations they participated in within `history_window` epochs of the
/// current one.
#[derive(Debug, Default)]
pub struct AttesterSlashingDetector {
    config: SlashingConfig,
    history: HashMap<u64, Vec<Arc<IndexedAttestation>>>,
    seen: HashSet<DedupKey>,
    pool: VecDeque<AttesterSlashingEvidence>,
}

impl AttesterSlashingDetector {
    pub fn new(config: SlashingConfig) -> Self {
        Self { config, history: HashMap::new(), seen: HashSet::new(), pool: VecDeque::new() }
    }

    fn push_pool(&mut self, evidence: AttesterSlashingEvidence) {
        if self.pool.len() >= self.config.max_pool_entries {
            self.pool.pop_front();
        }
        self.pool.push_back(evidence);
    }

    /// Records `attestation` and returns any newly discovered, deduplicated
    /// evidence of double-voting or surround-voting against prior history.
    pub fn record(
        &mut self,
        attestation: IndexedAttestation,
        current_epoch: u64,
    ) -> Vec<AttesterSlashingEvidence> {
        let incoming = Arc::new(attestation);
        let window_start = current_epoch.saturating_sub(self.config.history_window);
        let mut new_evidence = Vec::new();

        for &validator in incoming.attesting_indices.iter() {
            let entry = self.history.entry(validator).or_default();
            entry.retain(|att| att.data.target.epoch >= window_start);

            for existing in entry.iter() {
                if let Some(kind) = classify(&existing.data, &incoming.data) {
                    let key = (kind, existing.data.source.epoch, existing.data.target.epoch, incoming.data.source.epoch, incoming.data.target.epoch);
                    if self.seen.insert(key) {
                        let slashable = intersect(&existing.attesting_indices, &incoming.attesting_indices);
                        let evidence = AttesterSlashingEvidence {
                            kind,
                            attestation_a: (**existing).clone(),
                            attestation_b: (*incoming).clone(),
                            slashable_indices: slashable,
                        };
                        debug!(validator, ?kind, "attester equivocation detected");
                        new_evidence.push(evidence.clone());
                        self.push_pool(evidence);
                    }
                }
            }
            entry.push(incoming.clone());
        }

        new_evidence
    }

    pub fn pool(&self) -> impl Iterator<Item = &AttesterSlashingEvidence> {
        self.pool.iter()
    }
}
