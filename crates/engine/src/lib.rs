//! Top-level orchestrator wiring every component behind its own lock
//! (design §5).

pub mod config;
pub mod errors;
pub mod slashing;

use std::sync::Arc;

use alloy_primitives::B256;
pub use config::EngineConfig;
use corebeam_batch_verify::{BatchVerificationResult, BatchVerifier};
use corebeam_bls::{PublicKey, Signature};
use corebeam_committee::{CommitteeAssigner, EpochCommittees};
pub use errors::EngineError;
use corebeam_finality::{FinalityEngine, FinalizationOutcome};
use corebeam_fork_choice::Store;
use corebeam_primitives::{Checkpoint, IndexedAttestation};
use corebeam_randao::RandaoMixRing;
use corebeam_registry::{Registry, SlashingOutcome, Validator};
pub use slashing::SlashingDetectors;
use corebeam_sync::rwlock::{Reader, Writer};
use hashbrown::HashMap;
use tracing::info;

/// Wires the validator registry, fork-choice store, finality engine,
/// slashing detectors, batch verifier, RANDAO manager and committee cache
/// behind their own readers-writer locks. No method here ever holds two
/// locks at once: cross-component data flows as owned values or indices.
pub struct Engine {
    registry: Writer<Registry>,
    fork_choice: Writer<Store>,
    finality: Writer<FinalityEngine>,
    slashing: Writer<SlashingDetectors>,
    batch_verifier: Writer<BatchVerifier>,
    randao: Writer<RandaoMixRing>,
    committee: Writer<CommitteeAssigner>,
    fork_version: [u8; 4],
    genesis_validators_root: B256,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let (registry, _) = Writer::new(Registry::new(config.registry));
        let (fork_choice, _) = Writer::new(Store::from_config(config.fork_choice));
        let (finality, _) = Writer::new(FinalityEngine::new(config.finality));
        let (slashing, _) = Writer::new(SlashingDetectors::new(config.slashing));
        let (batch_verifier, _) = Writer::new(BatchVerifier::new(config.batch_verifier));
        let (randao, _) = Writer::new(RandaoMixRing::new(config.randao_ring_size, config.genesis_seed));
        let (committee, _) = Writer::new(CommitteeAssigner::new(config.committee));

        info!("engine initialized");
        Self {
            registry,
            fork_choice,
            finality,
            slashing,
            batch_verifier,
            randao,
            committee,
            fork_version: config.fork_version,
            genesis_validators_root: config.genesis_validators_root,
        }
    }

    pub fn registry_reader(&self) -> Reader<Registry> {
        self.registry.reader()
    }

    /// Registers a validator at genesis or deposit time. Returns its index.
    pub fn push_validator(&self, validator: Validator, balance: u64) -> u64 {
        self.registry.write().push(validator, balance)
    }

    pub fn fork_choice_reader(&self) -> Reader<Store> {
        self.fork_choice.reader()
    }

    pub fn finality_reader(&self) -> Reader<FinalityEngine> {
        self.finality.reader()
    }

    pub fn randao_reader(&self) -> Reader<RandaoMixRing> {
        self.randao.reader()
    }

    pub fn committee_reader(&self) -> Reader<CommitteeAssigner> {
        self.committee.reader()
    }

    pub fn insert_block(
        &self,
        root: B256,
        parent_root: B256,
        state_root: B256,
        slot: u64,
        justified: Checkpoint,
        finalized: Checkpoint,
    ) -> Result<(), EngineError> {
        self.fork_choice.write().on_block(root, parent_root, state_root, slot, justified, finalized)?;
        Ok(())
    }

    pub fn vote_for_fork_choice(
        &self,
        validator: u64,
        target_root: B256,
        target_epoch: u64,
        weight: u64,
    ) -> Result<(), EngineError> {
        self.fork_choice.write().on_attestation(validator, target_root, target_epoch, weight)?;
        Ok(())
    }

    pub fn head(&self) -> Result<B256, EngineError> {
        Ok(self.fork_choice.write().get_head()?)
    }

    pub fn propose_finality_round(
        &self,
        slot: u64,
        block_root: B256,
        proposed_at_ms: u64,
        execution_valid: bool,
    ) -> Result<(), EngineError> {
        self.finality.write().propose(slot, block_root, proposed_at_ms, execution_valid)?;
        Ok(())
    }

    pub fn receive_finality_vote(
        &self,
        slot: u64,
        validator: u64,
        block_root: B256,
        stake: u64,
        total_stake: u64,
        now_ms: u64,
    ) -> Result<Option<FinalizationOutcome>, EngineError> {
        Ok(self.finality.write().receive_vote(slot, validator, block_root, stake, total_stake, now_ms)?)
    }

    /// Runs the attester-equivocation detector over `attestation` and, for
    /// every implicated validator in any newly discovered evidence, applies
    /// the slashing penalty in the registry. The slashing lock is released
    /// before the registry lock is acquired.
    pub fn process_attestation_for_slashing(
        &self,
        attestation: IndexedAttestation,
        current_epoch: u64,
    ) -> Result<Vec<SlashingOutcome>, EngineError> {
        let evidence = self.slashing.write().attester.record(attestation, current_epoch);

        let mut outcomes = Vec::new();
        if !evidence.is_empty() {
            let mut registry = self.registry.write();
            for item in &evidence {
                for &index in &item.slashable_indices {
                    outcomes.push(registry.slash_validator(index, current_epoch)?);
                }
            }
        }
        Ok(outcomes)
    }

    /// Runs the finality-vote equivocation detector and slashes the
    /// offending validator if a conflict is found.
    pub fn process_finality_vote_for_slashing(
        &self,
        slot: u64,
        validator: u64,
        block_root: B256,
        signature: Signature,
        current_epoch: u64,
    ) -> Result<Option<SlashingOutcome>, EngineError> {
        let evidence = self.slashing.write().finality.record(slot, validator, block_root, signature);
        match evidence {
            Some(evidence) => Ok(Some(self.registry.write().slash_validator(evidence.validator, current_epoch)?)),
            None => Ok(None),
        }
    }

    pub fn queue_signature(&self, public_key: PublicKey, message: Vec<u8>, signature: Signature) {
        self.batch_verifier.write().push(public_key, message, signature);
    }

    pub fn flush_batch(&self) -> Result<BatchVerificationResult, EngineError> {
        Ok(self.batch_verifier.write().flush()?)
    }

    pub fn apply_randao_reveal(
        &self,
        epoch: u64,
        proposer_pubkey: &PublicKey,
        reveal: &Signature,
    ) -> Result<(), EngineError> {
        self.randao.write().apply_reveal(
            epoch,
            proposer_pubkey,
            reveal,
            self.fork_version,
            self.genesis_validators_root,
        )?;
        Ok(())
    }

    /// Computes (or returns the cached) committee assignment for `epoch`,
    /// reading the registry's active set and balances as owned values
    /// before acquiring the committee cache's lock.
    pub fn compute_epoch_committees(
        &self,
        epoch: u64,
        current_epoch: u64,
        seed: B256,
    ) -> Result<Arc<EpochCommittees>, EngineError> {
        let (active, balances) = {
            let registry = self.registry.read();
            let active = registry.active_validator_indices(current_epoch);
            let mut balances = HashMap::with_capacity(active.len());
            for &index in &active {
                balances.insert(index, registry.validator(index)?.effective_balance);
            }
            (active, balances)
        };

        Ok(self.committee.write().compute_epoch(epoch, &active, seed, |index| balances[&index])?)
    }
}

#[cfg(test)]
mod tests {
    use corebeam_batch_verify::BatchVerifierConfig;
    use corebeam_bls::PrivateKey;
    use corebeam_committee::CommitteeConfig;
    use corebeam_finality::FinalityConfig;
    use corebeam_fork_choice::ForkChoiceConfig;
    use corebeam_primitives::{AttestationData, Checkpoint};
    use corebeam_registry::RegistryConfig;
    use corebeam_slashing::SlashingConfig;

    use super::*;

    fn test_config() -> EngineConfig {
        let genesis = Checkpoint::new(0, B256::ZERO);
        EngineConfig {
            registry: RegistryConfig::default(),
            finality: FinalityConfig::standard(),
            fork_choice: ForkChoiceConfig {
                justified_checkpoint: genesis,
                finalized_checkpoint: genesis,
                slots_per_epoch: 32,
            },
            committee: CommitteeConfig::default(),
            batch_verifier: BatchVerifierConfig::default(),
            slashing: SlashingConfig::default(),
            randao_ring_size: 8,
            genesis_seed: B256::repeat_byte(0x42),
            fork_version: [0, 0, 0, 0],
            genesis_validators_root: B256::ZERO,
        }
    }

    fn root(byte: u8) -> B256 {
        B256::repeat_byte(byte)
    }

    #[test]
    fn fork_choice_head_follows_the_heavier_branch() {
        let engine = Engine::new(test_config());
        let genesis = Checkpoint::new(0, root(0));
        engine.insert_block(root(0), B256::ZERO, B256::ZERO, 0, genesis, genesis).unwrap();
        engine.insert_block(root(1), root(0), B256::ZERO, 1, genesis, genesis).unwrap();
        engine.insert_block(root(2), root(0), B256::ZERO, 1, genesis, genesis).unwrap();

        engine.vote_for_fork_choice(0, root(1), 1, 100).unwrap();
        engine.vote_for_fork_choice(1, root(2), 1, 10).unwrap();

        assert_eq!(engine.head().unwrap(), root(1));
    }

    #[test]
    fn finality_round_finalizes_at_supermajority() {
        let engine = Engine::new(test_config());
        engine.propose_finality_round(10, root(1), 0, true).unwrap();
        assert!(engine.receive_finality_vote(10, 0, root(1), 34, 100, 5).unwrap().is_none());
        let outcome = engine.receive_finality_vote(10, 1, root(1), 34, 100, 10).unwrap().unwrap();
        assert_eq!(outcome.final_root, root(1));
    }

    #[test]
    fn double_vote_attestation_slashes_the_shared_validator() {
        let engine = Engine::new(test_config());
        let key = PrivateKey::from_bytes(&[7u8; 32]).unwrap();
        let validator = Validator::new(key.public_key(), B256::ZERO, 32_000_000_000);
        engine.push_validator(validator, 32_000_000_000);

        let attestation_a = IndexedAttestation {
            attesting_indices: vec![0],
            data: AttestationData {
                slot: 160,
                beacon_block_root: B256::ZERO,
                source: Checkpoint::new(4, B256::ZERO),
                target: Checkpoint::new(5, root(1)),
            },
        };
        let attestation_b = IndexedAttestation {
            attesting_indices: vec![0],
            data: AttestationData {
                slot: 160,
                beacon_block_root: B256::ZERO,
                source: Checkpoint::new(4, B256::ZERO),
                target: Checkpoint::new(5, root(2)),
            },
        };

        engine.process_attestation_for_slashing(attestation_a, 5).unwrap();
        let outcomes = engine.process_attestation_for_slashing(attestation_b, 5).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(engine.registry_reader().read().validator(0).unwrap().slashed);
    }

    #[test]
    fn batch_verifier_flushes_below_threshold_individually() {
        let engine = Engine::new(test_config());
        let key = PrivateKey::from_bytes(&[3u8; 32]).unwrap();
        let signature = key.sign(b"hello").unwrap();
        engine.queue_signature(key.public_key(), b"hello".to_vec(), signature);
        let result = engine.flush_batch().unwrap();
        assert!(result.valid);
    }
}
