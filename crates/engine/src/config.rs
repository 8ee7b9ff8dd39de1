use alloy_primitives::B256;
use corebeam_batch_verify::BatchVerifierConfig;
use corebeam_committee::CommitteeConfig;
use corebeam_finality::FinalityConfig;
use corebeam_fork_choice::ForkChoiceConfig;
use corebeam_primitives::domain::ForkVersion;
use corebeam_registry::RegistryConfig;
use corebeam_slashing::SlashingConfig;

/// Aggregates every component's configuration (design §6) plus the handful
/// of genesis parameters the engine needs to wire them together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub registry: RegistryConfig,
    pub finality: FinalityConfig,
    pub fork_choice: ForkChoiceConfig,
    pub committee: CommitteeConfig,
    pub batch_verifier: BatchVerifierConfig,
    pub slashing: SlashingConfig,
    pub randao_ring_size: usize,
    pub genesis_seed: B256,
    pub fork_version: ForkVersion,
    pub genesis_validators_root: B256,
}
