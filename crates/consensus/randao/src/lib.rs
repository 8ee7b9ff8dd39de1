//! RANDAO mix ring and seed derivation (design §4.2).

pub mod errors;

use alloy_primitives::B256;
use corebeam_bls::{PublicKey, Signature};
use corebeam_primitives::domain::{compute_domain, compute_signing_root, Domain, ForkVersion, DOMAIN_RANDAO};
pub use errors::RandaoError;
use tracing::debug;

/// Ring buffer of per-epoch 32-byte randomness mixes.
#[derive(Debug, Clone)]
pub struct RandaoMixRing {
    mixes: Vec<B256>,
}

fn epoch_signing_leaf(epoch: u64) -> B256 {
    let mut leaf = [0u8; 32];
    leaf[..8].copy_from_slice(&epoch.to_le_bytes());
    B256::from(leaf)
}

impl RandaoMixRing {
    pub fn new(size: usize, genesis_seed: B256) -> Self {
        Self { mixes: vec![genesis_seed; size] }
    }

    pub fn len(&self) -> usize {
        self.mixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mixes.is_empty()
    }

    pub fn mix_at(&self, epoch: u64) -> B256 {
        self.mixes[(epoch as usize) % self.mixes.len()]
    }

    /// `H(dt ‖ epoch ‖ mixes[epoch mod N])`.
    pub fn seed(&self, epoch: u64, domain_type: u32) -> B256 {
        let mut preimage = Vec::with_capacity(4 + 8 + 32);
        preimage.extend_from_slice(&domain_type.to_le_bytes());
        preimage.extend_from_slice(&epoch.to_le_bytes());
        preimage.extend_from_slice(self.mix_at(epoch).as_slice());
        B256::from(ethereum_hashing::hash_fixed(&preimage))
    }

    /// Verifies a proposer's RANDAO reveal for `epoch` and, on success,
    /// XORs `H(reveal)` into `mixes[epoch mod N]`.
    pub fn apply_reveal(
        &mut self,
        epoch: u64,
        proposer_pubkey: &PublicKey,
        reveal: &Signature,
        fork_version: ForkVersion,
        genesis_validators_root: B256,
    ) -> Result<(), RandaoError> {
        let domain: Domain = compute_domain(DOMAIN_RANDAO, fork_version, genesis_validators_root);
        let signing_root = compute_signing_root(epoch_signing_leaf(epoch), domain);

        if !reveal.verify(proposer_pubkey, signing_root.as_slice())? {
            return Err(RandaoError::InvalidReveal { epoch });
        }

        let hashed_reveal = ethereum_hashing::hash_fixed(reveal.to_bytes());
        let index = (epoch as usize) % self.mixes.len();
        let mut mixed = [0u8; 32];
        for (out, (a, b)) in mixed.iter_mut().zip(self.mixes[index].as_slice().iter().zip(hashed_reveal.iter())) {
            *out = a ^ b;
        }
        self.mixes[index] = B256::from(mixed);
        debug!(epoch, "applied randao reveal");
        Ok(())
    }

    /// Copies `mixes[current_epoch]` into `mixes[(current_epoch + 1) mod N]`
    /// ahead of any reveal for the next epoch arriving.
    pub fn advance_epoch(&mut self, current_epoch: u64) {
        let carried = self.mix_at(current_epoch);
        let next_index = ((current_epoch + 1) as usize) % self.mixes.len();
        self.mixes[next_index] = carried;
    }
}
