//! Accumulating batch signature verifier (design §4.9).

pub mod config;
pub mod errors;

use corebeam_bls::{verify_random_linear_combination, BatchEntry, PublicKey, Signature};
pub use config::BatchVerifierConfig;
pub use errors::BatchVerifyError;
use rand::Rng;
use tracing::{debug, warn};

struct OwnedEntry {
    public_key: PublicKey,
    message: Vec<u8>,
    signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchVerificationResult {
    pub valid: bool,
    pub used_fallback: bool,
    pub invalid_idxs: Vec<usize>,
}

/// Accumulates `(pubkey, message, signature)` triples and verifies them in
/// bulk on `flush`, falling back to per-entry verification to localize
/// invalid signatures when the aggregate check fails.
#[derive(Default)]
pub struct BatchVerifier {
    config: BatchVerifierConfig,
    entries: Vec<OwnedEntry>,
}

impl BatchVerifier {
    pub fn new(config: BatchVerifierConfig) -> Self {
        Self { config, entries: Vec::new() }
    }

    pub fn push(&mut self, public_key: PublicKey, message: Vec<u8>, signature: Signature) {
        self.entries.push(OwnedEntry { public_key, message, signature });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn verify_individually(entries: &[OwnedEntry]) -> Vec<usize> {
        entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| match entry.signature.verify(&entry.public_key, &entry.message) {
                Ok(true) => None,
                _ => Some(idx),
            })
            .collect()
    }

    fn random_nonzero_coefficients(count: usize) -> Vec<u64> {
        let mut rng = rand::rng();
        (0..count)
            .map(|_| loop {
                let candidate: u64 = rng.random();
                if candidate != 0 {
                    return candidate;
                }
            })
            .collect()
    }

    /// Drains the accumulated entries and verifies them, per §4.9.
    pub fn flush(&mut self) -> Result<BatchVerificationResult, BatchVerifyError> {
        let entries = std::mem::take(&mut self.entries);

        if entries.len() < self.config.batch_size {
            let invalid_idxs = Self::verify_individually(&entries);
            let valid = invalid_idxs.is_empty();
            debug!(valid, "batch below threshold, verified individually");
            return Ok(BatchVerificationResult { valid, used_fallback: false, invalid_idxs });
        }

        let batch_entries: Vec<BatchEntry<'_>> = entries
            .iter()
            .map(|entry| BatchEntry { public_key: &entry.public_key, message: &entry.message, signature: &entry.signature })
            .collect();
        let coefficients = Self::random_nonzero_coefficients(entries.len());

        let aggregate_valid = verify_random_linear_combination(&batch_entries, &coefficients)?;
        if aggregate_valid {
            return Ok(BatchVerificationResult { valid: true, used_fallback: false, invalid_idxs: Vec::new() });
        }

        if self.config.enable_fallback {
            let invalid_idxs = Self::verify_individually(&entries);
            warn!(invalid = invalid_idxs.len(), "batch verification failed, fell back to per-entry check");
            Ok(BatchVerificationResult { valid: false, used_fallback: true, invalid_idxs })
        } else {
            Ok(BatchVerificationResult { valid: false, used_fallback: false, invalid_idxs: Vec::new() })
        }
    }
}
