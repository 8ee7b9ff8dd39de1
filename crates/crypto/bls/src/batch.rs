//! Random linear combination batch verification.
//!
//! Checking `n` independent BLS signatures naively costs `n` pairings on
//! each side. Folding them with random per-entry coefficients collapses the
//! left-hand side into a single pairing and the right-hand side into a
//! single multi-Miller-loop, at the cost of accepting a false positive with
//! probability `2^-k` where `k` is the coefficient width (we use 64 bits,
//! matching the rest of the engine's use of `u64` throughout).

use bls12_381::{multi_miller_loop, pairing, G1Affine, G1Projective, G2Affine, G2Prepared, G2Projective, Scalar};
use group::Curve;

use crate::errors::BlsError;

pub struct BatchEntry<'a> {
    pub public_key: &'a crate::public_key::PublicKey,
    pub message: &'a [u8],
    pub signature: &'a crate::signature::Signature,
}

/// Verifies every `(public_key, message, signature)` triple at once using
/// random per-entry coefficients supplied by the caller. Coefficients must
/// be nonzero and the caller is responsible for generating them freshly per
/// call — reusing coefficients across calls defeats the soundness argument.
pub fn verify_random_linear_combination(
    entries: &[BatchEntry<'_>],
    coefficients: &[u64],
) -> Result<bool, BlsError> {
    if entries.len() != coefficients.len() {
        return Err(BlsError::BatchLengthMismatch {
            entries: entries.len(),
            coefficients: coefficients.len(),
        });
    }
    if entries.is_empty() {
        return Ok(true);
    }

    let mut aggregate_signature = G2Projective::identity();
    let mut scaled_public_keys = Vec::with_capacity(entries.len());
    let mut prepared_hashes = Vec::with_capacity(entries.len());

    for (entry, coefficient) in entries.iter().zip(coefficients) {
        let scalar = Scalar::from(*coefficient);

        let signature_point = entry.signature.point()?;
        aggregate_signature += G2Projective::from(signature_point) * scalar;

        let public_key_point = entry.public_key.point()?;
        scaled_public_keys.push((G1Projective::from(public_key_point) * scalar).to_affine());

        let hash_point = crate::signature::hash_to_curve(entry.message);
        prepared_hashes.push(G2Prepared::from(G2Affine::from(hash_point)));
    }

    let lhs = pairing(&G1Affine::generator(), &G2Affine::from(aggregate_signature));

    let terms: Vec<(&G1Affine, &G2Prepared)> =
        scaled_public_keys.iter().zip(prepared_hashes.iter()).collect();
    let rhs = multi_miller_loop(&terms).final_exponentiation();

    Ok(lhs == rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::private_key::PrivateKey;

    #[test]
    fn accepts_a_batch_of_valid_distinct_signatures() {
        let sk_a = PrivateKey::from_bytes(&[5u8; 32]).unwrap();
        let sk_b = PrivateKey::from_bytes(&[9u8; 32]).unwrap();
        let pk_a = sk_a.public_key();
        let pk_b = sk_b.public_key();
        let sig_a = sk_a.sign(b"block-a").unwrap();
        let sig_b = sk_b.sign(b"block-b").unwrap();

        let entries = vec![
            BatchEntry { public_key: &pk_a, message: b"block-a", signature: &sig_a },
            BatchEntry { public_key: &pk_b, message: b"block-b", signature: &sig_b },
        ];

        assert!(verify_random_linear_combination(&entries, &[12345, 67890]).unwrap());
    }

    #[test]
    fn rejects_when_one_signature_is_corrupted() {
        let sk_a = PrivateKey::from_bytes(&[5u8; 32]).unwrap();
        let sk_b = PrivateKey::from_bytes(&[9u8; 32]).unwrap();
        let pk_a = sk_a.public_key();
        let pk_b = sk_b.public_key();
        let sig_a = sk_a.sign(b"block-a").unwrap();
        let wrong_sig = sk_b.sign(b"wrong-message").unwrap();

        let entries = vec![
            BatchEntry { public_key: &pk_a, message: b"block-a", signature: &sig_a },
            BatchEntry { public_key: &pk_b, message: b"block-b", signature: &wrong_sig },
        ];

        assert!(!verify_random_linear_combination(&entries, &[12345, 67890]).unwrap());
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(matches!(
            verify_random_linear_combination(&[], &[1]),
            Err(BlsError::BatchLengthMismatch { .. })
        ));
    }

    #[test]
    fn empty_batch_is_vacuously_valid() {
        assert!(verify_random_linear_combination(&[], &[]).unwrap());
    }
}
