use bls12_381::{
    hash_to_curve::{ExpandMsgXmd, HashToCurve},
    G1Affine, G1Projective, G2Projective, Scalar,
};
use group::Group;

use crate::{constants::DST, errors::BlsError, public_key::PublicKey, signature::Signature};

/// A BLS secret scalar. Never implements `Debug`/`Serialize` so it cannot
/// leak into logs or wire messages by accident.
#[derive(Clone)]
pub struct PrivateKey {
    scalar: Scalar,
}

impl PrivateKey {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, BlsError> {
        let scalar = Option::from(Scalar::from_bytes(bytes)).ok_or(BlsError::InvalidPrivateKey)?;
        Ok(Self { scalar })
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(G1Projective::generator() * self.scalar)
    }

    pub fn sign(&self, message: &[u8]) -> Result<Signature, BlsError> {
        let hash_point =
            <G2Projective as HashToCurve<ExpandMsgXmd<sha2::Sha256>>>::hash_to_curve([message], DST);
        let signature_point = hash_point * self.scalar;
        Ok(Signature::from_point(signature_point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_is_deterministic() {
        let sk = PrivateKey::from_bytes(&[3u8; 32]).unwrap();
        assert_eq!(sk.public_key(), sk.public_key());
    }
}
