use bls12_381::{G1Projective, G2Projective};
use group::Group;

use crate::{errors::BlsError, public_key::PublicKey, signature::Signature, traits::Aggregatable};

impl Aggregatable for PublicKey {
    fn aggregate(items: &[&Self]) -> Result<Self, BlsError> {
        if items.is_empty() {
            return Err(BlsError::EmptyAggregate);
        }
        let mut acc = G1Projective::identity();
        for item in items {
            acc += G1Projective::from(item.point()?);
        }
        Ok(PublicKey::from(acc))
    }
}

impl Aggregatable for Signature {
    fn aggregate(items: &[&Self]) -> Result<Self, BlsError> {
        if items.is_empty() {
            return Err(BlsError::EmptyAggregate);
        }
        let mut acc = G2Projective::identity();
        for item in items {
            acc += G2Projective::from(item.point()?);
        }
        Ok(Signature::from_point(acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::private_key::PrivateKey;

    #[test]
    fn aggregate_public_keys_matches_aggregate_signature_verify() {
        let sk_a = PrivateKey::from_bytes(&[11u8; 32]).unwrap();
        let sk_b = PrivateKey::from_bytes(&[22u8; 32]).unwrap();
        let pk_a = sk_a.public_key();
        let pk_b = sk_b.public_key();

        let sig_a = sk_a.sign(b"same-message").unwrap();
        let sig_b = sk_b.sign(b"same-message").unwrap();
        let agg_sig = Signature::aggregate(&[&sig_a, &sig_b]).unwrap();
        let agg_pk = PublicKey::aggregate(&[&pk_a, &pk_b]).unwrap();

        assert!(agg_sig.verify(&agg_pk, b"same-message").unwrap());
    }

    #[test]
    fn aggregate_of_empty_slice_errors() {
        assert!(PublicKey::aggregate(&[]).is_err());
    }
}
