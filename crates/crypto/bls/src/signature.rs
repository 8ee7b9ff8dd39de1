use alloy_primitives::hex;
use bls12_381::{
    hash_to_curve::{ExpandMsgXmd, HashToCurve},
    pairing, G1Affine, G2Affine, G2Projective,
};
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use ssz::Encode;
use ssz_derive::{Decode, Encode as SszEncode};
use ssz_types::{typenum::U96, FixedVector};
use tree_hash_derive::TreeHash;

use crate::{constants::DST, errors::BlsError, public_key::PublicKey, traits::Aggregatable};

#[derive(Debug, PartialEq, Eq, Hash, Clone, SszEncode, Decode, TreeHash)]
pub struct Signature {
    inner: FixedVector<u8, U96>,
}

pub(crate) fn hash_to_curve(message: &[u8]) -> G2Projective {
    <G2Projective as HashToCurve<ExpandMsgXmd<sha2::Sha256>>>::hash_to_curve([message], DST)
}

impl Signature {
    pub fn to_bytes(&self) -> &[u8] {
        self.inner.iter().as_slice()
    }

    pub fn infinity() -> Self {
        use group::Group;
        Self { inner: FixedVector::from(G2Affine::from(G2Projective::identity()).to_compressed().to_vec()) }
    }

    pub(crate) fn point(&self) -> Result<G2Affine, BlsError> {
        let bytes: [u8; 96] = self
            .to_bytes()
            .try_into()
            .map_err(|_| BlsError::InvalidByteLength { len: self.to_bytes().len(), expected: 96 })?;
        Option::from(G2Affine::from_compressed(&bytes)).ok_or(BlsError::InvalidSignature)
    }

    pub(crate) fn from_point(point: G2Projective) -> Self {
        Self { inner: FixedVector::from(G2Affine::from(point).to_compressed().to_vec()) }
    }

    pub fn verify(&self, public_key: &PublicKey, message: &[u8]) -> Result<bool, BlsError> {
        let signature_point = self.point()?;
        let public_key_point = public_key.point()?;
        let h = hash_to_curve(message);

        let lhs = pairing(&public_key_point, &G2Affine::from(h));
        let rhs = pairing(&G1Affine::generator(), &signature_point);
        Ok(lhs == rhs)
    }

    pub fn fast_aggregate_verify<'a, P>(&self, public_keys: P, message: &[u8]) -> Result<bool, BlsError>
    where
        P: AsRef<[&'a PublicKey]>,
    {
        let aggregate = PublicKey::aggregate(public_keys.as_ref())?;
        self.verify(&aggregate, message)
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.inner.as_ssz_bytes())))
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: String = Deserialize::deserialize(deserializer)?;
        let bytes = hex::decode(raw.strip_prefix("0x").unwrap_or(&raw)).map_err(SerdeError::custom)?;
        Ok(Self { inner: FixedVector::from(bytes) })
    }
}
