use std::str::FromStr;

use alloy_primitives::hex;
use bls12_381::{G1Affine, G1Projective};
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use ssz::Encode;
use ssz_derive::{Decode, Encode as SszEncode};
use ssz_types::{typenum::U48, FixedVector};
use tree_hash_derive::TreeHash;

use crate::errors::BlsError;

#[derive(Debug, PartialEq, Eq, Hash, Clone, SszEncode, Decode, TreeHash, Default)]
pub struct PublicKey {
    inner: FixedVector<u8, U48>,
}

impl PublicKey {
    pub fn to_bytes(&self) -> &[u8] {
        self.inner.iter().as_slice()
    }

    pub(crate) fn point(&self) -> Result<G1Affine, BlsError> {
        let bytes: [u8; 48] = self
            .to_bytes()
            .try_into()
            .map_err(|_| BlsError::InvalidByteLength { len: self.to_bytes().len(), expected: 48 })?;
        Option::from(G1Affine::from_compressed(&bytes)).ok_or(BlsError::InvalidPublicKey)
    }
}

impl From<G1Projective> for PublicKey {
    fn from(value: G1Projective) -> Self {
        Self { inner: FixedVector::from(G1Affine::from(value).to_compressed().to_vec()) }
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.inner.as_ssz_bytes())))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: String = Deserialize::deserialize(deserializer)?;
        let bytes = hex::decode(raw.strip_prefix("0x").unwrap_or(&raw)).map_err(SerdeError::custom)?;
        Ok(Self { inner: FixedVector::from(bytes) })
    }
}

impl FromStr for PublicKey {
    type Err = BlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|_| BlsError::InvalidHexString)?;
        if bytes.len() != 48 {
            return Err(BlsError::InvalidByteLength { len: bytes.len(), expected: 48 });
        }
        Ok(Self { inner: FixedVector::from(bytes) })
    }
}
