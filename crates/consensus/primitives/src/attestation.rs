use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

use crate::checkpoint::Checkpoint;

/// A signed claim by a validator that a given block is canonical, carrying
/// a source/target checkpoint pair. Deliberately does *not* carry a
/// committee index: unlike the full beacon-chain attestation, index is not
/// part of the signed data here (it is wire/inclusion metadata only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct AttestationData {
    pub slot: u64,
    pub beacon_block_root: B256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

/// An attestation together with the indices of the validators that signed
/// an identical `AttestationData` via an aggregate signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedAttestation {
    pub attesting_indices: Vec<u64>,
    pub data: AttestationData,
}

/// Wire-format signing root input for an `AttestationData`:
/// `le_u64(slot) ‖ beacon_block_root ‖ le_u64(source.epoch) ‖ source.root ‖
/// le_u64(target.epoch) ‖ target.root`.
pub fn attestation_signing_input(data: &AttestationData) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(8 + 32 + 8 + 32 + 8 + 32);
    bytes.extend_from_slice(&data.slot.to_le_bytes());
    bytes.extend_from_slice(data.beacon_block_root.as_slice());
    bytes.extend_from_slice(&data.source.epoch.to_le_bytes());
    bytes.extend_from_slice(data.source.root.as_slice());
    bytes.extend_from_slice(&data.target.epoch.to_le_bytes());
    bytes.extend_from_slice(data.target.root.as_slice());
    bytes
}
