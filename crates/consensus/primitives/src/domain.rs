//! Domain separation and signing roots (design §4.1).
//!
//! `compute_domain` mixes a 4-byte domain tag with the fork version and
//! genesis validators root so that signatures from one fork, or one chain
//! entirely, cannot be replayed against another. `compute_signing_root`
//! then binds an object root to that domain before it is handed to BLS.

use alloy_primitives::B256;

pub type Domain = [u8; 32];
pub type ForkVersion = [u8; 4];

pub const DOMAIN_BEACON_PROPOSER: [u8; 4] = [0x00, 0x00, 0x00, 0x00];
pub const DOMAIN_BEACON_ATTESTER: [u8; 4] = [0x01, 0x00, 0x00, 0x00];
pub const DOMAIN_RANDAO: [u8; 4] = [0x02, 0x00, 0x00, 0x00];
pub const DOMAIN_DEPOSIT: [u8; 4] = [0x03, 0x00, 0x00, 0x00];
pub const DOMAIN_VOLUNTARY_EXIT: [u8; 4] = [0x04, 0x00, 0x00, 0x00];
pub const DOMAIN_SELECTION_PROOF: [u8; 4] = [0x05, 0x00, 0x00, 0x00];
pub const DOMAIN_AGGREGATE_AND_PROOF: [u8; 4] = [0x06, 0x00, 0x00, 0x00];
pub const DOMAIN_SYNC_COMMITTEE: [u8; 4] = [0x07, 0x00, 0x00, 0x00];

fn pad32(fork_version: ForkVersion) -> [u8; 32] {
    let mut padded = [0u8; 32];
    padded[..4].copy_from_slice(&fork_version);
    padded
}

/// `domain_tag ‖ H(pad32(fork_version) ‖ genesis_validators_root)[..28]`.
pub fn compute_domain(
    domain_type: [u8; 4],
    fork_version: ForkVersion,
    genesis_validators_root: B256,
) -> Domain {
    let fork_data_root =
        ethereum_hashing::hash32_concat(&pad32(fork_version), genesis_validators_root.as_slice());

    let mut domain = [0u8; 32];
    domain[..4].copy_from_slice(&domain_type);
    domain[4..].copy_from_slice(&fork_data_root[..28]);
    domain
}

/// `H(object_root ‖ domain)`.
pub fn compute_signing_root(object_root: B256, domain: Domain) -> B256 {
    ethereum_hashing::hash32_concat(object_root.as_slice(), &domain).into()
}
