pub mod attestation;
pub mod bitfield;
pub mod checkpoint;
pub mod constants;
pub mod domain;

pub use attestation::{attestation_signing_input, AttestationData, IndexedAttestation};
pub use bitfield::{decode_bitfield, encode_bitfield};
pub use checkpoint::Checkpoint;
pub use domain::{compute_domain, compute_signing_root, Domain, ForkVersion};
