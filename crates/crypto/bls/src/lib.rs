pub mod aggregate;
pub mod batch;
pub mod constants;
pub mod errors;
pub mod private_key;
pub mod public_key;
pub mod signature;
pub mod traits;

pub use batch::{verify_random_linear_combination, BatchEntry};
pub use errors::BlsError;
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
pub use traits::Aggregatable;
