use crate::errors::BlsError;

/// Combines multiple BLS items (public keys, signatures) of the same kind
/// into a single aggregate item by summing their underlying curve points.
pub trait Aggregatable: Sized {
    fn aggregate(items: &[&Self]) -> Result<Self, BlsError>;
}
