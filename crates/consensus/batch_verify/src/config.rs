#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchVerifierConfig {
    /// Minimum number of accumulated entries before an aggregate
    /// random-linear-combination check is attempted instead of verifying
    /// each entry individually.
    pub batch_size: usize,
    pub enable_fallback: bool,
}

impl Default for BatchVerifierConfig {
    fn default() -> Self {
        Self { batch_size: 8, enable_fallback: true }
    }
}
