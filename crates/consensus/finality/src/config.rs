use crate::errors::FinalityError;

/// `EndgameFinalityV2` configuration: a slot finalizes once a single block
/// root accumulates `ceil(total_stake * min_participation)` stake. The exact
/// fraction (not the rounded percentage) drives the computation, so
/// `standard()`'s two-thirds threshold is `2/3`, not `67/100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalityConfig {
    pub target_latency_ms: u64,
    pub voting_window_ms: u64,
    pub aggregation_window_ms: u64,
    pub min_participation: f64,
    pub threshold_pct: u8,
    participation_numerator: u64,
    participation_denominator: u64,
    pub max_validators: u64,
    pub retain_rounds: u64,
}

impl FinalityConfig {
    pub fn new(threshold_pct: u8) -> Result<Self, FinalityError> {
        if threshold_pct == 0 || threshold_pct > 100 {
            return Err(FinalityError::InvalidPercentage);
        }
        Ok(Self::from_fraction(threshold_pct as u64, 100, threshold_pct))
    }

    fn from_fraction(numerator: u64, denominator: u64, threshold_pct: u8) -> Self {
        Self {
            target_latency_ms: 4_000,
            voting_window_ms: 4_000,
            aggregation_window_ms: 4_000,
            min_participation: numerator as f64 / denominator as f64,
            threshold_pct,
            participation_numerator: numerator,
            participation_denominator: denominator,
            max_validators: 1 << 20,
            retain_rounds: 4,
        }
    }

    /// Standard two-thirds supermajority threshold, the exact `2/3` fraction
    /// rather than the `67/100` rounding.
    pub fn standard() -> Self {
        Self::from_fraction(2, 3, 67)
    }

    /// Optimistic fast-path threshold.
    pub fn optimistic() -> Self {
        Self::from_fraction(9, 10, 90)
    }

    /// `ceil(total_stake * min_participation)`, computed exactly over the
    /// underlying `numerator/denominator` fraction so rounding the display
    /// percentage never perturbs the threshold.
    pub fn threshold(&self, total_stake: u64) -> u64 {
        ((total_stake as u128 * self.participation_numerator as u128)
            .div_ceil(self.participation_denominator as u128)) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_rounds_up() {
        let config = FinalityConfig::standard();
        assert_eq!(config.threshold(3), 2);
        assert_eq!(config.threshold(9), 6);
        assert_eq!(config.threshold(300), 200);
    }

    #[test]
    fn zero_percent_is_rejected() {
        assert_eq!(FinalityConfig::new(0), Err(FinalityError::InvalidPercentage));
    }
}
