//! Validator registry: lifecycle transitions, churn-limited activation and
//! exit queues, slashing and ejection (design §4.4).

pub mod config;
pub mod errors;
pub mod validator;

use corebeam_primitives::constants::{
    EFFECTIVE_BALANCE_INCREMENT, EJECTION_BALANCE, FAR_FUTURE_EPOCH, HYSTERESIS_DOWNWARD_MULTIPLIER,
    HYSTERESIS_QUOTIENT, HYSTERESIS_UPWARD_MULTIPLIER, PROPOSER_WEIGHT,
};
pub use config::RegistryConfig;
pub use errors::RegistryError;
use tracing::{debug, info};
pub use validator::Validator;

/// Outcome of applying a slashing: penalty debited from the slashed
/// validator's balance, split between the whistleblower and proposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashingOutcome {
    pub penalty: u64,
    pub whistleblower_reward: u64,
    pub proposer_reward: u64,
}

/// What changed in the registry during one epoch transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochTransitionReport {
    pub activated: Vec<u64>,
    pub ejected: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct Registry {
    config: RegistryConfig,
    validators: Vec<Validator>,
    balances: Vec<u64>,
    slashings: Vec<u64>,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        let slashings = vec![0; config.epochs_per_slashings_vector as usize];
        Self { config, validators: Vec::new(), balances: Vec::new(), slashings }
    }

    pub fn push(&mut self, validator: Validator, balance: u64) -> u64 {
        self.validators.push(validator);
        self.balances.push(balance);
        (self.validators.len() - 1) as u64
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn validator(&self, index: u64) -> Result<&Validator, RegistryError> {
        self.validators.get(index as usize).ok_or(RegistryError::UnknownValidator(index))
    }

    pub fn balance(&self, index: u64) -> Result<u64, RegistryError> {
        self.balances.get(index as usize).copied().ok_or(RegistryError::UnknownValidator(index))
    }

    pub fn active_validator_indices(&self, epoch: u64) -> Vec<u64> {
        self.validators
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.is_active_validator(epoch).then_some(i as u64))
            .collect()
    }

    pub fn churn_limit(&self, epoch: u64) -> u64 {
        let active = self.active_validator_indices(epoch).len() as u64;
        (active / self.config.churn_limit_quotient).max(self.config.min_per_epoch_churn_limit)
    }

    fn compute_exit_queue_epoch(&self, current_epoch: u64) -> u64 {
        let activation_exit_epoch = current_epoch + 1 + self.config.max_seed_lookahead;
        let mut exit_queue_epoch = self
            .validators
            .iter()
            .filter(|v| v.exit_epoch != FAR_FUTURE_EPOCH)
            .map(|v| v.exit_epoch)
            .max()
            .unwrap_or(activation_exit_epoch)
            .max(activation_exit_epoch);

        let occupancy =
            self.validators.iter().filter(|v| v.exit_epoch == exit_queue_epoch).count() as u64;
        if occupancy >= self.churn_limit(current_epoch) {
            exit_queue_epoch += 1;
        }
        exit_queue_epoch
    }

    /// Idempotent internal exit trigger used by both voluntary exits and the
    /// ejection/slashing paths. Does nothing if the validator is already
    /// exiting.
    fn initiate_exit(&mut self, index: u64, current_epoch: u64) -> Result<(), RegistryError> {
        if self.validator(index)?.is_exiting() {
            return Ok(());
        }
        let exit_epoch = self.compute_exit_queue_epoch(current_epoch);
        let withdrawable_epoch = exit_epoch + self.config.min_validator_withdrawability_delay;

        let validator =
            self.validators.get_mut(index as usize).ok_or(RegistryError::UnknownValidator(index))?;
        validator.exit_epoch = exit_epoch;
        validator.withdrawable_epoch = withdrawable_epoch;
        debug!(index, exit_epoch, "validator exit initiated");
        Ok(())
    }

    /// Voluntary exit: requires the validator to be active, to have been
    /// active for at least `shard_committee_period` epochs, and not already
    /// exiting.
    pub fn voluntary_exit(&mut self, index: u64, current_epoch: u64) -> Result<(), RegistryError> {
        let validator = self.validator(index)?;
        if !validator.is_active_validator(current_epoch) {
            return Err(RegistryError::NotActive(index, current_epoch));
        }
        if validator.is_exiting() {
            return Err(RegistryError::AlreadyExiting(index));
        }
        if current_epoch < validator.activation_epoch + self.config.shard_committee_period {
            return Err(RegistryError::TooYoungToExit(index));
        }
        self.initiate_exit(index, current_epoch)
    }

    /// Marks a validator slashed, raises its withdrawable epoch, initiates
    /// its exit, and debits the slashing penalty from its balance. Returns
    /// the penalty and how it is split between whistleblower and proposer;
    /// applying the reward/penalty balance deltas to other validators is the
    /// caller's responsibility.
    pub fn slash_validator(
        &mut self,
        index: u64,
        current_epoch: u64,
    ) -> Result<SlashingOutcome, RegistryError> {
        self.initiate_exit(index, current_epoch)?;

        let validator =
            self.validators.get_mut(index as usize).ok_or(RegistryError::UnknownValidator(index))?;
        validator.slashed = true;
        validator.withdrawable_epoch = validator
            .withdrawable_epoch
            .max(current_epoch + self.config.epochs_per_slashings_vector);
        let effective_balance = validator.effective_balance;

        let slashings_index = (current_epoch % self.config.epochs_per_slashings_vector) as usize;
        self.slashings[slashings_index] += effective_balance;

        let penalty = effective_balance / self.config.min_slashing_penalty_quotient;
        let balance = &mut self.balances[index as usize];
        *balance = balance.saturating_sub(penalty);

        let whistleblower_reward = effective_balance / self.config.whistleblower_reward_quotient;
        let proposer_reward = whistleblower_reward / PROPOSER_WEIGHT;

        info!(index, penalty, "validator slashed");
        Ok(SlashingOutcome { penalty, whistleblower_reward, proposer_reward })
    }

    /// Applies effective-balance hysteresis to every validator: balances
    /// inside the hysteresis band around the current effective balance are
    /// left unchanged, preventing oscillation at increment boundaries.
    pub fn process_effective_balance_updates(&mut self) {
        let hysteresis_increment = EFFECTIVE_BALANCE_INCREMENT / HYSTERESIS_QUOTIENT;
        let downward_threshold = hysteresis_increment * HYSTERESIS_DOWNWARD_MULTIPLIER;
        let upward_threshold = hysteresis_increment * HYSTERESIS_UPWARD_MULTIPLIER;

        for (validator, &balance) in self.validators.iter_mut().zip(self.balances.iter()) {
            if balance + downward_threshold < validator.effective_balance
                || validator.effective_balance + upward_threshold < balance
            {
                let max_effective = validator.max_effective_balance();
                validator.effective_balance =
                    (balance - balance % EFFECTIVE_BALANCE_INCREMENT).min(max_effective);
            }
        }
    }

    /// Runs one epoch transition: activation-eligibility marking, ejection
    /// of under-collateralized validators, and churn-limited activation of
    /// eligible queued validators, ordered by `(eligibility_epoch, index)`.
    pub fn process_epoch_transition(
        &mut self,
        current_epoch: u64,
        finalized_epoch: u64,
    ) -> Result<EpochTransitionReport, RegistryError> {
        let mut to_eject = Vec::new();
        let mut activation_candidates = Vec::new();

        for (index, validator) in self.validators.iter_mut().enumerate() {
            let index = index as u64;
            if validator.is_eligible_for_activation_queue() {
                validator.activation_eligibility_epoch = current_epoch + 1;
            } else if validator.is_active_validator(current_epoch)
                && validator.effective_balance <= EJECTION_BALANCE
                && !validator.is_exiting()
            {
                to_eject.push(index);
            } else if validator.is_eligible_for_activation(finalized_epoch) {
                activation_candidates.push((validator.activation_eligibility_epoch, index));
            }
        }

        for index in &to_eject {
            self.initiate_exit(*index, current_epoch)?;
        }

        activation_candidates.sort_unstable();
        let churn = self.churn_limit(current_epoch) as usize;
        let activation_epoch = current_epoch + 1 + self.config.max_seed_lookahead;
        let mut activated = Vec::with_capacity(activation_candidates.len().min(churn));
        for &(_, index) in activation_candidates.iter().take(churn) {
            self.validators[index as usize].activation_epoch = activation_epoch;
            activated.push(index);
        }

        Ok(EpochTransitionReport { activated, ejected: to_eject })
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use corebeam_bls::PublicKey;
    use corebeam_primitives::constants::MIN_ACTIVATION_BALANCE;

    use super::*;

    fn fresh_registry(count: usize) -> Registry {
        let mut registry = Registry::new(RegistryConfig::default());
        for _ in 0..count {
            let mut validator = Validator::new(PublicKey::default(), B256::ZERO, MIN_ACTIVATION_BALANCE);
            validator.activation_eligibility_epoch = 0;
            validator.activation_epoch = 0;
            registry.push(validator, MIN_ACTIVATION_BALANCE);
        }
        registry
    }

    #[test]
    fn churn_limit_has_a_floor() {
        let registry = fresh_registry(4);
        assert_eq!(registry.churn_limit(0), registry.config.min_per_epoch_churn_limit);
    }

    #[test]
    fn voluntary_exit_rejects_before_shard_committee_period() {
        let mut registry = fresh_registry(1);
        let err = registry.voluntary_exit(0, 10).unwrap_err();
        assert!(matches!(err, RegistryError::TooYoungToExit(0)));
    }

    #[test]
    fn voluntary_exit_succeeds_after_shard_committee_period() {
        let mut registry = fresh_registry(1);
        let current_epoch = registry.config.shard_committee_period;
        registry.voluntary_exit(0, current_epoch).unwrap();
        assert!(registry.validator(0).unwrap().is_exiting());
    }

    #[test]
    fn double_voluntary_exit_errors() {
        let mut registry = fresh_registry(1);
        let current_epoch = registry.config.shard_committee_period;
        registry.voluntary_exit(0, current_epoch).unwrap();
        let err = registry.voluntary_exit(0, current_epoch + 1).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyExiting(0)));
    }

    #[test]
    fn slashing_debits_penalty_and_marks_slashed() {
        let mut registry = fresh_registry(1);
        let outcome = registry.slash_validator(0, 5).unwrap();
        assert!(registry.validator(0).unwrap().slashed);
        assert_eq!(outcome.penalty, MIN_ACTIVATION_BALANCE / registry.config.min_slashing_penalty_quotient);
        assert_eq!(registry.balance(0).unwrap(), MIN_ACTIVATION_BALANCE - outcome.penalty);
    }

    #[test]
    fn ejection_triggers_on_low_balance_during_epoch_transition() {
        let mut registry = fresh_registry(1);
        registry.balances[0] = EJECTION_BALANCE;
        registry.validators[0].effective_balance = EJECTION_BALANCE;
        let report = registry.process_epoch_transition(0, 0).unwrap();
        assert_eq!(report.ejected, vec![0]);
        assert!(registry.validator(0).unwrap().is_exiting());
    }

    #[test]
    fn activation_queue_is_churn_limited_and_ordered() {
        let mut registry = Registry::new(RegistryConfig::default());
        for i in 0..10u64 {
            let mut validator = Validator::new(PublicKey::default(), B256::ZERO, MIN_ACTIVATION_BALANCE);
            validator.activation_eligibility_epoch = 10 - i;
            registry.push(validator, MIN_ACTIVATION_BALANCE);
        }
        let report = registry.process_epoch_transition(20, 20).unwrap();
        assert_eq!(report.activated.len(), registry.config.min_per_epoch_churn_limit as usize);
        assert_eq!(report.activated[0], 9);
    }
}
