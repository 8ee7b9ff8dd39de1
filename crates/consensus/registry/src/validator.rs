use alloy_primitives::B256;
use corebeam_bls::PublicKey;
use corebeam_primitives::constants::{
    BLS_WITHDRAWAL_PREFIX, COMPOUNDING_WITHDRAWAL_PREFIX, ETH1_ADDRESS_WITHDRAWAL_PREFIX,
    FAR_FUTURE_EPOCH, MAX_EFFECTIVE_BALANCE, MIN_ACTIVATION_BALANCE,
};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Validator {
    pub pubkey: PublicKey,
    pub withdrawal_credentials: B256,
    pub effective_balance: u64,
    pub slashed: bool,
    pub activation_eligibility_epoch: u64,
    pub activation_epoch: u64,
    pub exit_epoch: u64,
    pub withdrawable_epoch: u64,
}

impl Validator {
    pub fn new(pubkey: PublicKey, withdrawal_credentials: B256, effective_balance: u64) -> Self {
        Self {
            pubkey,
            withdrawal_credentials,
            effective_balance,
            slashed: false,
            activation_eligibility_epoch: FAR_FUTURE_EPOCH,
            activation_epoch: FAR_FUTURE_EPOCH,
            exit_epoch: FAR_FUTURE_EPOCH,
            withdrawable_epoch: FAR_FUTURE_EPOCH,
        }
    }

    pub fn withdrawal_prefix(&self) -> u8 {
        self.withdrawal_credentials[0]
    }

    pub fn has_bls_withdrawal_credential(&self) -> bool {
        self.withdrawal_prefix() == BLS_WITHDRAWAL_PREFIX
    }

    pub fn has_eth1_withdrawal_credential(&self) -> bool {
        self.withdrawal_prefix() == ETH1_ADDRESS_WITHDRAWAL_PREFIX
    }

    pub fn has_compounding_withdrawal_credential(&self) -> bool {
        self.withdrawal_prefix() == COMPOUNDING_WITHDRAWAL_PREFIX
    }

    pub fn has_execution_withdrawal_credential(&self) -> bool {
        self.has_eth1_withdrawal_credential() || self.has_compounding_withdrawal_credential()
    }

    pub fn max_effective_balance(&self) -> u64 {
        if self.has_compounding_withdrawal_credential() {
            MAX_EFFECTIVE_BALANCE
        } else {
            MIN_ACTIVATION_BALANCE
        }
    }

    pub fn is_active_validator(&self, epoch: u64) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }

    pub fn is_exiting(&self) -> bool {
        self.exit_epoch != FAR_FUTURE_EPOCH
    }

    pub fn is_slashable_validator(&self, epoch: u64) -> bool {
        !self.slashed && self.activation_epoch <= epoch && epoch < self.withdrawable_epoch
    }

    pub fn is_eligible_for_activation_queue(&self) -> bool {
        self.activation_eligibility_epoch == FAR_FUTURE_EPOCH
            && self.effective_balance >= MIN_ACTIVATION_BALANCE
    }

    pub fn is_eligible_for_activation(&self, finalized_epoch: u64) -> bool {
        self.activation_eligibility_epoch <= finalized_epoch
            && self.activation_epoch == FAR_FUTURE_EPOCH
            && !self.slashed
    }

    pub fn is_fully_withdrawable(&self, balance: u64, epoch: u64) -> bool {
        self.has_execution_withdrawal_credential() && self.withdrawable_epoch <= epoch && balance > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_validator(prefix: u8) -> Validator {
        let mut credentials = [0u8; 32];
        credentials[0] = prefix;
        Validator::new(PublicKey::default(), B256::from(credentials), MIN_ACTIVATION_BALANCE)
    }

    #[test]
    fn new_validator_has_far_future_epochs() {
        let validator = sample_validator(BLS_WITHDRAWAL_PREFIX);
        assert_eq!(validator.activation_epoch, FAR_FUTURE_EPOCH);
        assert!(!validator.is_active_validator(0));
    }

    #[test]
    fn compounding_credential_raises_max_effective_balance() {
        let validator = sample_validator(COMPOUNDING_WITHDRAWAL_PREFIX);
        assert_eq!(validator.max_effective_balance(), MAX_EFFECTIVE_BALANCE);
        assert!(validator.has_execution_withdrawal_credential());
    }

    #[test]
    fn bls_credential_is_not_execution_withdrawable() {
        let validator = sample_validator(BLS_WITHDRAWAL_PREFIX);
        assert!(!validator.has_execution_withdrawal_credential());
    }
}
