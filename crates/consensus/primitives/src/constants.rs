//! Default numeric constants, carried over from mainnet-style beacon chain
//! configuration. Every component that needs one of these wraps it in its
//! own `Config` struct rather than reading the constant directly, so tests
//! can dial them down (e.g. the churn-limit scenario in the design's §8
//! uses 400 validators / churn 64, far below `CHURN_LIMIT_QUOTIENT`'s
//! mainnet scale).

pub const FAR_FUTURE_EPOCH: u64 = u64::MAX;

pub const SLOTS_PER_EPOCH: u64 = 32;
pub const SECONDS_PER_SLOT: u64 = 12;
pub const INTERVALS_PER_SLOT: u64 = 3;

pub const MIN_ACTIVATION_BALANCE: u64 = 32_000_000_000;
pub const MAX_EFFECTIVE_BALANCE: u64 = 32_000_000_000;
pub const EFFECTIVE_BALANCE_INCREMENT: u64 = 1_000_000_000;
pub const EJECTION_BALANCE: u64 = 16_000_000_000;

pub const HYSTERESIS_QUOTIENT: u64 = 4;
pub const HYSTERESIS_DOWNWARD_MULTIPLIER: u64 = 1;
pub const HYSTERESIS_UPWARD_MULTIPLIER: u64 = 5;

pub const CHURN_LIMIT_QUOTIENT: u64 = 65536;
pub const MIN_PER_EPOCH_CHURN_LIMIT: u64 = 4;
pub const MAX_SEED_LOOKAHEAD: u64 = 4;
pub const SHARD_COMMITTEE_PERIOD: u64 = 256;
pub const MIN_VALIDATOR_WITHDRAWABILITY_DELAY: u64 = 256;

pub const EPOCHS_PER_SLASHINGS_VECTOR: u64 = 8192;
pub const MIN_SLASHING_PENALTY_QUOTIENT: u64 = 128;
pub const WHISTLEBLOWER_REWARD_QUOTIENT: u64 = 512;
pub const PROPOSER_WEIGHT: u64 = 8;
pub const WEIGHT_DENOMINATOR: u64 = 64;

pub const SHUFFLE_ROUND_COUNT: u8 = 90;
pub const TARGET_COMMITTEE_SIZE: u64 = 128;
pub const MAX_COMMITTEES_PER_SLOT: u64 = 64;
pub const EPOCHS_PER_SYNC_PERIOD: u64 = 256;
pub const SYNC_COMMITTEE_SIZE: u64 = 512;

pub const BLS_WITHDRAWAL_PREFIX: u8 = 0x00;
pub const ETH1_ADDRESS_WITHDRAWAL_PREFIX: u8 = 0x01;
pub const COMPOUNDING_WITHDRAWAL_PREFIX: u8 = 0x02;
