use soroban_sdk::{contracterror, contracttype, Address};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum OracleError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InsufficientStake = 3,
    AlreadyRegistered = 4,
    NotRegistered = 5,
    NoValidPrices = 6,
    NothingToClaim = 7,
}

/// Per-node record. Report fields are written only by the node's own
/// `report_price` calls, claim fields only by its own `claim_reward` calls.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    pub address: Address,
    pub staked_amount: i128,
    pub last_reported_price: i128,
    pub last_reported_timestamp: u64,
    pub last_claimed_timestamp: u64,
    pub accrued_rewards: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub admin: Address,
    pub stake_token: Address,
    pub reward_token: Address,
}
