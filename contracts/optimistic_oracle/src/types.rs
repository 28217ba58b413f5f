use soroban_sdk::{contracterror, contracttype, Address, String};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum AssertionError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    AssertionExists = 3,
    AssertionNotFound = 4,
    IncorrectBond = 5,
    NoProposal = 6,
    AssertionProposed = 7,
    ProposalDisputed = 8,
    NotDisputedAssertion = 9,
    AwaitingDecider = 10,
    AlreadyClaimed = 11,
    DeadlineNotMet = 12,
    DisputeWindowClosed = 13,
    OnlyOwner = 14,
    OnlyDecider = 15,
    InvalidWindow = 16,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssertionState {
    Invalid = 0,
    Asserted = 1,
    Proposed = 2,
    Disputed = 3,
    Settled = 4,
}

/// One record per (asserter, description) key. `proposed_outcome` is
/// meaningful only while `proposer` is set, `resolved_outcome` and
/// `winner` only once `settled`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assertion {
    pub asserter: Address,
    pub description: String,
    pub reward: i128,
    pub start_time: u64,
    pub end_time: u64,
    pub proposer: Option<Address>,
    pub proposed_outcome: bool,
    pub disputer: Option<Address>,
    pub resolved_outcome: bool,
    pub winner: Option<Address>,
    pub settled: bool,
    pub claimed: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub owner: Address,
    pub decider: Address,
    pub bond_token: Address,
}
