#![no_std]

use soroban_sdk::{
    contract, contractimpl, contractmeta, symbol_short, token, Address, Env, String, Symbol,
};

mod storage;
pub mod types;

use storage::Storage;
use types::{Assertion, AssertionError, AssertionState, Config};

contractmeta!(
    key = "Description",
    val = "Optimistic assertion oracle with bonded proposals and arbitrated disputes"
);

/// Seconds a proposed outcome stays open to disputes.
pub const DISPUTE_WINDOW: u64 = 3600;
/// Bond required from both proposer and disputer.
pub const FIXED_BOND: i128 = 10_000_000;
/// Retained from every payout, disputed or not.
pub const DECIDER_FEE: i128 = 2_000_000;

const EVT_ASSERT: Symbol = symbol_short!("asserted");
const EVT_PROPOSE: Symbol = symbol_short!("proposed");
const EVT_DISPUTE: Symbol = symbol_short!("disputed");
const EVT_SETTLE: Symbol = symbol_short!("settled");
const EVT_CLAIM: Symbol = symbol_short!("claimed");
const EVT_REFUND: Symbol = symbol_short!("refunded");

#[contract]
pub struct OptimisticOracle;

#[contractimpl]
impl OptimisticOracle {
    pub fn initialize(
        env: Env,
        owner: Address,
        decider: Address,
        bond_token: Address,
    ) -> Result<(), AssertionError> {
        if Storage::has_config(&env) {
            return Err(AssertionError::AlreadyInitialized);
        }
        owner.require_auth();

        let config = Config {
            owner,
            decider,
            bond_token,
        };
        Storage::set_config(&env, &config);

        Ok(())
    }

    /// Post an assertion, escrowing `reward` for whoever resolves it.
    /// Without explicit bounds the dispute window opens now and runs for
    /// `DISPUTE_WINDOW` seconds.
    pub fn assert_event(
        env: Env,
        asserter: Address,
        description: String,
        reward: i128,
        start_time: Option<u64>,
        end_time: Option<u64>,
    ) -> Result<(), AssertionError> {
        let config = Storage::get_config(&env)?;
        asserter.require_auth();

        if Storage::has_assertion(&env, &asserter, &description) {
            return Err(AssertionError::AssertionExists);
        }

        let now = env.ledger().timestamp();
        let start = start_time.unwrap_or(now);
        let end = end_time.unwrap_or(start + DISPUTE_WINDOW);
        if end <= start || end <= now {
            return Err(AssertionError::InvalidWindow);
        }

        let token_client = token::Client::new(&env, &config.bond_token);
        token_client.transfer(&asserter, &env.current_contract_address(), &reward);

        let assertion = Assertion {
            asserter: asserter.clone(),
            description: description.clone(),
            reward,
            start_time: start,
            end_time: end,
            proposer: None,
            proposed_outcome: false,
            disputer: None,
            resolved_outcome: false,
            winner: None,
            settled: false,
            claimed: false,
        };
        Storage::set_assertion(&env, &assertion);

        env.events()
            .publish((EVT_ASSERT, asserter), (description, reward));

        Ok(())
    }

    /// Bond an outcome for an open assertion.
    pub fn propose_outcome(
        env: Env,
        proposer: Address,
        asserter: Address,
        description: String,
        outcome: bool,
        bond: i128,
    ) -> Result<(), AssertionError> {
        let config = Storage::get_config(&env)?;
        proposer.require_auth();

        let mut assertion = Storage::get_assertion(&env, &asserter, &description)
            .ok_or(AssertionError::AssertionNotFound)?;

        if bond != FIXED_BOND {
            return Err(AssertionError::IncorrectBond);
        }
        if assertion.proposer.is_some() {
            return Err(AssertionError::AssertionProposed);
        }
        if env.ledger().timestamp() > assertion.end_time {
            return Err(AssertionError::DisputeWindowClosed);
        }

        let token_client = token::Client::new(&env, &config.bond_token);
        token_client.transfer(&proposer, &env.current_contract_address(), &bond);

        assertion.proposer = Some(proposer.clone());
        assertion.proposed_outcome = outcome;
        Storage::set_assertion(&env, &assertion);

        env.events()
            .publish((EVT_PROPOSE, asserter, proposer), (description, outcome));

        Ok(())
    }

    /// Bond a challenge against the proposed outcome. Allowed up to and
    /// including the window's end second.
    pub fn dispute_outcome(
        env: Env,
        disputer: Address,
        asserter: Address,
        description: String,
        bond: i128,
    ) -> Result<(), AssertionError> {
        let config = Storage::get_config(&env)?;
        disputer.require_auth();

        let mut assertion = Storage::get_assertion(&env, &asserter, &description)
            .ok_or(AssertionError::AssertionNotFound)?;

        if assertion.proposer.is_none() {
            return Err(AssertionError::NoProposal);
        }
        if assertion.disputer.is_some() {
            return Err(AssertionError::ProposalDisputed);
        }
        if env.ledger().timestamp() > assertion.end_time {
            return Err(AssertionError::DisputeWindowClosed);
        }
        if bond != FIXED_BOND {
            return Err(AssertionError::IncorrectBond);
        }

        let token_client = token::Client::new(&env, &config.bond_token);
        token_client.transfer(&disputer, &env.current_contract_address(), &bond);

        assertion.disputer = Some(disputer.clone());
        Storage::set_assertion(&env, &assertion);

        env.events()
            .publish((EVT_DISPUTE, asserter, disputer), description);

        Ok(())
    }

    /// Decider-only resolution of a disputed assertion. The winner is the
    /// proposer when the resolution matches the proposed outcome, the
    /// disputer otherwise.
    pub fn settle_dispute(
        env: Env,
        decider: Address,
        asserter: Address,
        description: String,
        resolved_outcome: bool,
    ) -> Result<(), AssertionError> {
        let config = Storage::get_config(&env)?;
        decider.require_auth();
        if decider != config.decider {
            return Err(AssertionError::OnlyDecider);
        }

        let mut assertion = Storage::get_assertion(&env, &asserter, &description)
            .ok_or(AssertionError::AssertionNotFound)?;

        if assertion.disputer.is_none() || assertion.settled {
            return Err(AssertionError::NotDisputedAssertion);
        }

        let winner = if resolved_outcome == assertion.proposed_outcome {
            assertion.proposer.clone()
        } else {
            assertion.disputer.clone()
        };

        assertion.resolved_outcome = resolved_outcome;
        assertion.winner = winner.clone();
        assertion.settled = true;
        Storage::set_assertion(&env, &assertion);

        env.events().publish(
            (EVT_SETTLE, asserter),
            (description, resolved_outcome, winner),
        );

        Ok(())
    }

    /// Pay the proposer of an uncontested outcome once the window closes:
    /// `reward + FIXED_BOND - DECIDER_FEE`.
    pub fn claim_undisputed_reward(
        env: Env,
        asserter: Address,
        description: String,
    ) -> Result<(), AssertionError> {
        let config = Storage::get_config(&env)?;

        let mut assertion = Storage::get_assertion(&env, &asserter, &description)
            .ok_or(AssertionError::AssertionNotFound)?;

        if assertion.claimed {
            return Err(AssertionError::AlreadyClaimed);
        }
        let proposer = assertion
            .proposer
            .clone()
            .ok_or(AssertionError::NoProposal)?;
        if assertion.disputer.is_some() {
            return Err(AssertionError::ProposalDisputed);
        }
        if env.ledger().timestamp() <= assertion.end_time {
            return Err(AssertionError::DeadlineNotMet);
        }

        assertion.claimed = true;
        Storage::set_assertion(&env, &assertion);
        Storage::set_accrued_fees(&env, Storage::get_accrued_fees(&env) + DECIDER_FEE);

        let payout = assertion.reward + FIXED_BOND - DECIDER_FEE;
        let token_client = token::Client::new(&env, &config.bond_token);
        token_client.transfer(&env.current_contract_address(), &proposer, &payout);

        env.events()
            .publish((EVT_CLAIM, asserter, proposer), (description, payout));

        Ok(())
    }

    /// Pay the settlement winner: `reward + 2 * FIXED_BOND - DECIDER_FEE`
    /// (the loser's bond is forfeited to the winner).
    pub fn claim_disputed_reward(
        env: Env,
        asserter: Address,
        description: String,
    ) -> Result<(), AssertionError> {
        let config = Storage::get_config(&env)?;

        let mut assertion = Storage::get_assertion(&env, &asserter, &description)
            .ok_or(AssertionError::AssertionNotFound)?;

        if assertion.claimed {
            return Err(AssertionError::AlreadyClaimed);
        }
        if !assertion.settled {
            return Err(AssertionError::AwaitingDecider);
        }
        let winner = assertion
            .winner
            .clone()
            .ok_or(AssertionError::AwaitingDecider)?;

        assertion.claimed = true;
        Storage::set_assertion(&env, &assertion);
        Storage::set_accrued_fees(&env, Storage::get_accrued_fees(&env) + DECIDER_FEE);

        let payout = assertion.reward + 2 * FIXED_BOND - DECIDER_FEE;
        let token_client = token::Client::new(&env, &config.bond_token);
        token_client.transfer(&env.current_contract_address(), &winner, &payout);

        env.events()
            .publish((EVT_CLAIM, asserter, winner), (description, payout));

        Ok(())
    }

    /// Return the escrowed reward to the asserter when nobody proposed
    /// before the window closed.
    pub fn claim_refund(
        env: Env,
        asserter: Address,
        description: String,
    ) -> Result<(), AssertionError> {
        let config = Storage::get_config(&env)?;

        let mut assertion = Storage::get_assertion(&env, &asserter, &description)
            .ok_or(AssertionError::AssertionNotFound)?;

        if assertion.claimed {
            return Err(AssertionError::AlreadyClaimed);
        }
        if assertion.proposer.is_some() {
            return Err(AssertionError::AssertionProposed);
        }
        if env.ledger().timestamp() <= assertion.end_time {
            return Err(AssertionError::DeadlineNotMet);
        }

        assertion.claimed = true;
        Storage::set_assertion(&env, &assertion);

        let token_client = token::Client::new(&env, &config.bond_token);
        token_client.transfer(
            &env.current_contract_address(),
            &assertion.asserter,
            &assertion.reward,
        );

        env.events().publish(
            (EVT_REFUND, assertion.asserter.clone()),
            (description, assertion.reward),
        );

        Ok(())
    }

    /// Derived state, never stored. A proposed assertion whose window has
    /// elapsed undisputed reads as Settled even though nobody settled it.
    pub fn get_state(env: Env, asserter: Address, description: String) -> AssertionState {
        let assertion = match Storage::get_assertion(&env, &asserter, &description) {
            Some(assertion) => assertion,
            None => return AssertionState::Invalid,
        };

        if assertion.settled || assertion.claimed {
            return AssertionState::Settled;
        }
        if assertion.disputer.is_some() {
            return AssertionState::Disputed;
        }
        if assertion.proposer.is_some() {
            if env.ledger().timestamp() > assertion.end_time {
                return AssertionState::Settled;
            }
            return AssertionState::Proposed;
        }
        AssertionState::Asserted
    }

    pub fn get_assertion(
        env: Env,
        asserter: Address,
        description: String,
    ) -> Option<Assertion> {
        Storage::get_assertion(&env, &asserter, &description)
    }

    pub fn set_decider(env: Env, caller: Address, decider: Address) -> Result<(), AssertionError> {
        let mut config = Storage::get_config(&env)?;
        caller.require_auth();
        if caller != config.owner {
            return Err(AssertionError::OnlyOwner);
        }

        config.decider = decider;
        Storage::set_config(&env, &config);
        Ok(())
    }

    /// Sweep the retained decider fees. Returns the amount withdrawn.
    pub fn withdraw_fees(env: Env, decider: Address) -> Result<i128, AssertionError> {
        let config = Storage::get_config(&env)?;
        decider.require_auth();
        if decider != config.decider {
            return Err(AssertionError::OnlyDecider);
        }

        let amount = Storage::get_accrued_fees(&env);
        if amount > 0 {
            Storage::set_accrued_fees(&env, 0);
            let token_client = token::Client::new(&env, &config.bond_token);
            token_client.transfer(&env.current_contract_address(), &decider, &amount);
        }

        Ok(amount)
    }

    pub fn get_owner(env: Env) -> Result<Address, AssertionError> {
        Ok(Storage::get_config(&env)?.owner)
    }

    pub fn get_decider(env: Env) -> Result<Address, AssertionError> {
        Ok(Storage::get_config(&env)?.decider)
    }

    pub fn dispute_window() -> u64 {
        DISPUTE_WINDOW
    }

    pub fn fixed_bond() -> i128 {
        FIXED_BOND
    }

    pub fn decider_fee() -> i128 {
        DECIDER_FEE
    }
}
