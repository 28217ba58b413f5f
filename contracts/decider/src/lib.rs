#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, IntoVal,
    String, Symbol,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum DeciderError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotArbiter = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeciderConfig {
    pub arbiter: Address,
    pub oracle: Address,
}

/// Minimal arbiter wired into the optimistic oracle via `set_decider`.
/// The oracle trusts this contract's address; the contract trusts its
/// configured arbiter.
#[contract]
pub struct Decider;

#[contractimpl]
impl Decider {
    pub fn initialize(env: Env, arbiter: Address, oracle: Address) -> Result<(), DeciderError> {
        if env.storage().instance().has(&symbol_short!("config")) {
            return Err(DeciderError::AlreadyInitialized);
        }
        arbiter.require_auth();

        let config = DeciderConfig { arbiter, oracle };
        env.storage().instance().set(&symbol_short!("config"), &config);

        Ok(())
    }

    /// Forward the arbiter's verdict to the oracle. The oracle sees this
    /// contract's address as the settling decider.
    pub fn settle(
        env: Env,
        caller: Address,
        asserter: Address,
        description: String,
        outcome: bool,
    ) -> Result<(), DeciderError> {
        let config = Self::config(&env)?;
        caller.require_auth();
        if caller != config.arbiter {
            return Err(DeciderError::NotArbiter);
        }

        let settle_args = (
            env.current_contract_address(),
            asserter,
            description,
            outcome,
        );
        env.invoke_contract::<()>(
            &config.oracle,
            &Symbol::new(&env, "settle_dispute"),
            settle_args.into_val(&env),
        );

        Ok(())
    }

    pub fn get_arbiter(env: Env) -> Result<Address, DeciderError> {
        Ok(Self::config(&env)?.arbiter)
    }

    pub fn get_oracle(env: Env) -> Result<Address, DeciderError> {
        Ok(Self::config(&env)?.oracle)
    }

    fn config(env: &Env) -> Result<DeciderConfig, DeciderError> {
        env.storage()
            .instance()
            .get(&symbol_short!("config"))
            .ok_or(DeciderError::NotInitialized)
    }
}
