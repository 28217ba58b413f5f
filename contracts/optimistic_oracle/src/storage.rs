use crate::types::{Assertion, AssertionError, Config};
use soroban_sdk::{symbol_short, Address, Env, String};

pub struct Storage;

impl Storage {
    pub fn has_config(env: &Env) -> bool {
        env.storage().instance().has(&symbol_short!("config"))
    }

    pub fn set_config(env: &Env, config: &Config) {
        env.storage()
            .instance()
            .set(&symbol_short!("config"), config);
    }

    pub fn get_config(env: &Env) -> Result<Config, AssertionError> {
        env.storage()
            .instance()
            .get(&symbol_short!("config"))
            .ok_or(AssertionError::NotInitialized)
    }

    pub fn has_assertion(env: &Env, asserter: &Address, description: &String) -> bool {
        env.storage()
            .persistent()
            .has(&(symbol_short!("assert"), asserter.clone(), description.clone()))
    }

    pub fn set_assertion(env: &Env, assertion: &Assertion) {
        env.storage().persistent().set(
            &(
                symbol_short!("assert"),
                assertion.asserter.clone(),
                assertion.description.clone(),
            ),
            assertion,
        );
    }

    pub fn get_assertion(
        env: &Env,
        asserter: &Address,
        description: &String,
    ) -> Option<Assertion> {
        env.storage()
            .persistent()
            .get(&(symbol_short!("assert"), asserter.clone(), description.clone()))
    }

    pub fn get_accrued_fees(env: &Env) -> i128 {
        env.storage()
            .instance()
            .get(&symbol_short!("fees"))
            .unwrap_or(0)
    }

    pub fn set_accrued_fees(env: &Env, amount: i128) {
        env.storage().instance().set(&symbol_short!("fees"), &amount);
    }
}
