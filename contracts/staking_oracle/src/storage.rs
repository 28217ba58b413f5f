use crate::types::{Config, Node, OracleError};
use soroban_sdk::{symbol_short, Address, Env, Vec};

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

    pub fn get_config(env: &Env) -> Result<Config, OracleError> {
        env.storage()
            .instance()
            .get(&symbol_short!("config"))
            .ok_or(OracleError::NotInitialized)
    }

    pub fn has_node(env: &Env, address: &Address) -> bool {
        env.storage()
            .persistent()
            .has(&(symbol_short!("node"), address.clone()))
    }

    pub fn set_node(env: &Env, node: &Node) {
        env.storage()
            .persistent()
            .set(&(symbol_short!("node"), node.address.clone()), node);
    }

    pub fn get_node(env: &Env, address: &Address) -> Option<Node> {
        env.storage()
            .persistent()
            .get(&(symbol_short!("node"), address.clone()))
    }

    pub fn get_node_addresses(env: &Env) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&symbol_short!("nodes"))
            .unwrap_or(Vec::new(env))
    }

    pub fn push_node_address(env: &Env, address: &Address) {
        let mut addresses = Self::get_node_addresses(env);
        addresses.push_back(address.clone());
        env.storage()
            .persistent()
            .set(&symbol_short!("nodes"), &addresses);
    }
}
