#![no_std]

use soroban_sdk::{
    contract, contractimpl, contractmeta, symbol_short, token, Address, Env, IntoVal, Symbol, Vec,
};

mod storage;
mod types;

use storage::Storage;
use types::{Config, Node, OracleError};

contractmeta!(
    key = "Description",
    val = "Stake-weighted price oracle with staleness slashing and freshness rewards"
);

/// Stake required to register and to keep reporting.
pub const MINIMUM_STAKE: i128 = 100_000_000;
/// A report older than this many seconds no longer counts as fresh.
pub const STALE_DATA_WINDOW: u64 = 10;
/// Penalty debited from a stale node per validation pass.
pub const SLASH_AMOUNT: i128 = 10_000_000;
/// Share of the pass's total penalties paid to whoever ran the pass.
pub const SLASHER_REWARD_PERCENTAGE: i128 = 10;
/// Reward tokens credited to a fresh node per validation pass.
pub const NODE_REWARD_AMOUNT: i128 = 100_000_000;

const EVT_REGISTER: Symbol = symbol_short!("register");
const EVT_REPORT: Symbol = symbol_short!("report");
const EVT_SLASH: Symbol = symbol_short!("slash");
const EVT_REWARD: Symbol = symbol_short!("reward");
const EVT_VALIDATE: Symbol = symbol_short!("validate");
const EVT_CLAIM: Symbol = symbol_short!("claim");

#[contract]
pub struct StakingOracle;

#[contractimpl]
impl StakingOracle {
    pub fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        reward_token: Address,
    ) -> Result<(), OracleError> {
        if Storage::has_config(&env) {
            return Err(OracleError::AlreadyInitialized);
        }
        admin.require_auth();

        let config = Config {
            admin,
            stake_token,
            reward_token,
        };
        Storage::set_config(&env, &config);

        Ok(())
    }

    /// Register the caller as a reporting node, escrowing `stake`.
    /// An initial price, when given, counts as the node's first report.
    pub fn register_node(
        env: Env,
        node: Address,
        stake: i128,
        initial_price: Option<i128>,
    ) -> Result<(), OracleError> {
        let config = Storage::get_config(&env)?;
        node.require_auth();

        if stake < MINIMUM_STAKE {
            return Err(OracleError::InsufficientStake);
        }
        if Storage::has_node(&env, &node) {
            return Err(OracleError::AlreadyRegistered);
        }

        let mut record = Node {
            address: node.clone(),
            staked_amount: stake,
            last_reported_price: 0,
            last_reported_timestamp: 0,
            last_claimed_timestamp: 0,
            accrued_rewards: 0,
        };

        if let Some(price) = initial_price {
            record.last_reported_price = price;
            record.last_reported_timestamp = env.ledger().timestamp();
        }

        let token_client = token::Client::new(&env, &config.stake_token);
        token_client.transfer(&node, &env.current_contract_address(), &stake);

        Storage::set_node(&env, &record);
        Storage::push_node_address(&env, &node);

        env.events()
            .publish((EVT_REGISTER, node.clone()), stake);
        if let Some(price) = initial_price {
            env.events().publish((EVT_REPORT, node), price);
        }

        Ok(())
    }

    /// Overwrite the caller's last report. A node slashed below the
    /// minimum stake is locked out until restaked.
    pub fn report_price(env: Env, node: Address, price: i128) -> Result<(), OracleError> {
        node.require_auth();

        let mut record = Storage::get_node(&env, &node).ok_or(OracleError::NotRegistered)?;
        if record.staked_amount < MINIMUM_STAKE {
            return Err(OracleError::InsufficientStake);
        }

        record.last_reported_price = price;
        record.last_reported_timestamp = env.ledger().timestamp();
        Storage::set_node(&env, &record);

        env.events().publish((EVT_REPORT, node), price);

        Ok(())
    }

    /// Median over the fresh reports, recomputed from ledger state on
    /// every call. Even cardinality takes the truncating mean of the two
    /// middle values after a stable ascending sort.
    pub fn get_price(env: Env) -> Result<i128, OracleError> {
        let now = env.ledger().timestamp();
        let addresses = Storage::get_node_addresses(&env);

        let mut fresh: Vec<i128> = Vec::new(&env);
        for address in addresses.iter() {
            if let Some(node) = Storage::get_node(&env, &address) {
                if Self::is_fresh(&node, now) {
                    // Ties keep registration order
                    let mut i = 0;
                    while i < fresh.len() {
                        if fresh.get_unchecked(i) > node.last_reported_price {
                            break;
                        }
                        i += 1;
                    }
                    fresh.insert(i, node.last_reported_price);
                }
            }
        }

        if fresh.is_empty() {
            return Err(OracleError::NoValidPrices);
        }

        let len = fresh.len();
        let mid = len / 2;
        if len % 2 == 1 {
            Ok(fresh.get_unchecked(mid))
        } else {
            Ok((fresh.get_unchecked(mid - 1) + fresh.get_unchecked(mid)) / 2)
        }
    }

    pub fn get_node_addresses(env: Env) -> Vec<Address> {
        Storage::get_node_addresses(&env)
    }

    pub fn get_node(env: Env, address: Address) -> Option<Node> {
        Storage::get_node(&env, &address)
    }

    /// Maintenance pass, callable by anyone. Stale nodes are slashed
    /// (capped at remaining stake), fresh nodes accrue the fixed reward,
    /// and the caller is paid a cut of the total penalties out of the
    /// slashed escrow.
    pub fn validate_nodes(env: Env, caller: Address) -> Result<(), OracleError> {
        let config = Storage::get_config(&env)?;
        caller.require_auth();

        let now = env.ledger().timestamp();
        let addresses = Storage::get_node_addresses(&env);
        let mut total_slashed: i128 = 0;

        for address in addresses.iter() {
            let mut node = match Storage::get_node(&env, &address) {
                Some(node) => node,
                None => continue,
            };

            if Self::is_fresh(&node, now) {
                node.accrued_rewards += NODE_REWARD_AMOUNT;
                Storage::set_node(&env, &node);
                env.events()
                    .publish((EVT_REWARD, address), NODE_REWARD_AMOUNT);
            } else {
                let penalty = if node.staked_amount < SLASH_AMOUNT {
                    node.staked_amount
                } else {
                    SLASH_AMOUNT
                };
                if penalty > 0 {
                    node.staked_amount -= penalty;
                    total_slashed += penalty;
                    Storage::set_node(&env, &node);
                    env.events().publish((EVT_SLASH, address), penalty);
                }
            }
        }

        let slasher_cut = total_slashed * SLASHER_REWARD_PERCENTAGE / 100;
        if slasher_cut > 0 {
            let token_client = token::Client::new(&env, &config.stake_token);
            token_client.transfer(&env.current_contract_address(), &caller, &slasher_cut);
        }

        env.events()
            .publish((EVT_VALIDATE, caller), (total_slashed, slasher_cut));

        Ok(())
    }

    /// Mint out the caller's accrued validation rewards.
    pub fn claim_reward(env: Env, node: Address) -> Result<(), OracleError> {
        let config = Storage::get_config(&env)?;
        node.require_auth();

        let mut record = Storage::get_node(&env, &node).ok_or(OracleError::NotRegistered)?;
        let amount = record.accrued_rewards;
        if amount == 0 {
            return Err(OracleError::NothingToClaim);
        }

        record.accrued_rewards = 0;
        record.last_claimed_timestamp = env.ledger().timestamp();
        Storage::set_node(&env, &record);

        let mint_args = (env.current_contract_address(), node.clone(), amount);
        env.invoke_contract::<()>(
            &config.reward_token,
            &Symbol::new(&env, "mint"),
            mint_args.into_val(&env),
        );

        env.events().publish((EVT_CLAIM, node), amount);

        Ok(())
    }

    pub fn minimum_stake() -> i128 {
        MINIMUM_STAKE
    }

    pub fn stale_data_window() -> u64 {
        STALE_DATA_WINDOW
    }

    pub fn slash_amount() -> i128 {
        SLASH_AMOUNT
    }

    pub fn slasher_reward_percentage() -> i128 {
        SLASHER_REWARD_PERCENTAGE
    }

    pub fn node_reward_amount() -> i128 {
        NODE_REWARD_AMOUNT
    }

    // A node that never reported is stale. Both the median and the
    // validation pass use this one predicate against a single `now`.
    fn is_fresh(node: &Node, now: u64) -> bool {
        node.last_reported_timestamp > 0
            && now <= node.last_reported_timestamp + STALE_DATA_WINDOW
    }
}

#[cfg(test)]
mod test;
