#![cfg(test)]

use super::*;
use reward_token::{RewardToken, RewardTokenClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env, String,
};

struct Setup<'a> {
    oracle: StakingOracleClient<'a>,
    oracle_id: Address,
    stake_token: TokenClient<'a>,
    stake_admin: StellarAssetClient<'a>,
    orc: RewardTokenClient<'a>,
}

fn setup(env: &Env) -> Setup {
    env.ledger().with_mut(|li| {
        li.timestamp = 1000;
    });

    let admin = Address::generate(env);
    let token_admin = Address::generate(env);

    let sac = env.register_stellar_asset_contract_v2(token_admin.clone());
    let stake_token_id = sac.address();
    let stake_token = TokenClient::new(env, &stake_token_id);
    let stake_admin = StellarAssetClient::new(env, &stake_token_id);

    let orc_id = env.register_contract(None, RewardToken);
    let orc = RewardTokenClient::new(env, &orc_id);
    orc.initialize(
        &admin,
        &String::from_str(env, "Oracle Reward Coin"),
        &String::from_str(env, "ORC"),
        &7,
    );

    let oracle_id = env.register_contract(None, StakingOracle);
    let oracle = StakingOracleClient::new(env, &oracle_id);
    oracle.initialize(&admin, &stake_token_id, &orc_id);

    // The oracle mints validation rewards
    orc.authorize_minter(&oracle_id);

    Setup {
        oracle,
        oracle_id,
        stake_token,
        stake_admin,
        orc,
    }
}

fn funded_node(env: &Env, s: &Setup) -> Address {
    let node = Address::generate(env);
    s.stake_admin.mint(&node, &(MINIMUM_STAKE * 10));
    node
}

#[test]
fn test_initialize_once() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let admin = Address::generate(&env);
    let token = Address::generate(&env);
    let res = s.oracle.try_initialize(&admin, &token, &token);
    assert_eq!(res, Err(Ok(OracleError::AlreadyInitialized)));
}

#[test]
fn test_register_node() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let node = funded_node(&env, &s);
    s.oracle.register_node(&node, &MINIMUM_STAKE, &Some(1500));

    let record = s.oracle.get_node(&node).unwrap();
    assert_eq!(record.staked_amount, MINIMUM_STAKE);
    assert_eq!(record.last_reported_price, 1500);
    assert_eq!(record.last_reported_timestamp, 1000);
    assert_eq!(record.accrued_rewards, 0);

    // Stake is escrowed in the contract
    assert_eq!(s.stake_token.balance(&s.oracle_id), MINIMUM_STAKE);

    let addresses = s.oracle.get_node_addresses();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses.get_unchecked(0), node);

    let res = s.oracle.try_register_node(&node, &MINIMUM_STAKE, &None);
    assert_eq!(res, Err(Ok(OracleError::AlreadyRegistered)));
}

#[test]
fn test_register_without_initial_price() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let node = funded_node(&env, &s);
    s.oracle.register_node(&node, &MINIMUM_STAKE, &None);

    let record = s.oracle.get_node(&node).unwrap();
    assert_eq!(record.last_reported_price, 0);
    assert_eq!(record.last_reported_timestamp, 0);

    // Never reported, so no valid price exists
    let res = s.oracle.try_get_price();
    assert_eq!(res, Err(Ok(OracleError::NoValidPrices)));
}

#[test]
fn test_register_insufficient_stake() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let node = funded_node(&env, &s);
    let res = s
        .oracle
        .try_register_node(&node, &(MINIMUM_STAKE - 1), &None);
    assert_eq!(res, Err(Ok(OracleError::InsufficientStake)));
}

#[test]
fn test_report_requires_registration() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let stranger = Address::generate(&env);
    let res = s.oracle.try_report_price(&stranger, &1500);
    assert_eq!(res, Err(Ok(OracleError::NotRegistered)));
}

#[test]
fn test_median_odd_and_even() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let node1 = funded_node(&env, &s);
    let node2 = funded_node(&env, &s);
    let node3 = funded_node(&env, &s);
    s.oracle.register_node(&node1, &MINIMUM_STAKE, &Some(1450));
    s.oracle.register_node(&node2, &MINIMUM_STAKE, &Some(1500));
    s.oracle.register_node(&node3, &MINIMUM_STAKE, &Some(1550));

    assert_eq!(s.oracle.get_price(), 1500);

    let node4 = funded_node(&env, &s);
    s.oracle.register_node(&node4, &MINIMUM_STAKE, &Some(1600));

    // Even cardinality: mean of the two middle values
    assert_eq!(s.oracle.get_price(), 1525);
}

#[test]
fn test_median_ignores_report_order() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let node1 = funded_node(&env, &s);
    let node2 = funded_node(&env, &s);
    let node3 = funded_node(&env, &s);
    s.oracle.register_node(&node1, &MINIMUM_STAKE, &Some(1550));
    s.oracle.register_node(&node2, &MINIMUM_STAKE, &Some(1450));
    s.oracle.register_node(&node3, &MINIMUM_STAKE, &Some(1500));

    assert_eq!(s.oracle.get_price(), 1500);
}

#[test]
fn test_stale_reports_excluded() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let node1 = funded_node(&env, &s);
    let node2 = funded_node(&env, &s);
    s.oracle.register_node(&node1, &MINIMUM_STAKE, &Some(1450));
    s.oracle.register_node(&node2, &MINIMUM_STAKE, &Some(1550));

    env.ledger().with_mut(|li| {
        li.timestamp += STALE_DATA_WINDOW + 1;
    });

    // Only node1 refreshes its report
    s.oracle.report_price(&node1, &1600);
    assert_eq!(s.oracle.get_price(), 1600);

    env.ledger().with_mut(|li| {
        li.timestamp += STALE_DATA_WINDOW + 1;
    });

    let res = s.oracle.try_get_price();
    assert_eq!(res, Err(Ok(OracleError::NoValidPrices)));
}

#[test]
fn test_validate_slashes_stale_and_rewards_fresh() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let node1 = funded_node(&env, &s);
    let node2 = funded_node(&env, &s);
    let node3 = funded_node(&env, &s);
    s.oracle.register_node(&node1, &MINIMUM_STAKE, &Some(1450));
    s.oracle.register_node(&node2, &MINIMUM_STAKE, &Some(1500));
    s.oracle.register_node(&node3, &MINIMUM_STAKE, &Some(1550));

    env.ledger().with_mut(|li| {
        li.timestamp += STALE_DATA_WINDOW + 1;
    });
    s.oracle.report_price(&node1, &1600);

    let slasher = Address::generate(&env);
    s.oracle.validate_nodes(&slasher);

    // Fresh node keeps its stake and accrues the reward
    let record1 = s.oracle.get_node(&node1).unwrap();
    assert_eq!(record1.staked_amount, MINIMUM_STAKE);
    assert_eq!(record1.accrued_rewards, NODE_REWARD_AMOUNT);

    // Stale nodes lose exactly the slash amount and accrue nothing
    let record2 = s.oracle.get_node(&node2).unwrap();
    let record3 = s.oracle.get_node(&node3).unwrap();
    assert_eq!(record2.staked_amount, MINIMUM_STAKE - SLASH_AMOUNT);
    assert_eq!(record3.staked_amount, MINIMUM_STAKE - SLASH_AMOUNT);
    assert_eq!(record2.accrued_rewards, 0);
    assert_eq!(record3.accrued_rewards, 0);

    // Slasher is paid its cut of the total penalties
    let expected_cut = 2 * SLASH_AMOUNT * SLASHER_REWARD_PERCENTAGE / 100;
    assert_eq!(s.stake_token.balance(&slasher), expected_cut);
}

#[test]
fn test_slash_capped_at_remaining_stake() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let node = funded_node(&env, &s);
    s.oracle.register_node(&node, &MINIMUM_STAKE, &Some(1500));

    let slasher = Address::generate(&env);
    let passes = MINIMUM_STAKE / SLASH_AMOUNT;
    for _ in 0..passes {
        env.ledger().with_mut(|li| {
            li.timestamp += STALE_DATA_WINDOW + 1;
        });
        s.oracle.validate_nodes(&slasher);
    }

    // Fully exhausted but the record persists
    let record = s.oracle.get_node(&node).unwrap();
    assert_eq!(record.staked_amount, 0);

    // A further pass has nothing left to take
    let paid_so_far = s.stake_token.balance(&slasher);
    env.ledger().with_mut(|li| {
        li.timestamp += STALE_DATA_WINDOW + 1;
    });
    s.oracle.validate_nodes(&slasher);
    assert_eq!(s.oracle.get_node(&node).unwrap().staked_amount, 0);
    assert_eq!(s.stake_token.balance(&slasher), paid_so_far);
}

#[test]
fn test_slashed_below_minimum_locked_out() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let node = funded_node(&env, &s);
    s.oracle.register_node(&node, &MINIMUM_STAKE, &Some(1500));

    env.ledger().with_mut(|li| {
        li.timestamp += STALE_DATA_WINDOW + 1;
    });
    let slasher = Address::generate(&env);
    s.oracle.validate_nodes(&slasher);

    let record = s.oracle.get_node(&node).unwrap();
    assert!(record.staked_amount < MINIMUM_STAKE);

    let res = s.oracle.try_report_price(&node, &1500);
    assert_eq!(res, Err(Ok(OracleError::InsufficientStake)));
}

#[test]
fn test_claim_reward_mints_accrual() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let node = funded_node(&env, &s);
    s.oracle.register_node(&node, &MINIMUM_STAKE, &Some(1500));

    let slasher = Address::generate(&env);
    s.oracle.validate_nodes(&slasher);
    s.oracle.validate_nodes(&slasher);

    let record = s.oracle.get_node(&node).unwrap();
    assert_eq!(record.accrued_rewards, 2 * NODE_REWARD_AMOUNT);

    s.oracle.claim_reward(&node);
    assert_eq!(s.orc.balance(&node), 2 * NODE_REWARD_AMOUNT);

    let record = s.oracle.get_node(&node).unwrap();
    assert_eq!(record.accrued_rewards, 0);
    assert_eq!(record.last_claimed_timestamp, 1000);

    // Nothing accrued since the claim
    let res = s.oracle.try_claim_reward(&node);
    assert_eq!(res, Err(Ok(OracleError::NothingToClaim)));
}

#[test]
fn test_claim_reward_requires_registration() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    let stranger = Address::generate(&env);
    let res = s.oracle.try_claim_reward(&stranger);
    assert_eq!(res, Err(Ok(OracleError::NotRegistered)));
}

#[test]
fn test_node_addresses_in_registration_order() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    assert_eq!(s.oracle.get_node_addresses().len(), 0);

    let node1 = funded_node(&env, &s);
    let node2 = funded_node(&env, &s);
    let node3 = funded_node(&env, &s);
    s.oracle.register_node(&node1, &MINIMUM_STAKE, &None);
    s.oracle.register_node(&node2, &MINIMUM_STAKE, &None);
    s.oracle.register_node(&node3, &MINIMUM_STAKE, &None);

    let addresses = s.oracle.get_node_addresses();
    assert_eq!(addresses.len(), 3);
    assert_eq!(addresses.get_unchecked(0), node1);
    assert_eq!(addresses.get_unchecked(1), node2);
    assert_eq!(addresses.get_unchecked(2), node3);
}

#[test]
fn test_constants() {
    let env = Env::default();
    env.mock_all_auths();
    let s = setup(&env);

    assert_eq!(s.oracle.minimum_stake(), MINIMUM_STAKE);
    assert_eq!(s.oracle.stale_data_window(), STALE_DATA_WINDOW);
    assert_eq!(s.oracle.slash_amount(), SLASH_AMOUNT);
    assert_eq!(s.oracle.slasher_reward_percentage(), SLASHER_REWARD_PERCENTAGE);
    assert_eq!(s.oracle.node_reward_amount(), NODE_REWARD_AMOUNT);
}
