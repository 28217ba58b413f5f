#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, String,
};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TokenError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotAuthorized = 3,
    InvalidAmount = 4,
    InsufficientBalance = 5,
}

#[contracttype]
pub enum DataKey {
    Admin,
    Metadata,
    TotalSupply,
    Balance(Address),
    Minter(Address),
}

#[contract]
pub struct RewardToken;

#[contractimpl]
impl RewardToken {
    pub fn initialize(
        env: Env,
        admin: Address,
        name: String,
        symbol: String,
        decimals: u32,
    ) -> Result<(), TokenError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(TokenError::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(
            &DataKey::Metadata,
            &TokenMetadata {
                name,
                symbol,
                decimals,
            },
        );
        env.storage().instance().set(&DataKey::TotalSupply, &0i128);

        Ok(())
    }

    /// Allow another address (typically a contract) to mint
    pub fn authorize_minter(env: Env, minter: Address) -> Result<(), TokenError> {
        let admin = Self::admin(&env)?;
        admin.require_auth();

        env.storage()
            .persistent()
            .set(&DataKey::Minter(minter.clone()), &true);
        env.events()
            .publish((symbol_short!("minter"), symbol_short!("add")), minter);
        Ok(())
    }

    pub fn revoke_minter(env: Env, minter: Address) -> Result<(), TokenError> {
        let admin = Self::admin(&env)?;
        admin.require_auth();

        env.storage()
            .persistent()
            .remove(&DataKey::Minter(minter.clone()));
        env.events()
            .publish((symbol_short!("minter"), symbol_short!("remove")), minter);
        Ok(())
    }

    pub fn mint(env: Env, minter: Address, to: Address, amount: i128) -> Result<(), TokenError> {
        minter.require_auth();

        if amount <= 0 {
            return Err(TokenError::InvalidAmount);
        }

        let admin = Self::admin(&env)?;
        let is_minter: bool = env
            .storage()
            .persistent()
            .get(&DataKey::Minter(minter.clone()))
            .unwrap_or(false);
        if minter != admin && !is_minter {
            return Err(TokenError::NotAuthorized);
        }

        let balance = Self::balance(env.clone(), to.clone());
        env.storage()
            .persistent()
            .set(&DataKey::Balance(to.clone()), &(balance + amount));

        let supply: i128 = env
            .storage()
            .instance()
            .get(&DataKey::TotalSupply)
            .unwrap_or(0);
        env.storage()
            .instance()
            .set(&DataKey::TotalSupply, &(supply + amount));

        env.events()
            .publish((symbol_short!("mint"), to), amount);
        Ok(())
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), TokenError> {
        from.require_auth();

        if amount <= 0 {
            return Err(TokenError::InvalidAmount);
        }

        let from_balance = Self::balance(env.clone(), from.clone());
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance);
        }
        let to_balance = Self::balance(env.clone(), to.clone());

        env.storage()
            .persistent()
            .set(&DataKey::Balance(from.clone()), &(from_balance - amount));
        env.storage()
            .persistent()
            .set(&DataKey::Balance(to.clone()), &(to_balance + amount));

        env.events()
            .publish((symbol_short!("transfer"), from, to), amount);
        Ok(())
    }

    pub fn balance(env: Env, address: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(address))
            .unwrap_or(0)
    }

    pub fn total_supply(env: Env) -> i128 {
        env.storage()
            .instance()
            .get(&DataKey::TotalSupply)
            .unwrap_or(0)
    }

    pub fn is_authorized_minter(env: Env, minter: Address) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::Minter(minter))
            .unwrap_or(false)
    }

    pub fn metadata(env: Env) -> Result<TokenMetadata, TokenError> {
        env.storage()
            .instance()
            .get(&DataKey::Metadata)
            .ok_or(TokenError::NotInitialized)
    }

    fn admin(env: &Env) -> Result<Address, TokenError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(TokenError::NotInitialized)
    }
}
