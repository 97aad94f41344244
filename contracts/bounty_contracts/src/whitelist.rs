use soroban_sdk::{contract, contractimpl, contracttype, symbol_short, Address, Env, Vec};

use crate::{events, Error};

#[contracttype]
#[derive(Clone)]
enum DataKey {
    Owner,
    TokenLimit,
    Tokens,
}

fn read_owner(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(Error::NotInitialized)
}

fn require_owner_auth(env: &Env) -> Result<Address, Error> {
    let owner = read_owner(env)?;
    owner.require_auth();
    Ok(owner)
}

fn read_tokens(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::Tokens)
        .unwrap_or(Vec::new(env))
}

fn read_token_limit(env: &Env) -> Result<u32, Error> {
    env.storage()
        .instance()
        .get(&DataKey::TokenLimit)
        .ok_or(Error::NotInitialized)
}

/// Allow-list of fungible tokens the deposit manager accepts, bounded in size.
#[contract]
pub struct TokenWhitelist;

#[contractimpl]
impl TokenWhitelist {
    pub fn initialize(env: Env, owner: Address, token_limit: u32) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Owner) {
            return Err(Error::AlreadyInitialized);
        }
        if token_limit == 0 {
            return Err(Error::InvalidAmount);
        }
        owner.require_auth();
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::TokenLimit, &token_limit);
        env.storage().instance().set(&DataKey::Tokens, &Vec::<Address>::new(&env));
        Ok(())
    }

    pub fn add_token(env: Env, token: Address) -> Result<(), Error> {
        require_owner_auth(&env)?;
        let mut tokens = read_tokens(&env);
        if tokens.iter().any(|t| t == token) {
            return Err(Error::TokenAlreadyWhitelisted);
        }
        if tokens.len() >= read_token_limit(&env)? {
            return Err(Error::TokenLimitReached);
        }
        tokens.push_back(token.clone());
        env.storage().instance().set(&DataKey::Tokens, &tokens);
        events::token_whitelisted(&env, &token);
        Ok(())
    }

    pub fn remove_token(env: Env, token: Address) -> Result<(), Error> {
        require_owner_auth(&env)?;
        let tokens = read_tokens(&env);
        let mut remaining = Vec::new(&env);
        for existing in tokens.iter() {
            if existing != token {
                remaining.push_back(existing);
            }
        }
        if remaining.len() == tokens.len() {
            return Err(Error::TokenNotWhitelisted);
        }
        env.storage().instance().set(&DataKey::Tokens, &remaining);
        events::token_removed(&env, &token);
        Ok(())
    }

    /// Lowering the limit below the current count is rejected.
    pub fn set_token_limit(env: Env, token_limit: u32) -> Result<(), Error> {
        require_owner_auth(&env)?;
        if token_limit == 0 {
            return Err(Error::InvalidAmount);
        }
        if token_limit < read_tokens(&env).len() {
            return Err(Error::TokenLimitReached);
        }
        env.storage().instance().set(&DataKey::TokenLimit, &token_limit);
        Ok(())
    }

    pub fn transfer_ownership(env: Env, new_owner: Address) -> Result<(), Error> {
        require_owner_auth(&env)?;
        env.storage().instance().set(&DataKey::Owner, &new_owner);
        events::config_changed(
            &env,
            symbol_short!("whitelist"),
            symbol_short!("owner"),
            &new_owner,
        );
        Ok(())
    }

    pub fn is_whitelisted(env: Env, token: Address) -> bool {
        read_tokens(&env).iter().any(|t| t == token)
    }

    pub fn tokens(env: Env) -> Vec<Address> {
        read_tokens(&env)
    }

    pub fn token_count(env: Env) -> u32 {
        read_tokens(&env).len()
    }

    pub fn token_limit(env: Env) -> Result<u32, Error> {
        read_token_limit(&env)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        read_owner(&env)
    }
}
