use soroban_sdk::{contract, contractimpl, contracttype, log, symbol_short, Address, BytesN, Env};

use crate::vault::BountyVaultClient;
use crate::whitelist::TokenWhitelistClient;
use crate::{events, lift, Bounty, BountyStatus, Error};

#[contracttype]
#[derive(Clone)]
enum DataKey {
    Admin,
    Vault,
    Whitelist,
}

fn read_address(env: &Env, key: &DataKey) -> Result<Address, Error> {
    env.storage().instance().get(key).ok_or(Error::NotInitialized)
}

fn require_admin_auth(env: &Env) -> Result<(), Error> {
    read_address(env, &DataKey::Admin)?.require_auth();
    Ok(())
}

fn vault_client(env: &Env) -> Result<BountyVaultClient<'_>, Error> {
    Ok(BountyVaultClient::new(env, &read_address(env, &DataKey::Vault)?))
}

fn check_fundable(bounty: &Bounty, funder: &Address) -> Result<(), Error> {
    if bounty.status != BountyStatus::Open {
        return Err(Error::BountyClosed);
    }
    if bounty.permissioned_open && *funder != bounty.issuer {
        return Err(Error::UnauthorizedCaller);
    }
    Ok(())
}

/// Entry point for every deposit and refund. The vault only accepts ledger
/// writes relayed by this contract.
#[contract]
pub struct DepositManager;

#[contractimpl]
impl DepositManager {
    pub fn initialize(
        env: Env,
        admin: Address,
        vault: Address,
        whitelist: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Vault, &vault);
        env.storage().instance().set(&DataKey::Whitelist, &whitelist);
        Ok(())
    }

    pub fn set_vault(env: Env, vault: Address) -> Result<(), Error> {
        require_admin_auth(&env)?;
        env.storage().instance().set(&DataKey::Vault, &vault);
        events::config_changed(&env, symbol_short!("dep_mgr"), symbol_short!("vault"), &vault);
        Ok(())
    }

    pub fn set_whitelist(env: Env, whitelist: Address) -> Result<(), Error> {
        require_admin_auth(&env)?;
        env.storage().instance().set(&DataKey::Whitelist, &whitelist);
        events::config_changed(
            &env,
            symbol_short!("dep_mgr"),
            symbol_short!("whitelist"),
            &whitelist,
        );
        Ok(())
    }

    pub fn vault(env: Env) -> Result<Address, Error> {
        read_address(&env, &DataKey::Vault)
    }

    pub fn whitelist(env: Env) -> Result<Address, Error> {
        read_address(&env, &DataKey::Whitelist)
    }

    pub fn fund_bounty_token(
        env: Env,
        funder: Address,
        bounty: BytesN<32>,
        token: Address,
        amount: i128,
        expiration: u64,
    ) -> Result<BytesN<32>, Error> {
        funder.require_auth();
        let vault = vault_client(&env)?;
        check_fundable(&lift(vault.try_bounty(&bounty))?, &funder)?;

        let whitelist = TokenWhitelistClient::new(&env, &read_address(&env, &DataKey::Whitelist)?);
        if !whitelist.is_whitelisted(&token) {
            log!(&env, "token not whitelisted", token);
            return Err(Error::TokenNotWhitelisted);
        }

        lift(vault.try_receive_funds(
            &env.current_contract_address(),
            &bounty,
            &funder,
            &token,
            &amount,
            &expiration,
        ))
    }

    /// NFTs bypass the whitelist. `tier` reserves the NFT for a tier of a
    /// tiered bounty and is ignored otherwise.
    pub fn fund_bounty_nft(
        env: Env,
        funder: Address,
        bounty: BytesN<32>,
        nft: Address,
        token_id: u32,
        expiration: u64,
        tier: u32,
    ) -> Result<BytesN<32>, Error> {
        funder.require_auth();
        let vault = vault_client(&env)?;
        check_fundable(&lift(vault.try_bounty(&bounty))?, &funder)?;

        lift(vault.try_receive_nft(
            &env.current_contract_address(),
            &bounty,
            &funder,
            &nft,
            &token_id,
            &expiration,
            &tier,
        ))
    }

    pub fn refund_deposit(
        env: Env,
        funder: Address,
        bounty: BytesN<32>,
        deposit_id: BytesN<32>,
    ) -> Result<i128, Error> {
        funder.require_auth();
        lift(vault_client(&env)?.try_refund_deposit(
            &env.current_contract_address(),
            &bounty,
            &funder,
            &deposit_id,
        ))
    }
}
