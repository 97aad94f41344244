//! Registry mapping external task ids to bounty instances.
//!
//! The registry is the only caller the vault accepts for minting and for
//! tier and completion bookkeeping. Issuers act on their bounties through it.

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, Address, BytesN, Env, String, Vec,
};

use crate::vault::BountyVaultClient;
use crate::{
    events, lift, Bounty, BountyStatus, BountyVariant, CompletionTarget, Error, InitOperation,
};

#[contracttype]
#[derive(Clone)]
enum DataKey {
    Admin,
    Vault,
    Oracle,
    BountyCount,
    AddressOf(String),
    BountyIdOf(BytesN<32>),
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

fn read_bounty_address(env: &Env, bounty_id: &String) -> Result<BytesN<32>, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::AddressOf(bounty_id.clone()))
        .ok_or(Error::BountyNotFound)
}

/// Resolves `bounty_id` and checks `caller` is its issuer.
fn issuer_bounty(
    env: &Env,
    caller: &Address,
    bounty_id: &String) -> Result<(BytesN<32>,
    Bounty,
), Error> {
    let address = read_bounty_address(env, bounty_id)?;
    let bounty = lift(vault_client(env)?.try_bounty(&address))?;
    if bounty.issuer != *caller {
        return Err(Error::UnauthorizedCaller);
    }
    caller.require_auth();
    Ok((address, bounty))
}

/// Like [`issuer_bounty`], but the resolver may act as well.
fn issuer_or_oracle_bounty(
    env: &Env,
    caller: &Address,
    bounty_id: &String,
) -> Result<BytesN<32>, Error> {
    let address = read_bounty_address(env, bounty_id)?;
    let bounty = lift(vault_client(env)?.try_bounty(&address))?;
    if bounty.issuer != *caller && read_address(env, &DataKey::Oracle)? != *caller {
        return Err(Error::UnauthorizedCaller);
    }
    caller.require_auth();
    Ok(address)
}

#[contract]
pub struct OpenQ;

#[contractimpl]
impl OpenQ {
    pub fn initialize(
        env: Env,
        admin: Address,
        vault: Address,
        oracle: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Vault, &vault);
        env.storage().instance().set(&DataKey::Oracle, &oracle);
        env.storage().instance().set(&DataKey::BountyCount, &0u32);
        Ok(())
    }

    pub fn set_vault(env: Env, vault: Address) -> Result<(), Error> {
        require_admin_auth(&env)?;
        env.storage().instance().set(&DataKey::Vault, &vault);
        events::config_changed(&env, symbol_short!("openq"), symbol_short!("vault"), &vault);
        Ok(())
    }

    pub fn set_oracle(env: Env, oracle: Address) -> Result<(), Error> {
        require_admin_auth(&env)?;
        env.storage().instance().set(&DataKey::Oracle, &oracle);
        events::config_changed(&env, symbol_short!("openq"), symbol_short!("oracle"), &oracle);
        Ok(())
    }

    pub fn vault(env: Env) -> Result<Address, Error> {
        read_address(&env, &DataKey::Vault)
    }

    pub fn oracle(env: Env) -> Result<Address, Error> {
        read_address(&env, &DataKey::Oracle)
    }

    /// Mints a bounty for `bounty_id` with `issuer` as its owner.
    pub fn mint_bounty(
        env: Env,
        issuer: Address,
        bounty_id: String,
        organization: String,
        operation: InitOperation,
    ) -> Result<BytesN<32>, Error> {
        issuer.require_auth();
        if env
            .storage()
            .persistent()
            .has(&DataKey::AddressOf(bounty_id.clone()))
        {
            return Err(Error::BountyAlreadyExists);
        }

        let address = lift(vault_client(&env)?.try_mint(
            &env.current_contract_address(),
            &bounty_id,
            &issuer,
            &organization,
            &operation,
        ))?;
        env.storage()
            .persistent()
            .set(&DataKey::AddressOf(bounty_id.clone()), &address);
        env.storage()
            .persistent()
            .set(&DataKey::BountyIdOf(address.clone()), &bounty_id);

        let count: u32 = env.storage().instance().get(&DataKey::BountyCount).unwrap_or(0);
        let count = count.checked_add(1).ok_or(Error::MathOverflow)?;
        env.storage().instance().set(&DataKey::BountyCount, &count);
        Ok(address)
    }

    pub fn bounty_address(env: Env, bounty_id: String) -> Result<BytesN<32>, Error> {
        read_bounty_address(&env, &bounty_id)
    }

    pub fn bounty_id(env: Env, bounty: BytesN<32>) -> Result<String, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::BountyIdOf(bounty))
            .ok_or(Error::BountyNotFound)
    }

    pub fn bounty_count(env: Env) -> u32 {
        env.storage().instance().get(&DataKey::BountyCount).unwrap_or(0)
    }

    pub fn bounty_is_open(env: Env, bounty_id: String) -> Result<bool, Error> {
        let address = read_bounty_address(&env, &bounty_id)?;
        let bounty = lift(vault_client(&env)?.try_bounty(&address))?;
        Ok(bounty.status == BountyStatus::Open)
    }

    pub fn set_tier_winner(
        env: Env,
        caller: Address,
        bounty_id: String,
        tier: u32,
        winner: String) -> Result<(), Error> {
        let (address, _) = issuer_bounty(&env, &caller, &bounty_id)?;
        lift(vault_client(&env)?.try_set_tier_winner(
            &env.current_contract_address(),
            &address,
            &tier,
            &winner,
        ))
    }

    pub fn set_invoice_complete(
        env: Env,
        caller: Address,
        bounty_id: String,
        target: CompletionTarget,
        complete: bool,
    ) -> Result<(), Error> {
        let address = issuer_or_oracle_bounty(&env, &caller, &bounty_id)?;
        lift(vault_client(&env)?.try_set_invoice_complete(
            &env.current_contract_address(),
            &address,
            &target,
            &complete,
        ))
    }

    pub fn set_supporting_docs_complete(
        env: Env,
        caller: Address,
        bounty_id: String,
        target: CompletionTarget,
        complete: bool,
    ) -> Result<(), Error> {
        let address = issuer_or_oracle_bounty(&env, &caller, &bounty_id)?;
        lift(vault_client(&env)?.try_set_supporting_docs_complete(
            &env.current_contract_address(),
            &address,
            &target,
            &complete,
        ))
    }

    pub fn set_funding_goal(
        env: Env,
        caller: Address,
        bounty_id: String,
        token: Address,
        amount: i128) -> Result<(), Error> {
        let (address, _) = issuer_bounty(&env, &caller, &bounty_id)?;
        lift(vault_client(&env)?.try_set_funding_goal(
            &env.current_contract_address(),
            &address,
            &token,
            &amount,
        ))
    }

    pub fn set_payout(
        env: Env,
        caller: Address,
        bounty_id: String,
        token: Address,
        amount: i128) -> Result<(), Error> {
        let (address, _) = issuer_bounty(&env, &caller, &bounty_id)?;
        lift(vault_client(&env)?.try_set_payout(
            &env.current_contract_address(),
            &address,
            &token,
            &amount,
        ))
    }

    pub fn set_payout_schedule(
        env: Env,
        caller: Address,
        bounty_id: String,
        shares: Vec<i128>) -> Result<(), Error> {
        let (address, _) = issuer_bounty(&env, &caller, &bounty_id)?;
        lift(vault_client(&env)?.try_set_payout_schedule(
            &env.current_contract_address(),
            &address,
            &shares,
        ))
    }

    /// Stops an ongoing bounty from accepting further claims.
    pub fn close_ongoing(env: Env, caller: Address, bounty_id: String) -> Result<(), Error> {
        let (address, bounty) = issuer_bounty(&env, &caller, &bounty_id)?;
        if bounty.variant != BountyVariant::Ongoing {
            return Err(Error::VariantMismatch);
        }
        lift(vault_client(&env)?.try_close(&env.current_contract_address(), &address))
    }

    /// Ends a percentage competition and freezes its pool for tier payouts.
    pub fn close_competition(env: Env, caller: Address, bounty_id: String) -> Result<(), Error> {
        let (address, bounty) = issuer_bounty(&env, &caller, &bounty_id)?;
        if bounty.variant != BountyVariant::TieredPercentage {
            return Err(Error::VariantMismatch);
        }
        lift(vault_client(&env)?.try_close(&env.current_contract_address(), &address))
    }
}
