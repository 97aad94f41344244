use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, Address, BytesN, Env, Vec,
};

use crate::vault::BountyVaultClient;
use crate::{
    events, ids, lift, Bounty, BountyStatus, BountyVariant, CloserData, CompletionTarget, Error,
    TokenAmount,
};

#[contracttype]
#[derive(Clone)]
enum DataKey {
    Admin,
    Vault,
    Oracle,
}

fn read_address(env: &Env, key: &DataKey) -> Result<Address, Error> {
    env.storage().instance().get(key).ok_or(Error::NotInitialized)
}

fn require_admin_auth(env: &Env) -> Result<(), Error> {
    read_address(env, &DataKey::Admin)?.require_auth();
    Ok(())
}

/// Only the configured resolver finalises claims.
fn authorize_claim(env: &Env, caller: &Address) -> Result<(), Error> {
    if *caller != read_address(env, &DataKey::Oracle)? {
        log!(env, "claim rejected for caller", caller.clone());
        return Err(Error::UnauthorizedCaller);
    }
    Ok(())
}

fn check_lifecycle(bounty: &Bounty) -> Result<(), Error> {
    match (bounty.variant, bounty.status) {
        (BountyVariant::TieredPercentage, BountyStatus::Open) => Err(Error::CompetitionNotClosed),
        (BountyVariant::TieredPercentage, BountyStatus::Closed) => Ok(()),
        (_, BountyStatus::Closed) => Err(Error::BountyClosed),
        (_, BountyStatus::Open) => Ok(()),
    }
}

/// The completion gates that must both be set before an invoiced bounty pays.
fn completion_target(env: &Env, bounty: &Bounty, closer_data: &CloserData) -> CompletionTarget {
    match bounty.variant {
        BountyVariant::Atomic => CompletionTarget::Bounty,
        BountyVariant::Ongoing => CompletionTarget::Claim(ids::claimant_id(
            env,
            &closer_data.claimant_handle,
            &closer_data.proof_url,
        )),
        BountyVariant::TieredPercentage | BountyVariant::TieredFixed => {
            CompletionTarget::Tier(closer_data.tier)
        }
    }
}

#[contract]
pub struct ClaimManager;

#[contractimpl]
impl ClaimManager {
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
        Ok(())
    }

    pub fn set_oracle(env: Env, oracle: Address) -> Result<(), Error> {
        require_admin_auth(&env)?;
        env.storage().instance().set(&DataKey::Oracle, &oracle);
        events::config_changed(&env, symbol_short!("claim_mgr"), symbol_short!("oracle"), &oracle);
        Ok(())
    }

    pub fn set_vault(env: Env, vault: Address) -> Result<(), Error> {
        require_admin_auth(&env)?;
        env.storage().instance().set(&DataKey::Vault, &vault);
        events::config_changed(&env, symbol_short!("claim_mgr"), symbol_short!("vault"), &vault);
        Ok(())
    }

    pub fn oracle(env: Env) -> Result<Address, Error> {
        read_address(&env, &DataKey::Oracle)
    }

    pub fn vault(env: Env) -> Result<Address, Error> {
        read_address(&env, &DataKey::Vault)
    }

    /// Pays `closer_data.payout_account` whatever the bounty's variant owes
    /// this claim. Returns the fungible transfers made.
    pub fn claim_bounty(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        closer_data: CloserData,
    ) -> Result<Vec<TokenAmount>, Error> {
        authorize_claim(&env, &caller)?;
        caller.require_auth();
        let vault = BountyVaultClient::new(&env, &read_address(&env, &DataKey::Vault)?);
        let record = lift(vault.try_bounty(&bounty))?;
        check_lifecycle(&record)?;

        if record.invoice_required {
            let target = completion_target(&env, &record, &closer_data);
            let gates = lift(vault.try_completion(&bounty, &target))?;
            if !gates.invoice_complete {
                return Err(Error::InvoiceNotComplete);
            }
            if !gates.supporting_documents_complete {
                return Err(Error::SupportingDocumentsNotComplete);
            }
        }

        lift(vault.try_claim(&env.current_contract_address(), &bounty, &closer_data))
    }
}
