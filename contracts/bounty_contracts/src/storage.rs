use soroban_sdk::{contracttype, Address, BytesN, Env};

use crate::{Bounty, BountyVariant, Error};

/// Storage layout of the [`crate::BountyVault`]. Wiring lives in instance
/// storage, everything keyed by a bounty address in persistent storage.
#[contracttype]
#[derive(Clone)]
pub(crate) enum DataKey {
    Admin,
    OpenQ,
    DepositManager,
    ClaimManager,
    Implementation(BountyVariant),
    Bounty(BytesN<32>),
    Tiers(BytesN<32>),
    Deposit(BytesN<32>, BytesN<32>),
    DepositIdAt(BytesN<32>, u32),
    Remaining(BytesN<32>, BytesN<32>),
    NftDeposits(BytesN<32>),
    Tokens(BytesN<32>),
    Balance(BytesN<32>, Address),
    FundingTotal(BytesN<32>, Address),
    DrawCursor(BytesN<32>, Address),
    BountyGates(BytesN<32>),
    ClaimGates(BytesN<32>, BytesN<32>),
    Claimed(BytesN<32>, BytesN<32>),
}

pub(crate) fn read_address(env: &Env, key: &DataKey) -> Result<Address, Error> {
    env.storage().instance().get(key).ok_or(Error::NotInitialized)
}

pub(crate) fn write_address(env: &Env, key: &DataKey, address: &Address) {
    env.storage().instance().set(key, address);
}

pub(crate) fn read_admin(env: &Env) -> Result<Address, Error> {
    read_address(env, &DataKey::Admin)
}

pub(crate) fn require_admin_auth(env: &Env) -> Result<Address, Error> {
    let admin = read_admin(env)?;
    admin.require_auth();
    Ok(admin)
}

pub(crate) fn read_implementation(env: &Env, variant: BountyVariant) -> Option<Address> {
    env.storage().instance().get(&DataKey::Implementation(variant))
}

pub(crate) fn write_implementation(env: &Env, variant: BountyVariant, implementation: &Address) {
    env.storage()
        .instance()
        .set(&DataKey::Implementation(variant), implementation);
}

pub(crate) fn has_bounty(env: &Env, address: &BytesN<32>) -> bool {
    env.storage().persistent().has(&DataKey::Bounty(address.clone()))
}

pub(crate) fn read_bounty(env: &Env, address: &BytesN<32>) -> Result<Bounty, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Bounty(address.clone()))
        .ok_or(Error::BountyNotFound)
}

pub(crate) fn write_bounty(env: &Env, address: &BytesN<32>, bounty: &Bounty) {
    env.storage()
        .persistent()
        .set(&DataKey::Bounty(address.clone()), bounty);
}
