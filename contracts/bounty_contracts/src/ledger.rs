//! Deposit ledger: per-bounty deposit records, token balances attributed to
//! each bounty, competition snapshots and the ongoing claim registry.
//!
//! Every fungible deposit carries a remaining amount. Payouts draw those
//! down oldest first, so a bounty's balance of a token is always the sum of
//! what remains of its deposits in that token, and a refund only ever
//! returns what is left of the refunding funder's own deposit.

use soroban_sdk::{Address, BytesN, Env, Vec};

use crate::storage::DataKey;
use crate::{ids, Bounty, BountyStatus, Deposit, Error, TokenAmount, NFT_DEPOSIT_LIMIT};

pub(crate) enum Asset {
    Fungible { token: Address, amount: i128 },
    Nft { token: Address, token_id: u32, tier: u32 },
}

/// Validates and stores a new deposit, bumping the bounty's deposit counter.
/// The caller is responsible for moving custody and persisting `bounty`.
pub(crate) fn record_deposit(
    env: &Env,
    address: &BytesN<32>,
    bounty: &mut Bounty,
    funder: &Address,
    asset: Asset,
    expiration: u64,
) -> Result<Deposit, Error> {
    if expiration == 0 {
        return Err(Error::ExpirationNotGreaterThanZero);
    }
    if bounty.status != BountyStatus::Open {
        return Err(Error::BountyClosed);
    }

    let index = bounty.deposit_count;
    let deposit_id = ids::deposit_id(env, &bounty.bounty_id, index);
    let deposit = match asset {
        Asset::Fungible { token, amount } => {
            if amount <= 0 {
                return Err(Error::InvalidAmount);
            }
            credit(env, address, &token, amount)?;
            write_remaining(env, address, &deposit_id, amount);
            Deposit {
                deposit_id: deposit_id.clone(),
                funder: funder.clone(),
                token,
                amount,
                token_id: 0,
                is_nft: false,
                tier: 0,
                deposit_time: env.ledger().timestamp(),
                expiration,
                withdrawn: false,
            }
        }
        Asset::Nft { token, token_id, tier } => {
            let mut outstanding = nft_deposit_ids(env, address);
            if outstanding.len() >= NFT_DEPOSIT_LIMIT {
                return Err(Error::NftDepositLimitReached);
            }
            outstanding.push_back(deposit_id.clone());
            env.storage()
                .persistent()
                .set(&DataKey::NftDeposits(address.clone()), &outstanding);
            Deposit {
                deposit_id: deposit_id.clone(),
                funder: funder.clone(),
                token,
                amount: 0,
                token_id,
                is_nft: true,
                tier,
                deposit_time: env.ledger().timestamp(),
                expiration,
                withdrawn: false,
            }
        }
    };

    bounty.deposit_count = index.checked_add(1).ok_or(Error::MathOverflow)?;
    env.storage()
        .persistent()
        .set(&DataKey::DepositIdAt(address.clone(), index), &deposit_id);
    write_deposit(env, address, &deposit);
    Ok(deposit)
}

/// Marks a deposit as refunded and releases what remains of it. Returns the
/// updated deposit and the amount leaving custody (zero for NFTs).
pub(crate) fn refund(
    env: &Env,
    address: &BytesN<32>,
    bounty: &Bounty,
    deposit_id: &BytesN<32>,
    funder: &Address,
) -> Result<(Deposit, i128), Error> {
    let deposit = read_deposit(env, address, deposit_id)?;
    if deposit.funder != *funder {
        return Err(Error::OnlyFunderCanRefund);
    }
    if deposit.withdrawn {
        return Err(Error::DepositAlreadyRefunded);
    }
    if bounty.status != BountyStatus::Open {
        return Err(Error::BountyClosed);
    }
    let unlocks_at = deposit
        .deposit_time
        .checked_add(deposit.expiration)
        .ok_or(Error::MathOverflow)?;
    if env.ledger().timestamp() <= unlocks_at {
        return Err(Error::PrematureRefundRequest);
    }

    let amount = if deposit.is_nft {
        0
    } else {
        let amount = remaining(env, address, deposit_id);
        if amount <= 0 {
            return Err(Error::InsufficientFunds);
        }
        let updated = balance(env, address, &deposit.token)
            .checked_sub(amount)
            .filter(|left| *left >= 0)
            .ok_or(Error::InsufficientFunds)?;
        write_balance(env, address, &deposit.token, updated);
        write_remaining(env, address, deposit_id, 0);
        amount
    };
    let deposit = mark_withdrawn(env, address, deposit);
    Ok((deposit, amount))
}

pub(crate) fn mark_withdrawn(env: &Env, address: &BytesN<32>, mut deposit: Deposit) -> Deposit {
    deposit.withdrawn = true;
    if deposit.is_nft {
        let mut outstanding = Vec::new(env);
        for id in nft_deposit_ids(env, address).iter() {
            if id != deposit.deposit_id {
                outstanding.push_back(id);
            }
        }
        env.storage()
            .persistent()
            .set(&DataKey::NftDeposits(address.clone()), &outstanding);
    }
    write_deposit(env, address, &deposit);
    deposit
}

pub(crate) fn read_deposit(
    env: &Env,
    address: &BytesN<32>,
    deposit_id: &BytesN<32>,
) -> Result<Deposit, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Deposit(address.clone(), deposit_id.clone()))
        .ok_or(Error::DepositNotFound)
}

fn write_deposit(env: &Env, address: &BytesN<32>, deposit: &Deposit) {
    env.storage().persistent().set(
        &DataKey::Deposit(address.clone(), deposit.deposit_id.clone()),
        deposit,
    );
}

/// Id of the `index`-th deposit into the bounty.
pub(crate) fn deposit_id_at(
    env: &Env,
    address: &BytesN<32>,
    index: u32,
) -> Result<BytesN<32>, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::DepositIdAt(address.clone(), index))
        .ok_or(Error::DepositNotFound)
}

/// Every deposit id of the bounty, in deposit order.
pub(crate) fn deposit_ids(
    env: &Env,
    address: &BytesN<32>,
    deposit_count: u32,
) -> Result<Vec<BytesN<32>>, Error> {
    let mut ids = Vec::new(env);
    for index in 0..deposit_count {
        ids.push_back(deposit_id_at(env, address, index)?);
    }
    Ok(ids)
}

pub(crate) fn nft_deposit_ids(env: &Env, address: &BytesN<32>) -> Vec<BytesN<32>> {
    env.storage()
        .persistent()
        .get(&DataKey::NftDeposits(address.clone()))
        .unwrap_or(Vec::new(env))
}

pub(crate) fn outstanding_nfts(env: &Env, address: &BytesN<32>) -> Result<Vec<Deposit>, Error> {
    let mut deposits = Vec::new(env);
    for id in nft_deposit_ids(env, address).iter() {
        deposits.push_back(read_deposit(env, address, &id)?);
    }
    Ok(deposits)
}

/// Part of a fungible deposit not yet paid out or refunded.
pub(crate) fn remaining(env: &Env, address: &BytesN<32>, deposit_id: &BytesN<32>) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Remaining(address.clone(), deposit_id.clone()))
        .unwrap_or(0)
}

fn write_remaining(env: &Env, address: &BytesN<32>, deposit_id: &BytesN<32>, amount: i128) {
    env.storage()
        .persistent()
        .set(&DataKey::Remaining(address.clone(), deposit_id.clone()), &amount);
}

/// Distinct tokens the bounty has received. Grows once per token, never per deposit.
pub(crate) fn tokens(env: &Env, address: &BytesN<32>) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Tokens(address.clone()))
        .unwrap_or(Vec::new(env))
}

pub(crate) fn balance(env: &Env, address: &BytesN<32>, token: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Balance(address.clone(), token.clone()))
        .unwrap_or(0)
}

fn write_balance(env: &Env, address: &BytesN<32>, token: &Address, amount: i128) {
    env.storage()
        .persistent()
        .set(&DataKey::Balance(address.clone(), token.clone()), &amount);
}

fn credit(env: &Env, address: &BytesN<32>, token: &Address, amount: i128) -> Result<(), Error> {
    if !env
        .storage()
        .persistent()
        .has(&DataKey::Balance(address.clone(), token.clone()))
    {
        let mut known = tokens(env, address);
        known.push_back(token.clone());
        env.storage()
            .persistent()
            .set(&DataKey::Tokens(address.clone()), &known);
    }
    let updated = balance(env, address, token)
        .checked_add(amount)
        .ok_or(Error::MathOverflow)?;
    write_balance(env, address, token, updated);
    Ok(())
}

/// Takes `amount` of `token` out of the bounty for a payout, drawing down
/// the oldest deposits first.
pub(crate) fn draw(
    env: &Env,
    address: &BytesN<32>,
    deposit_count: u32,
    token: &Address,
    amount: i128,
) -> Result<(), Error> {
    let current = balance(env, address, token);
    if amount > current {
        return Err(Error::InsufficientFunds);
    }

    let cursor_key = DataKey::DrawCursor(address.clone(), token.clone());
    let mut cursor: u32 = env.storage().persistent().get(&cursor_key).unwrap_or(0);
    let mut left = amount;
    while left > 0 && cursor < deposit_count {
        let deposit_id = deposit_id_at(env, address, cursor)?;
        let deposit = read_deposit(env, address, &deposit_id)?;
        if !deposit.is_nft && deposit.token == *token {
            let available = remaining(env, address, &deposit_id);
            let taken = available.min(left);
            if taken > 0 {
                write_remaining(env, address, &deposit_id, available - taken);
                left -= taken;
            }
            if available > taken {
                break;
            }
        }
        cursor += 1;
    }
    if left > 0 {
        return Err(Error::InsufficientFunds);
    }

    env.storage().persistent().set(&cursor_key, &cursor);
    write_balance(env, address, token, current - amount);
    Ok(())
}

/// Attributed balance of every token the bounty has ever received.
pub(crate) fn pool(env: &Env, address: &BytesN<32>) -> Vec<TokenAmount> {
    let mut pool = Vec::new(env);
    for token in tokens(env, address).iter() {
        let amount = balance(env, address, &token);
        pool.push_back(TokenAmount { token, amount });
    }
    pool
}

pub(crate) fn funding_total(env: &Env, address: &BytesN<32>, token: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::FundingTotal(address.clone(), token.clone()))
        .unwrap_or(0)
}

pub(crate) fn funding_totals(env: &Env, address: &BytesN<32>) -> Vec<TokenAmount> {
    let mut totals = Vec::new(env);
    for token in tokens(env, address).iter() {
        let amount = funding_total(env, address, &token);
        if amount > 0 {
            totals.push_back(TokenAmount { token, amount });
        }
    }
    totals
}

pub(crate) fn write_funding_totals(env: &Env, address: &BytesN<32>, snapshot: &Vec<TokenAmount>) {
    for entry in snapshot.iter() {
        env.storage().persistent().set(
            &DataKey::FundingTotal(address.clone(), entry.token.clone()),
            &entry.amount,
        );
    }
}

pub(crate) fn has_claimed(env: &Env, address: &BytesN<32>, claim_id: &BytesN<32>) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Claimed(address.clone(), claim_id.clone()))
        .unwrap_or(false)
}

pub(crate) fn record_claim(env: &Env, address: &BytesN<32>, claim_id: &BytesN<32>) {
    env.storage()
        .persistent()
        .set(&DataKey::Claimed(address.clone(), claim_id.clone()), &true);
}
