use soroban_sdk::{symbol_short, Address, BytesN, Env, String, Symbol};

use crate::{BountyVariant, CompletionTarget, Deposit, TokenAmount};

pub(crate) fn bounty_minted(
    env: &Env,
    bounty: &BytesN<32>,
    bounty_id: &String,
    variant: BountyVariant,
    issuer: &Address,
) {
    env.events().publish(
        (symbol_short!("mint"), bounty.clone()),
        (bounty_id.clone(), variant, issuer.clone(), env.ledger().timestamp()),
    );
}

pub(crate) fn deposit_received(env: &Env, bounty: &BytesN<32>, deposit: &Deposit) {
    let topic = if deposit.is_nft {
        symbol_short!("nft_dep")
    } else {
        symbol_short!("deposit")
    };
    env.events().publish(
        (topic, bounty.clone()),
        (
            deposit.deposit_id.clone(),
            deposit.funder.clone(),
            deposit.token.clone(),
            deposit.amount,
            deposit.token_id,
            deposit.expiration,
        ),
    );
}

pub(crate) fn deposit_refunded(env: &Env, bounty: &BytesN<32>, deposit: &Deposit, amount: i128) {
    env.events().publish(
        (symbol_short!("refund"), bounty.clone()),
        (deposit.deposit_id.clone(), deposit.funder.clone(), deposit.token.clone(), amount),
    );
}

pub(crate) fn tier_winner_set(env: &Env, bounty: &BytesN<32>, tier: u32, winner: &String) {
    env.events()
        .publish((symbol_short!("tier_win"), bounty.clone()), (tier, winner.clone()));
}

pub(crate) fn completion_set(
    env: &Env,
    bounty: &BytesN<32>,
    flag: Symbol,
    target: &CompletionTarget,
    complete: bool,
) {
    env.events()
        .publish((flag, bounty.clone()), (target.clone(), complete));
}

pub(crate) fn bounty_updated(env: &Env, bounty: &BytesN<32>, field: Symbol) {
    env.events()
        .publish((symbol_short!("update"), bounty.clone()), (field, env.ledger().timestamp()));
}

pub(crate) fn bounty_closed(env: &Env, bounty: &BytesN<32>, snapshot_tokens: u32) {
    env.events().publish(
        (symbol_short!("close"), bounty.clone()),
        (snapshot_tokens, env.ledger().timestamp()),
    );
}

pub(crate) fn bounty_claimed(
    env: &Env,
    bounty: &BytesN<32>,
    claimant: &Address,
    tier: Option<u32>,
    payout: &TokenAmount,
) {
    env.events().publish(
        (symbol_short!("claim"), bounty.clone()),
        (claimant.clone(), tier, payout.token.clone(), payout.amount),
    );
}

pub(crate) fn nft_claimed(env: &Env, bounty: &BytesN<32>, claimant: &Address, deposit: &Deposit) {
    env.events().publish(
        (symbol_short!("nft_claim"), bounty.clone()),
        (claimant.clone(), deposit.token.clone(), deposit.token_id),
    );
}

pub(crate) fn implementation_upgraded(
    env: &Env,
    variant: BountyVariant,
    previous: Option<Address>,
    implementation: &Address,
    version: u32,
) {
    env.events().publish(
        (symbol_short!("upgrade"), variant),
        (previous, implementation.clone(), version),
    );
}

/// Privileged re-point of a component's wiring.
pub(crate) fn config_changed(env: &Env, component: Symbol, field: Symbol, value: &Address) {
    env.events()
        .publish((symbol_short!("config"), component, field), value.clone());
}

pub(crate) fn token_whitelisted(env: &Env, token: &Address) {
    env.events().publish((symbol_short!("wl_add"),), token.clone());
}

pub(crate) fn token_removed(env: &Env, token: &Address) {
    env.events().publish((symbol_short!("wl_rm"),), token.clone());
}
