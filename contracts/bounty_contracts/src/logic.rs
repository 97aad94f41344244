//! Interface every variant implementation exposes to the vault.
//!
//! Implementations are stateless: the vault hands them a bounty's state and
//! applies whatever they return. Re-pointing a variant's beacon slot at a new
//! implementation changes behaviour for every instance of that variant
//! without touching their stored state.

use soroban_sdk::{contractclient, Address, BytesN, Env, Vec};

use crate::{
    Bounty, BountyConfig, BountyVariant, ClaimContext, ClaimPlan, CloserData, Deposit, Error,
    FundingGoal, InitOperation, Tier, TokenAmount,
};

#[contractclient(name = "BountyLogicClient")]
pub trait BountyLogic {
    /// Variant this implementation serves.
    fn variant(env: Env) -> BountyVariant;

    fn version(env: Env) -> u32;

    /// Validates the mint-time operation and returns the configuration to store.
    fn configure(env: Env, operation: InitOperation) -> Result<BountyConfig, Error>;

    /// Validates a replacement tier schedule.
    fn reschedule(env: Env, bounty: Bounty, shares: Vec<i128>) -> Result<(), Error>;

    /// Checks the bounty may close and returns the balances to freeze.
    fn plan_close(
        env: Env,
        bounty: Bounty,
        pool: Vec<TokenAmount>,
    ) -> Result<Vec<TokenAmount>, Error>;

    /// Decides what a claim pays out and which state transitions follow.
    fn plan_claim(
        env: Env,
        context: ClaimContext,
        closer_data: CloserData,
    ) -> Result<ClaimPlan, Error>;
}

pub(crate) fn funding_goal(
    has_funding_goal: bool,
    token: Option<Address>,
    amount: i128,
) -> Result<Option<FundingGoal>, Error> {
    if !has_funding_goal {
        return Ok(None);
    }
    let token = token.ok_or(Error::InvalidFundingGoal)?;
    if amount <= 0 {
        return Err(Error::InvalidFundingGoal);
    }
    Ok(Some(FundingGoal { token, amount }))
}

/// The tier named by `closer_data`, provided it can still be paid to this claimant.
pub(crate) fn winning_tier(
    context: &ClaimContext,
    closer_data: &CloserData,
) -> Result<Tier, Error> {
    let tier = context
        .tiers
        .get(closer_data.tier)
        .ok_or(Error::InvalidTier)?;
    if tier.claimed {
        return Err(Error::TierAlreadyClaimed);
    }
    match &tier.winner {
        None => Err(Error::TierWinnerNotSet),
        Some(winner) if *winner != closer_data.claimant_handle => Err(Error::ClaimantNotTierWinner),
        Some(_) => Ok(tier),
    }
}

pub(crate) fn available(pool: &Vec<TokenAmount>, token: &Address) -> i128 {
    pool.iter()
        .find(|entry| entry.token == *token)
        .map(|entry| entry.amount)
        .unwrap_or(0)
}

pub(crate) fn positive(env: &Env, balances: &Vec<TokenAmount>) -> Vec<TokenAmount> {
    let mut out = Vec::new(env);
    for entry in balances.iter() {
        if entry.amount > 0 {
            out.push_back(entry);
        }
    }
    out
}

pub(crate) fn nft_ids(env: &Env, deposits: &Vec<Deposit>, tier: Option<u32>) -> Vec<BytesN<32>> {
    let mut ids = Vec::new(env);
    for deposit in deposits.iter() {
        if tier.map_or(true, |tier| deposit.tier == tier) {
            ids.push_back(deposit.deposit_id);
        }
    }
    ids
}
