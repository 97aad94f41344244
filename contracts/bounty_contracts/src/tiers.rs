//! Tier engine: per-tier shares, winners, completion flags and claim state,
//! plus the completion gates of untiered bounties.

use soroban_sdk::{BytesN, Env, String, Vec};

use crate::storage::DataKey;
use crate::{Bounty, BountyVariant, CompletionTarget, Error, Gates, Tier, PERCENTAGE_TOTAL};

#[derive(Clone, Copy)]
pub(crate) enum Gate {
    Invoice,
    SupportingDocuments,
}

pub(crate) fn build(env: &Env, shares: &Vec<i128>) -> Vec<Tier> {
    let mut tiers = Vec::new(env);
    for share in shares.iter() {
        tiers.push_back(Tier {
            share,
            winner: None,
            invoice_complete: false,
            supporting_documents_complete: false,
            claimed: false,
        });
    }
    tiers
}

pub(crate) fn read_tiers(env: &Env, address: &BytesN<32>) -> Vec<Tier> {
    env.storage()
        .persistent()
        .get(&DataKey::Tiers(address.clone()))
        .unwrap_or(Vec::new(env))
}

pub(crate) fn write_tiers(env: &Env, address: &BytesN<32>, tiers: &Vec<Tier>) {
    env.storage()
        .persistent()
        .set(&DataKey::Tiers(address.clone()), tiers);
}

pub(crate) fn read_tier(env: &Env, address: &BytesN<32>, index: u32) -> Result<Tier, Error> {
    read_tiers(env, address).get(index).ok_or(Error::InvalidTier)
}

fn update_tier<F>(env: &Env, address: &BytesN<32>, index: u32, update: F) -> Result<Tier, Error>
where
    F: FnOnce(&mut Tier) -> Result<(), Error>,
{
    let mut tiers = read_tiers(env, address);
    let mut tier = tiers.get(index).ok_or(Error::InvalidTier)?;
    update(&mut tier)?;
    tiers.set(index, tier.clone());
    write_tiers(env, address, &tiers);
    Ok(tier)
}

/// Winners may be reassigned until the tier pays out.
pub(crate) fn set_winner(
    env: &Env,
    address: &BytesN<32>,
    index: u32,
    winner: &String) -> Result<(), Error> {
    update_tier(env, address, index, |tier| {
        if tier.claimed {
            return Err(Error::TierAlreadyClaimed);
        }
        tier.winner = Some(winner.clone());
        Ok(())
    })?;
    Ok(())
}

pub(crate) fn mark_claimed(env: &Env, address: &BytesN<32>, index: u32) -> Result<(), Error> {
    update_tier(env, address, index, |tier| {
        if tier.claimed {
            return Err(Error::TierAlreadyClaimed);
        }
        tier.claimed = true;
        Ok(())
    })?;
    Ok(())
}

/// Replaces every tier's share, keeping winners and flags. A schedule can
/// only change before any tier has paid out and must keep the tier count
/// unless no winner has been named yet.
pub(crate) fn reschedule(env: &Env, address: &BytesN<32>, shares: &Vec<i128>) -> Result<(), Error> {
    let current = read_tiers(env, address);
    if current.iter().any(|tier| tier.claimed) {
        return Err(Error::TierAlreadyClaimed);
    }
    if shares.len() != current.len() && current.iter().any(|tier| tier.winner.is_some()) {
        return Err(Error::InvalidTierSchedule);
    }

    let mut tiers = build(env, shares);
    for (index, existing) in current.iter().enumerate() {
        let index = index as u32;
        if let Some(mut tier) = tiers.get(index) {
            tier.winner = existing.winner;
            tier.invoice_complete = existing.invoice_complete;
            tier.supporting_documents_complete = existing.supporting_documents_complete;
            tiers.set(index, tier);
        }
    }
    write_tiers(env, address, &tiers);
    Ok(())
}

pub(crate) fn read_gates(
    env: &Env,
    address: &BytesN<32>,
    bounty: &Bounty,
    target: &CompletionTarget,
) -> Result<Gates, Error> {
    match target {
        CompletionTarget::Bounty if bounty.variant == BountyVariant::Atomic => Ok(env
            .storage()
            .persistent()
            .get(&DataKey::BountyGates(address.clone()))
            .unwrap_or(Gates::pending())),
        CompletionTarget::Claim(claim_id) if bounty.variant == BountyVariant::Ongoing => Ok(env
            .storage()
            .persistent()
            .get(&DataKey::ClaimGates(address.clone(), claim_id.clone()))
            .unwrap_or(Gates::pending())),
        CompletionTarget::Tier(index) if bounty.variant.is_tiered() => {
            let tier = read_tier(env, address, *index)?;
            Ok(Gates {
                invoice_complete: tier.invoice_complete,
                supporting_documents_complete: tier.supporting_documents_complete,
            })
        }
        _ => Err(Error::InvalidCompletionTarget),
    }
}

pub(crate) fn set_gate(
    env: &Env,
    address: &BytesN<32>,
    bounty: &Bounty,
    target: &CompletionTarget,
    gate: Gate,
    complete: bool,
) -> Result<(), Error> {
    if let CompletionTarget::Tier(index) = target {
        if !bounty.variant.is_tiered() {
            return Err(Error::InvalidCompletionTarget);
        }
        update_tier(env, address, *index, |tier| {
            match gate {
                Gate::Invoice => tier.invoice_complete = complete,
                Gate::SupportingDocuments => tier.supporting_documents_complete = complete,
            }
            Ok(())
        })?;
        return Ok(());
    }

    let mut gates = read_gates(env, address, bounty, target)?;
    match gate {
        Gate::Invoice => gates.invoice_complete = complete,
        Gate::SupportingDocuments => gates.supporting_documents_complete = complete,
    }
    let key = match target {
        CompletionTarget::Claim(claim_id) => DataKey::ClaimGates(address.clone(), claim_id.clone()),
        _ => DataKey::BountyGates(address.clone()),
    };
    env.storage().persistent().set(&key, &gates);
    Ok(())
}

/// Percentage schedules: at least one tier, no negative share, summing to 100.
pub(crate) fn validate_percentages(shares: &Vec<i128>) -> Result<(), Error> {
    if shares.is_empty() {
        return Err(Error::InvalidTierSchedule);
    }
    let mut total: i128 = 0;
    for share in shares.iter() {
        if share < 0 {
            return Err(Error::InvalidTierSchedule);
        }
        total = total.checked_add(share).ok_or(Error::MathOverflow)?;
    }
    if total != PERCENTAGE_TOTAL {
        return Err(Error::TierPercentagesNotOneHundred);
    }
    Ok(())
}

/// Fixed schedules: at least one tier, every amount positive.
pub(crate) fn validate_fixed_amounts(shares: &Vec<i128>) -> Result<(), Error> {
    if shares.is_empty() || shares.iter().any(|amount| amount <= 0) {
        return Err(Error::InvalidTierSchedule);
    }
    Ok(())
}
