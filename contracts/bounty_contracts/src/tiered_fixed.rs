use soroban_sdk::{contract, contractimpl, Env, Vec};

use crate::logic::{self, BountyLogic};
use crate::tiers;
use crate::{
    Bounty, BountyConfig, BountyStatus, BountyVariant, ClaimContext, ClaimPlan, CloserData, Error,
    InitOperation, PayoutTerms, TokenAmount,
};

/// Ranked tiers with fixed payouts in one token. Closes once every tier has paid.
#[contract]
pub struct TieredFixedBountyV1;

#[contractimpl]
impl BountyLogic for TieredFixedBountyV1 {
    fn variant(_env: Env) -> BountyVariant {
        BountyVariant::TieredFixed
    }

    fn version(_env: Env) -> u32 {
        1
    }

    fn configure(_env: Env, operation: InitOperation) -> Result<BountyConfig, Error> {
        let InitOperation::TieredFixed(params) = operation else {
            return Err(Error::VariantMismatch);
        };
        tiers::validate_fixed_amounts(&params.tier_amounts)?;

        Ok(BountyConfig {
            funding_goal: None,
            permissioned_claims: params.permissioned_claims,
            permissioned_open: params.permissioned_open,
            invoice_required: params.invoice_required,
            name: params.name,
            description: params.description,
            url: params.url,
            terms: PayoutTerms::TieredFixed(params.payout_token),
            shares: params.tier_amounts,
        })
    }

    fn reschedule(_env: Env, bounty: Bounty, shares: Vec<i128>) -> Result<(), Error> {
        if bounty.status != BountyStatus::Open {
            return Err(Error::BountyClosed);
        }
        tiers::validate_fixed_amounts(&shares)
    }

    fn plan_close(
        _env: Env,
        _bounty: Bounty,
        _pool: Vec<TokenAmount>,
    ) -> Result<Vec<TokenAmount>, Error> {
        Err(Error::VariantMismatch)
    }

    fn plan_claim(
        env: Env,
        context: ClaimContext,
        closer_data: CloserData,
    ) -> Result<ClaimPlan, Error> {
        if context.bounty.status != BountyStatus::Open {
            return Err(Error::BountyClosed);
        }
        let tier = logic::winning_tier(&context, &closer_data)?;
        let PayoutTerms::TieredFixed(token) = context.bounty.terms.clone() else {
            return Err(Error::VariantMismatch);
        };
        if logic::available(&context.pool, &token) < tier.share {
            return Err(Error::InsufficientFunds);
        }

        let mut payouts = Vec::new(&env);
        payouts.push_back(TokenAmount {
            token,
            amount: tier.share,
        });
        let mut last_unclaimed = true;
        for (index, other) in context.tiers.iter().enumerate() {
            if index as u32 != closer_data.tier && !other.claimed {
                last_unclaimed = false;
            }
        }
        Ok(ClaimPlan {
            payouts,
            nft_deposits: logic::nft_ids(&env, &context.nft_deposits, Some(closer_data.tier)),
            tier: Some(closer_data.tier),
            record_claim: false,
            close_bounty: last_unclaimed,
        })
    }
}
