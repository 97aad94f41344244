use soroban_sdk::{contract, contractimpl, Env, Vec};

use crate::logic::{self, BountyLogic};
use crate::tiers;
use crate::{
    Bounty, BountyConfig, BountyStatus, BountyVariant, ClaimContext, ClaimPlan, CloserData, Error,
    InitOperation, PayoutTerms, TokenAmount, PERCENTAGE_TOTAL,
};

/// Competition bounty: ranked tiers split the pool frozen at close by percentage.
#[contract]
pub struct TieredPercentageBountyV1;

#[contractimpl]
impl BountyLogic for TieredPercentageBountyV1 {
    fn variant(_env: Env) -> BountyVariant {
        BountyVariant::TieredPercentage
    }

    fn version(_env: Env) -> u32 {
        1
    }

    fn configure(env: Env, operation: InitOperation) -> Result<BountyConfig, Error> {
        let InitOperation::TieredPercentage(params) = operation else {
            return Err(Error::VariantMismatch);
        };
        let mut shares = Vec::new(&env);
        for percentage in params.tier_percentages.iter() {
            shares.push_back(i128::from(percentage));
        }
        tiers::validate_percentages(&shares)?;

        Ok(BountyConfig {
            funding_goal: logic::funding_goal(
                params.has_funding_goal,
                params.funding_token,
                params.funding_goal,
            )?,
            permissioned_claims: params.permissioned_claims,
            permissioned_open: params.permissioned_open,
            invoice_required: params.invoice_required,
            name: params.name,
            description: params.description,
            url: params.url,
            terms: PayoutTerms::TieredPercentage,
            shares,
        })
    }

    fn reschedule(_env: Env, bounty: Bounty, shares: Vec<i128>) -> Result<(), Error> {
        if bounty.status != BountyStatus::Open {
            return Err(Error::BountyClosed);
        }
        tiers::validate_percentages(&shares)
    }

    fn plan_close(
        _env: Env,
        bounty: Bounty,
        pool: Vec<TokenAmount>,
    ) -> Result<Vec<TokenAmount>, Error> {
        if bounty.status != BountyStatus::Open {
            return Err(Error::BountyClosed);
        }
        Ok(pool)
    }

    fn plan_claim(
        env: Env,
        context: ClaimContext,
        closer_data: CloserData,
    ) -> Result<ClaimPlan, Error> {
        if context.bounty.status != BountyStatus::Closed {
            return Err(Error::CompetitionNotClosed);
        }
        let tier = logic::winning_tier(&context, &closer_data)?;

        let mut payouts = Vec::new(&env);
        for total in context.funding_totals.iter() {
            let amount = total
                .amount
                .checked_mul(tier.share)
                .ok_or(Error::MathOverflow)?
                / PERCENTAGE_TOTAL;
            if amount > 0 {
                payouts.push_back(TokenAmount {
                    token: total.token,
                    amount,
                });
            }
        }
        Ok(ClaimPlan {
            payouts,
            nft_deposits: logic::nft_ids(&env, &context.nft_deposits, Some(closer_data.tier)),
            tier: Some(closer_data.tier),
            record_claim: false,
            close_bounty: false,
        })
    }
}
