use soroban_sdk::{contract, contractimpl, Env, Vec};

use crate::logic::{self, BountyLogic};
use crate::{
    Bounty, BountyConfig, BountyStatus, BountyVariant, ClaimContext, ClaimPlan, CloserData, Error,
    InitOperation, OngoingPayout, PayoutTerms, TokenAmount,
};

/// Repeating bounty: every distinct claim id receives the same fixed payout
/// until the issuer closes it or the pool runs dry.
#[contract]
pub struct OngoingBountyV1;

#[contractimpl]
impl BountyLogic for OngoingBountyV1 {
    fn variant(_env: Env) -> BountyVariant {
        BountyVariant::Ongoing
    }

    fn version(_env: Env) -> u32 {
        1
    }

    fn configure(env: Env, operation: InitOperation) -> Result<BountyConfig, Error> {
        let InitOperation::Ongoing(params) = operation else {
            return Err(Error::VariantMismatch);
        };
        if params.payout_amount <= 0 {
            return Err(Error::InvalidAmount);
        }
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
            terms: PayoutTerms::Ongoing(OngoingPayout {
                token: params.payout_token,
                amount: params.payout_amount,
            }),
            shares: Vec::new(&env),
        })
    }

    fn reschedule(_env: Env, _bounty: Bounty, _shares: Vec<i128>) -> Result<(), Error> {
        Err(Error::VariantMismatch)
    }

    fn plan_close(
        env: Env,
        bounty: Bounty,
        _pool: Vec<TokenAmount>,
    ) -> Result<Vec<TokenAmount>, Error> {
        if bounty.status != BountyStatus::Open {
            return Err(Error::BountyClosed);
        }
        Ok(Vec::new(&env))
    }

    fn plan_claim(
        env: Env,
        context: ClaimContext,
        _closer_data: CloserData,
    ) -> Result<ClaimPlan, Error> {
        if context.bounty.status != BountyStatus::Open {
            return Err(Error::BountyClosed);
        }
        if context.already_claimed {
            return Err(Error::ClaimantAlreadyClaimed);
        }
        let PayoutTerms::Ongoing(payout) = context.bounty.terms else {
            return Err(Error::VariantMismatch);
        };
        if logic::available(&context.pool, &payout.token) < payout.amount {
            return Err(Error::InsufficientFunds);
        }

        let mut payouts = Vec::new(&env);
        payouts.push_back(TokenAmount {
            token: payout.token,
            amount: payout.amount,
        });
        Ok(ClaimPlan {
            payouts,
            nft_deposits: Vec::new(&env),
            tier: None,
            record_claim: true,
            close_bounty: false,
        })
    }
}
