use soroban_sdk::{contract, contractimpl, Env, Vec};

use crate::logic::{self, BountyLogic};
use crate::{
    Bounty, BountyConfig, BountyStatus, BountyVariant, ClaimContext, ClaimPlan, CloserData, Error,
    InitOperation, PayoutTerms, TokenAmount,
};

/// Single-claim bounty: one claim drains every balance and every NFT, then closes.
#[contract]
pub struct AtomicBountyV1;

#[contractimpl]
impl BountyLogic for AtomicBountyV1 {
    fn variant(_env: Env) -> BountyVariant {
        BountyVariant::Atomic
    }

    fn version(_env: Env) -> u32 {
        1
    }

    fn configure(env: Env, operation: InitOperation) -> Result<BountyConfig, Error> {
        let InitOperation::Atomic(params) = operation else {
            return Err(Error::VariantMismatch);
        };
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
            terms: PayoutTerms::Atomic,
            shares: Vec::new(&env),
        })
    }

    fn reschedule(_env: Env, _bounty: Bounty, _shares: Vec<i128>) -> Result<(), Error> {
        Err(Error::VariantMismatch)
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
        _closer_data: CloserData,
    ) -> Result<ClaimPlan, Error> {
        if context.bounty.status != BountyStatus::Open {
            return Err(Error::BountyClosed);
        }
        Ok(ClaimPlan {
            payouts: logic::positive(&env, &context.pool),
            nft_deposits: logic::nft_ids(&env, &context.nft_deposits, None),
            tier: None,
            record_claim: false,
            close_bounty: true,
        })
    }
}
