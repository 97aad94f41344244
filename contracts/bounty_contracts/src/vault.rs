//! Bounty instances and their custody.
//!
//! Each minted bounty is a record in this contract, addressed by a digest of
//! its task id. The vault holds every deposited asset, attributes balances to
//! the owning bounty and applies the plans returned by the variant
//! implementation its beacon slot points at.

use soroban_sdk::{
    contract, contractimpl, log, symbol_short, token, Address, BytesN, Env, String, Vec,
};

use crate::events;
use crate::ledger::{self, Asset};
use crate::logic::BountyLogicClient;
use crate::nft::NftClient;
use crate::storage::{self, DataKey};
use crate::tiers::{self, Gate};
use crate::{
    ids, lift, Bounty, BountyStatus, BountyVariant, ClaimContext, CloserData, CompletionTarget,
    Deposit, Error, FundingGoal, Gates, InitOperation, OngoingPayout, PayoutTerms, Tier,
    TokenAmount,
};

#[contract]
pub struct BountyVault;

/// Checks `caller` is the component stored under `role`, then requires its auth.
fn require_caller(env: &Env, role: &DataKey, caller: &Address) -> Result<(), Error> {
    let expected = storage::read_address(env, role)?;
    if *caller != expected {
        log!(env, "rejected caller", caller.clone());
        return Err(Error::UnauthorizedCaller);
    }
    caller.require_auth();
    Ok(())
}

fn implementation_client(
    env: &Env,
    variant: BountyVariant,
) -> Result<BountyLogicClient<'_>, Error> {
    let implementation =
        storage::read_implementation(env, variant).ok_or(Error::ImplementationNotSet)?;
    Ok(BountyLogicClient::new(env, &implementation))
}

fn read_open_bounty(env: &Env, bounty: &BytesN<32>) -> Result<Bounty, Error> {
    let record = storage::read_bounty(env, bounty)?;
    if record.status != BountyStatus::Open {
        return Err(Error::BountyClosed);
    }
    Ok(record)
}

#[contractimpl]
impl BountyVault {
    pub fn initialize(
        env: Env,
        admin: Address,
        openq: Address,
        deposit_manager: Address,
        claim_manager: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();
        storage::write_address(&env, &DataKey::Admin, &admin);
        storage::write_address(&env, &DataKey::OpenQ, &openq);
        storage::write_address(&env, &DataKey::DepositManager, &deposit_manager);
        storage::write_address(&env, &DataKey::ClaimManager, &claim_manager);
        Ok(())
    }

    pub fn set_openq(env: Env, openq: Address) -> Result<(), Error> {
        storage::require_admin_auth(&env)?;
        storage::write_address(&env, &DataKey::OpenQ, &openq);
        events::config_changed(&env, symbol_short!("vault"), symbol_short!("openq"), &openq);
        Ok(())
    }

    pub fn set_deposit_manager(env: Env, deposit_manager: Address) -> Result<(), Error> {
        storage::require_admin_auth(&env)?;
        storage::write_address(&env, &DataKey::DepositManager, &deposit_manager);
        events::config_changed(
            &env,
            symbol_short!("vault"),
            symbol_short!("dep_mgr"),
            &deposit_manager,
        );
        Ok(())
    }

    pub fn set_claim_manager(env: Env, claim_manager: Address) -> Result<(), Error> {
        storage::require_admin_auth(&env)?;
        storage::write_address(&env, &DataKey::ClaimManager, &claim_manager);
        events::config_changed(
            &env,
            symbol_short!("vault"),
            symbol_short!("claim_mgr"),
            &claim_manager,
        );
        Ok(())
    }

    pub fn admin(env: Env) -> Result<Address, Error> {
        storage::read_admin(&env)
    }

    pub fn openq(env: Env) -> Result<Address, Error> {
        storage::read_address(&env, &DataKey::OpenQ)
    }

    pub fn deposit_manager(env: Env) -> Result<Address, Error> {
        storage::read_address(&env, &DataKey::DepositManager)
    }

    pub fn claim_manager(env: Env) -> Result<Address, Error> {
        storage::read_address(&env, &DataKey::ClaimManager)
    }

    // Beacon slots

    /// Points every instance of `variant` at `implementation`. Instance state
    /// is untouched.
    pub fn set_implementation(
        env: Env,
        variant: BountyVariant,
        implementation: Address) -> Result<(), Error> {
        storage::require_admin_auth(&env)?;
        let client = BountyLogicClient::new(&env, &implementation);
        if lift(client.try_variant())? != variant {
            return Err(Error::VariantMismatch);
        }
        let version = lift(client.try_version())?;
        let previous = storage::read_implementation(&env, variant);
        storage::write_implementation(&env, variant, &implementation);
        events::implementation_upgraded(&env, variant, previous, &implementation, version);
        Ok(())
    }

    pub fn implementation(env: Env, variant: BountyVariant) -> Option<Address> {
        storage::read_implementation(&env, variant)
    }

    pub fn implementation_version(env: Env, bounty: BytesN<32>) -> Result<u32, Error> {
        let record = storage::read_bounty(&env, &bounty)?;
        lift(implementation_client(&env, record.variant)?.try_version())
    }

    // Factory

    /// Creates the bounty instance for `bounty_id`. Only the registry may mint.
    pub fn mint(
        env: Env,
        caller: Address,
        bounty_id: String,
        issuer: Address,
        organization: String,
        operation: InitOperation,
    ) -> Result<BytesN<32>, Error> {
        require_caller(&env, &DataKey::OpenQ, &caller)?;
        let address = ids::bounty_address(&env, &bounty_id);
        if storage::has_bounty(&env, &address) {
            return Err(Error::AlreadyInitialized);
        }

        let variant = operation.variant();
        let config = lift(implementation_client(&env, variant)?.try_configure(&operation))?;
        let record = Bounty {
            bounty_id: bounty_id.clone(),
            issuer: issuer.clone(),
            organization,
            variant,
            status: BountyStatus::Open,
            funding_goal: config.funding_goal,
            terms: config.terms,
            permissioned_claims: config.permissioned_claims,
            permissioned_open: config.permissioned_open,
            invoice_required: config.invoice_required,
            name: config.name,
            description: config.description,
            url: config.url,
            created_at: env.ledger().timestamp(),
            closed_at: 0,
            closer: None,
            deposit_count: 0,
        };
        storage::write_bounty(&env, &address, &record);
        tiers::write_tiers(&env, &address, &tiers::build(&env, &config.shares));

        events::bounty_minted(&env, &address, &bounty_id, variant, &issuer);
        Ok(address)
    }

    // Deposit ledger

    pub fn receive_funds(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        funder: Address,
        token: Address,
        amount: i128,
        expiration: u64,
    ) -> Result<BytesN<32>, Error> {
        require_caller(&env, &DataKey::DepositManager, &caller)?;
        funder.require_auth();
        let mut record = storage::read_bounty(&env, &bounty)?;
        let deposit = ledger::record_deposit(
            &env,
            &bounty,
            &mut record,
            &funder,
            Asset::Fungible {
                token: token.clone(),
                amount,
            },
            expiration,
        )?;
        storage::write_bounty(&env, &bounty, &record);

        token::Client::new(&env, &token).transfer(
            &funder,
            &env.current_contract_address(),
            &amount,
        );
        events::deposit_received(&env, &bounty, &deposit);
        Ok(deposit.deposit_id)
    }

    pub fn receive_nft(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        funder: Address,
        nft: Address,
        token_id: u32,
        expiration: u64,
        tier: u32,
    ) -> Result<BytesN<32>, Error> {
        require_caller(&env, &DataKey::DepositManager, &caller)?;
        funder.require_auth();
        let mut record = storage::read_bounty(&env, &bounty)?;
        let tiered = record.variant.is_tiered();
        let deposit = ledger::record_deposit(
            &env,
            &bounty,
            &mut record,
            &funder,
            Asset::Nft {
                token: nft.clone(),
                token_id,
                tier: if tiered { tier } else { 0 },
            },
            expiration,
        )?;
        if tiered && tiers::read_tier(&env, &bounty, tier)?.claimed {
            return Err(Error::TierAlreadyClaimed);
        }
        storage::write_bounty(&env, &bounty, &record);

        NftClient::new(&env, &nft).transfer(&funder, &env.current_contract_address(), &token_id);
        events::deposit_received(&env, &bounty, &deposit);
        Ok(deposit.deposit_id)
    }

    /// Returns an expired deposit to its funder. Returns the part of a
    /// fungible deposit not yet paid out, zero for NFTs.
    pub fn refund_deposit(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        funder: Address,
        deposit_id: BytesN<32>,
    ) -> Result<i128, Error> {
        require_caller(&env, &DataKey::DepositManager, &caller)?;
        funder.require_auth();
        let record = storage::read_bounty(&env, &bounty)?;
        let (deposit, amount) = ledger::refund(&env, &bounty, &record, &deposit_id, &funder)?;

        let vault = env.current_contract_address();
        if deposit.is_nft {
            NftClient::new(&env, &deposit.token).transfer(
                &vault,
                &deposit.funder,
                &deposit.token_id,
            );
        } else if amount > 0 {
            token::Client::new(&env, &deposit.token).transfer(&vault, &deposit.funder, &amount);
        }
        events::deposit_refunded(&env, &bounty, &deposit, amount);
        Ok(amount)
    }

    // Tier engine and completion gates

    pub fn set_tier_winner(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        tier: u32,
        winner: String) -> Result<(), Error> {
        require_caller(&env, &DataKey::OpenQ, &caller)?;
        let record = storage::read_bounty(&env, &bounty)?;
        if !record.variant.is_tiered() {
            return Err(Error::VariantMismatch);
        }
        tiers::set_winner(&env, &bounty, tier, &winner)?;
        events::tier_winner_set(&env, &bounty, tier, &winner);
        Ok(())
    }

    pub fn set_invoice_complete(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        target: CompletionTarget,
        complete: bool,
    ) -> Result<(), Error> {
        require_caller(&env, &DataKey::OpenQ, &caller)?;
        let record = storage::read_bounty(&env, &bounty)?;
        tiers::set_gate(&env, &bounty, &record, &target, Gate::Invoice, complete)?;
        events::completion_set(&env, &bounty, symbol_short!("invoice"), &target, complete);
        Ok(())
    }

    pub fn set_supporting_docs_complete(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        target: CompletionTarget,
        complete: bool,
    ) -> Result<(), Error> {
        require_caller(&env, &DataKey::OpenQ, &caller)?;
        let record = storage::read_bounty(&env, &bounty)?;
        tiers::set_gate(&env, &bounty, &record, &target, Gate::SupportingDocuments, complete)?;
        events::completion_set(&env, &bounty, symbol_short!("docs"), &target, complete);
        Ok(())
    }

    // Issuer maintenance, relayed by the registry

    pub fn set_funding_goal(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        token: Address,
        amount: i128) -> Result<(), Error> {
        require_caller(&env, &DataKey::OpenQ, &caller)?;
        let mut record = read_open_bounty(&env, &bounty)?;
        if record.variant == BountyVariant::TieredFixed {
            return Err(Error::VariantMismatch);
        }
        if amount <= 0 {
            return Err(Error::InvalidFundingGoal);
        }
        record.funding_goal = Some(FundingGoal { token, amount });
        storage::write_bounty(&env, &bounty, &record);
        events::bounty_updated(&env, &bounty, symbol_short!("goal"));
        Ok(())
    }

    pub fn set_payout(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        token: Address,
        amount: i128) -> Result<(), Error> {
        require_caller(&env, &DataKey::OpenQ, &caller)?;
        let mut record = read_open_bounty(&env, &bounty)?;
        if record.variant != BountyVariant::Ongoing {
            return Err(Error::VariantMismatch);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        record.terms = PayoutTerms::Ongoing(OngoingPayout { token, amount });
        storage::write_bounty(&env, &bounty, &record);
        events::bounty_updated(&env, &bounty, symbol_short!("payout"));
        Ok(())
    }

    pub fn set_payout_schedule(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        shares: Vec<i128>) -> Result<(), Error> {
        require_caller(&env, &DataKey::OpenQ, &caller)?;
        let record = read_open_bounty(&env, &bounty)?;
        lift(implementation_client(&env, record.variant)?.try_reschedule(&record, &shares))?;
        tiers::reschedule(&env, &bounty, &shares)?;
        events::bounty_updated(&env, &bounty, symbol_short!("schedule"));
        Ok(())
    }

    /// Closes an ongoing bounty or a percentage competition. Competitions
    /// freeze their balances here; tier payouts are computed from that snapshot.
    pub fn close(env: Env, caller: Address, bounty: BytesN<32>) -> Result<(), Error> {
        require_caller(&env, &DataKey::OpenQ, &caller)?;
        let mut record = storage::read_bounty(&env, &bounty)?;
        let pool = ledger::pool(&env, &bounty);
        let logic = implementation_client(&env, record.variant)?;
        let snapshot = lift(logic.try_plan_close(&record, &pool))?;
        ledger::write_funding_totals(&env, &bounty, &snapshot);

        record.status = BountyStatus::Closed;
        record.closed_at = env.ledger().timestamp();
        storage::write_bounty(&env, &bounty, &record);
        events::bounty_closed(&env, &bounty, snapshot.len());
        Ok(())
    }

    // Payout

    /// Applies the payout the bounty's implementation plans for `closer_data`.
    /// Only the claim manager may call this; it has already checked the resolver.
    pub fn claim(
        env: Env,
        caller: Address,
        bounty: BytesN<32>,
        closer_data: CloserData,
    ) -> Result<Vec<TokenAmount>, Error> {
        require_caller(&env, &DataKey::ClaimManager, &caller)?;
        let mut record = storage::read_bounty(&env, &bounty)?;
        let claim_id = ids::claimant_id(&env, &closer_data.claimant_handle, &closer_data.proof_url);
        let context = ClaimContext {
            bounty: record.clone(),
            tiers: tiers::read_tiers(&env, &bounty),
            pool: ledger::pool(&env, &bounty),
            funding_totals: ledger::funding_totals(&env, &bounty),
            nft_deposits: ledger::outstanding_nfts(&env, &bounty)?,
            claim_id: claim_id.clone(),
            already_claimed: ledger::has_claimed(&env, &bounty, &claim_id),
        };
        let logic = implementation_client(&env, record.variant)?;
        let plan = lift(logic.try_plan_claim(&context, &closer_data))?;

        let vault = env.current_contract_address();
        let mut paid = Vec::new(&env);
        for payout in plan.payouts.iter() {
            if payout.amount <= 0 {
                continue;
            }
            ledger::draw(&env, &bounty, record.deposit_count, &payout.token, payout.amount)?;
            token::Client::new(&env, &payout.token).transfer(
                &vault,
                &closer_data.payout_account,
                &payout.amount,
            );
            events::bounty_claimed(&env, &bounty, &closer_data.claimant, plan.tier, &payout);
            paid.push_back(payout);
        }
        for deposit_id in plan.nft_deposits.iter() {
            let deposit = ledger::read_deposit(&env, &bounty, &deposit_id)?;
            if !deposit.is_nft || deposit.withdrawn {
                return Err(Error::DepositAlreadyRefunded);
            }
            let deposit = ledger::mark_withdrawn(&env, &bounty, deposit);
            NftClient::new(&env, &deposit.token).transfer(
                &vault,
                &closer_data.payout_account,
                &deposit.token_id,
            );
            events::nft_claimed(&env, &bounty, &closer_data.claimant, &deposit);
        }

        if let Some(tier) = plan.tier {
            tiers::mark_claimed(&env, &bounty, tier)?;
        }
        if plan.record_claim {
            ledger::record_claim(&env, &bounty, &claim_id);
        }
        if plan.close_bounty {
            record.status = BountyStatus::Closed;
            record.closed_at = env.ledger().timestamp();
            record.closer = Some(closer_data.claimant.clone());
            storage::write_bounty(&env, &bounty, &record);
            events::bounty_closed(&env, &bounty, 0);
        }
        Ok(paid)
    }

    // Reads

    pub fn bounty(env: Env, bounty: BytesN<32>) -> Result<Bounty, Error> {
        storage::read_bounty(&env, &bounty)
    }

    pub fn deposit(env: Env, bounty: BytesN<32>, deposit_id: BytesN<32>) -> Result<Deposit, Error> {
        ledger::read_deposit(&env, &bounty, &deposit_id)
    }

    pub fn funder(env: Env, bounty: BytesN<32>, deposit_id: BytesN<32>) -> Result<Address, Error> {
        Ok(ledger::read_deposit(&env, &bounty, &deposit_id)?.funder)
    }

    pub fn token_address(
        env: Env,
        bounty: BytesN<32>,
        deposit_id: BytesN<32>,
    ) -> Result<Address, Error> {
        Ok(ledger::read_deposit(&env, &bounty, &deposit_id)?.token)
    }

    pub fn token_id(env: Env, bounty: BytesN<32>, deposit_id: BytesN<32>) -> Result<u32, Error> {
        Ok(ledger::read_deposit(&env, &bounty, &deposit_id)?.token_id)
    }

    pub fn expiration(env: Env, bounty: BytesN<32>, deposit_id: BytesN<32>) -> Result<u64, Error> {
        Ok(ledger::read_deposit(&env, &bounty, &deposit_id)?.expiration)
    }

    pub fn is_nft(env: Env, bounty: BytesN<32>, deposit_id: BytesN<32>) -> Result<bool, Error> {
        Ok(ledger::read_deposit(&env, &bounty, &deposit_id)?.is_nft)
    }

    pub fn deposit_time(
        env: Env,
        bounty: BytesN<32>,
        deposit_id: BytesN<32>,
    ) -> Result<u64, Error> {
        Ok(ledger::read_deposit(&env, &bounty, &deposit_id)?.deposit_time)
    }

    /// Every deposit id of the bounty, in deposit order.
    pub fn deposit_ids(env: Env, bounty: BytesN<32>) -> Result<Vec<BytesN<32>>, Error> {
        let record = storage::read_bounty(&env, &bounty)?;
        ledger::deposit_ids(&env, &bounty, record.deposit_count)
    }

    pub fn deposit_id_at(env: Env, bounty: BytesN<32>, index: u32) -> Result<BytesN<32>, Error> {
        ledger::deposit_id_at(&env, &bounty, index)
    }

    /// Part of a fungible deposit still in custody.
    pub fn deposit_remaining(
        env: Env,
        bounty: BytesN<32>,
        deposit_id: BytesN<32>,
    ) -> Result<i128, Error> {
        ledger::read_deposit(&env, &bounty, &deposit_id)?;
        Ok(ledger::remaining(&env, &bounty, &deposit_id))
    }

    /// Outstanding NFT deposits, in deposit order.
    pub fn nft_deposits(env: Env, bounty: BytesN<32>) -> Vec<BytesN<32>> {
        ledger::nft_deposit_ids(&env, &bounty)
    }

    pub fn tokens(env: Env, bounty: BytesN<32>) -> Vec<Address> {
        ledger::tokens(&env, &bounty)
    }

    pub fn token_balance(env: Env, bounty: BytesN<32>, token: Address) -> i128 {
        ledger::balance(&env, &bounty, &token)
    }

    pub fn funding_total(env: Env, bounty: BytesN<32>, token: Address) -> i128 {
        ledger::funding_total(&env, &bounty, &token)
    }

    pub fn tiers(env: Env, bounty: BytesN<32>) -> Vec<Tier> {
        tiers::read_tiers(&env, &bounty)
    }

    pub fn tier(env: Env, bounty: BytesN<32>, tier: u32) -> Result<Tier, Error> {
        tiers::read_tier(&env, &bounty, tier)
    }

    pub fn tier_winner(env: Env, bounty: BytesN<32>, tier: u32) -> Result<Option<String>, Error> {
        Ok(tiers::read_tier(&env, &bounty, tier)?.winner)
    }

    pub fn completion(
        env: Env,
        bounty: BytesN<32>,
        target: CompletionTarget,
    ) -> Result<Gates, Error> {
        let record = storage::read_bounty(&env, &bounty)?;
        tiers::read_gates(&env, &bounty, &record, &target)
    }

    pub fn invoice_complete(
        env: Env,
        bounty: BytesN<32>,
        target: CompletionTarget,
    ) -> Result<bool, Error> {
        Ok(Self::completion(env, bounty, target)?.invoice_complete)
    }

    pub fn supporting_docs_complete(
        env: Env,
        bounty: BytesN<32>,
        target: CompletionTarget,
    ) -> Result<bool, Error> {
        Ok(Self::completion(env, bounty, target)?.supporting_documents_complete)
    }

    pub fn has_claimed(env: Env, bounty: BytesN<32>, claim_id: BytesN<32>) -> bool {
        ledger::has_claimed(&env, &bounty, &claim_id)
    }
}
