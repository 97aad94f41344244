#![cfg(test)]

use soroban_sdk::{
    contract, contractimpl, contracttype,
    testutils::{Address as _, Ledger},
    token, Address, BytesN, Env, InvokeError, String, Vec,
};

use crate::logic::{self, BountyLogic};
use crate::{
    AtomicBountyV1, AtomicParams, Bounty, BountyConfig, BountyStatus, BountyVariant, BountyVault,
    BountyVaultClient, ClaimContext, ClaimManager, ClaimManagerClient, ClaimPlan, CloserData,
    DepositManager, DepositManagerClient, Error, InitOperation, NftClient, NonFungibleToken,
    OngoingBountyV1, OngoingParams, OpenQ, OpenQClient, TieredFixedBountyV1, TieredFixedParams,
    TieredPercentageBountyV1, TieredPercentageParams, TokenAmount, TokenWhitelist,
    TokenWhitelistClient, DEFAULT_TOKEN_LIMIT,
};

pub(crate) const FUNDER_BALANCE: i128 = 1_000_000;
pub(crate) const START: u64 = 1_000;

pub(crate) fn set_timestamp(env: &Env, timestamp: u64) {
    env.ledger().with_mut(|li| {
        li.timestamp = timestamp;
    });
}

pub(crate) fn assert_contract_error<T, C>(
    result: Result<Result<T, C>, Result<Error, InvokeError>>,
    expected: Error,
) {
    assert!(matches!(result, Err(Ok(err)) if err == expected));
}

pub(crate) fn s(env: &Env, value: &str) -> String {
    String::from_str(env, value)
}

#[contracttype]
#[derive(Clone)]
enum NftKey {
    Owner(u32),
    Minted,
}

/// Bare-bones NFT collection for exercising custody.
#[contract]
pub struct MockNft;

#[contractimpl]
impl MockNft {
    pub fn mint(env: Env, to: Address) -> u32 {
        let token_id: u32 = env.storage().instance().get(&NftKey::Minted).unwrap_or(0);
        env.storage().persistent().set(&NftKey::Owner(token_id), &to);
        env.storage().instance().set(&NftKey::Minted, &(token_id + 1));
        token_id
    }
}

#[contractimpl]
impl NonFungibleToken for MockNft {
    fn owner_of(env: Env, token_id: u32) -> Address {
        env.storage()
            .persistent()
            .get(&NftKey::Owner(token_id))
            .expect("unknown token")
    }

    fn transfer(env: Env, from: Address, to: Address, token_id: u32) {
        from.require_auth();
        let owner: Address = env
            .storage()
            .persistent()
            .get(&NftKey::Owner(token_id))
            .expect("unknown token");
        assert_eq!(owner, from, "transfer from non-owner");
        env.storage().persistent().set(&NftKey::Owner(token_id), &to);
    }
}

/// Second-generation atomic logic: each claim pays half of every balance and
/// leaves the bounty open.
#[contract]
pub struct HalvingAtomicBounty;

#[contractimpl]
impl BountyLogic for HalvingAtomicBounty {
    fn variant(_env: Env) -> BountyVariant {
        BountyVariant::Atomic
    }

    fn version(_env: Env) -> u32 {
        2
    }

    fn configure(env: Env, operation: InitOperation) -> Result<BountyConfig, Error> {
        AtomicBountyV1::configure(env, operation)
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
        let mut payouts = Vec::new(&env);
        for entry in context.pool.iter() {
            payouts.push_back(TokenAmount {
                token: entry.token,
                amount: entry.amount / 2,
            });
        }
        Ok(ClaimPlan {
            payouts: logic::positive(&env, &payouts),
            nft_deposits: Vec::new(&env),
            tier: None,
            record_claim: false,
            close_bounty: false,
        })
    }
}

pub(crate) fn register_implementations(env: &Env, vault: &BountyVaultClient) {
    vault.set_implementation(&BountyVariant::Atomic, &env.register(AtomicBountyV1, ()));
    vault.set_implementation(&BountyVariant::Ongoing, &env.register(OngoingBountyV1, ()));
    vault.set_implementation(
        &BountyVariant::TieredPercentage,
        &env.register(TieredPercentageBountyV1, ()),
    );
    vault.set_implementation(&BountyVariant::TieredFixed, &env.register(TieredFixedBountyV1, ()));
}

fn create_token<'a>(env: &Env, admin: &Address) -> token::Client<'a> {
    let asset = env.register_stellar_asset_contract_v2(admin.clone());
    token::Client::new(env, &asset.address())
}

pub(crate) fn mint_tokens(env: &Env, token: &Address, to: &Address, amount: i128) {
    token::StellarAssetClient::new(env, token).mint(to, &amount);
}

pub(crate) fn mint_nfts(env: &Env, nft: &Address, to: &Address, count: u32) {
    let collection = MockNftClient::new(env, nft);
    for _ in 0..count {
        collection.mint(to);
    }
}

pub(crate) fn atomic_params(env: &Env) -> AtomicParams {
    AtomicParams {
        has_funding_goal: false,
        funding_token: None,
        funding_goal: 0,
        permissioned_claims: true,
        permissioned_open: false,
        invoice_required: false,
        name: s(env, "atomic"),
        description: s(env, "single winner"),
        url: s(env, "https://github.com/openq/issue/1"),
    }
}

pub(crate) fn atomic_op(env: &Env) -> InitOperation {
    InitOperation::Atomic(atomic_params(env))
}

pub(crate) fn ongoing_params(env: &Env, token: &Address, payout: i128) -> OngoingParams {
    OngoingParams {
        payout_token: token.clone(),
        payout_amount: payout,
        has_funding_goal: false,
        funding_token: None,
        funding_goal: 0,
        permissioned_claims: true,
        permissioned_open: false,
        invoice_required: false,
        name: s(env, "ongoing"),
        description: s(env, "repeating payout"),
        url: s(env, "https://github.com/openq/issue/2"),
    }
}

pub(crate) fn ongoing_op(env: &Env, token: &Address, payout: i128) -> InitOperation {
    InitOperation::Ongoing(ongoing_params(env, token, payout))
}

pub(crate) fn tiered_percentage_params(env: &Env, percentages: Vec<u32>) -> TieredPercentageParams {
    TieredPercentageParams {
        tier_percentages: percentages,
        has_funding_goal: false,
        funding_token: None,
        funding_goal: 0,
        permissioned_claims: true,
        permissioned_open: false,
        invoice_required: false,
        name: s(env, "competition"),
        description: s(env, "ranked split"),
        url: s(env, "https://github.com/openq/issue/3"),
    }
}

pub(crate) fn tiered_percentage_op(env: &Env, percentages: Vec<u32>) -> InitOperation {
    InitOperation::TieredPercentage(tiered_percentage_params(env, percentages))
}

pub(crate) fn tiered_fixed_params(
    env: &Env,
    amounts: Vec<i128>,
    token: &Address,
) -> TieredFixedParams {
    TieredFixedParams {
        tier_amounts: amounts,
        payout_token: token.clone(),
        permissioned_claims: true,
        permissioned_open: false,
        invoice_required: false,
        name: s(env, "fixed"),
        description: s(env, "ranked fixed payouts"),
        url: s(env, "https://github.com/openq/issue/4"),
    }
}

pub(crate) fn tiered_fixed_op(env: &Env, amounts: Vec<i128>, token: &Address) -> InitOperation {
    InitOperation::TieredFixed(tiered_fixed_params(env, amounts, token))
}

pub(crate) fn closer(env: &Env, claimant: &Address, handle: &str, tier: u32) -> CloserData {
    CloserData {
        claimant: claimant.clone(),
        claimant_handle: s(env, handle),
        payout_account: claimant.clone(),
        proof_url: s(env, "https://github.com/openq/pull/7"),
        tier,
    }
}

/// Vault driven directly, with plain accounts standing in for the registry
/// and both managers.
pub(crate) struct VaultHarness<'a> {
    pub env: Env,
    pub registry: Address,
    pub deposit_manager: Address,
    pub claim_manager: Address,
    pub issuer: Address,
    pub funder: Address,
    pub vault: BountyVaultClient<'a>,
    pub token: token::Client<'a>,
    pub nft: NftClient<'a>,
}

pub(crate) fn setup_vault<'a>() -> VaultHarness<'a> {
    let env = Env::default();
    env.mock_all_auths();
    set_timestamp(&env, START);

    let admin = Address::generate(&env);
    let registry = Address::generate(&env);
    let deposit_manager = Address::generate(&env);
    let claim_manager = Address::generate(&env);
    let issuer = Address::generate(&env);
    let funder = Address::generate(&env);

    let vault = BountyVaultClient::new(&env, &env.register(BountyVault, ()));
    vault.initialize(&admin, &registry, &deposit_manager, &claim_manager);
    register_implementations(&env, &vault);

    let token = create_token(&env, &admin);
    mint_tokens(&env, &token.address, &funder, FUNDER_BALANCE);
    let nft = NftClient::new(&env, &env.register(MockNft, ()));
    mint_nfts(&env, &nft.address, &funder, 6);

    VaultHarness {
        env,
        registry,
        deposit_manager,
        claim_manager,
        issuer,
        funder,
        vault,
        token,
        nft,
    }
}

/// Every contract deployed and wired the way a live network would be.
pub(crate) struct Protocol<'a> {
    pub env: Env,
    pub admin: Address,
    pub oracle: Address,
    pub issuer: Address,
    pub funder: Address,
    pub vault: BountyVaultClient<'a>,
    pub openq: OpenQClient<'a>,
    pub deposit_manager: DepositManagerClient<'a>,
    pub claim_manager: ClaimManagerClient<'a>,
    pub whitelist: TokenWhitelistClient<'a>,
    pub token: token::Client<'a>,
    pub nft: NftClient<'a>,
}

pub(crate) fn setup_protocol<'a>() -> Protocol<'a> {
    let env = Env::default();
    env.mock_all_auths();
    set_timestamp(&env, START);

    let admin = Address::generate(&env);
    let oracle = Address::generate(&env);
    let issuer = Address::generate(&env);
    let funder = Address::generate(&env);

    let vault = BountyVaultClient::new(&env, &env.register(BountyVault, ()));
    let openq = OpenQClient::new(&env, &env.register(OpenQ, ()));
    let deposit_manager = DepositManagerClient::new(&env, &env.register(DepositManager, ()));
    let claim_manager = ClaimManagerClient::new(&env, &env.register(ClaimManager, ()));
    let whitelist = TokenWhitelistClient::new(&env, &env.register(TokenWhitelist, ()));

    vault.initialize(
        &admin,
        &openq.address,
        &deposit_manager.address,
        &claim_manager.address,
    );
    register_implementations(&env, &vault);
    openq.initialize(&admin, &vault.address, &oracle);
    whitelist.initialize(&admin, &DEFAULT_TOKEN_LIMIT);
    deposit_manager.initialize(&admin, &vault.address, &whitelist.address);
    claim_manager.initialize(&admin, &vault.address, &oracle);

    let token = create_token(&env, &admin);
    mint_tokens(&env, &token.address, &funder, FUNDER_BALANCE);
    whitelist.add_token(&token.address);
    let nft = NftClient::new(&env, &env.register(MockNft, ()));
    mint_nfts(&env, &nft.address, &funder, 6);

    Protocol {
        env,
        admin,
        oracle,
        issuer,
        funder,
        vault,
        openq,
        deposit_manager,
        claim_manager,
        whitelist,
        token,
        nft,
    }
}

impl<'a> Protocol<'a> {
    pub(crate) fn mint(&self, bounty_id: &str, operation: &InitOperation) -> BytesN<32> {
        self.openq
            .mint_bounty(&self.issuer, &s(&self.env, bounty_id), &s(&self.env, "openq"), operation)
    }

    pub(crate) fn fund(&self, bounty: &BytesN<32>, amount: i128, expiration: u64) -> BytesN<32> {
        self.deposit_manager
            .fund_bounty_token(&self.funder, bounty, &self.token.address, &amount, &expiration)
    }

    pub(crate) fn assert_open(&self, bounty: &BytesN<32>, open: bool) {
        let status = self.vault.bounty(bounty).status;
        assert_eq!(status == BountyStatus::Open, open);
    }
}
