use soroban_sdk::{contracttype, Address, BytesN, String, Vec};

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum BountyVariant {
    Atomic = 0,
    Ongoing = 1,
    TieredPercentage = 2,
    TieredFixed = 3,
}

impl BountyVariant {
    pub fn is_tiered(&self) -> bool {
        matches!(self, BountyVariant::TieredPercentage | BountyVariant::TieredFixed)
    }
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum BountyStatus {
    Open = 0,
    Closed = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AtomicParams {
    pub has_funding_goal: bool,
    pub funding_token: Option<Address>,
    pub funding_goal: i128,
    pub permissioned_claims: bool,
    pub permissioned_open: bool,
    pub invoice_required: bool,
    pub name: String,
    pub description: String,
    pub url: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OngoingParams {
    pub payout_token: Address,
    pub payout_amount: i128,
    pub has_funding_goal: bool,
    pub funding_token: Option<Address>,
    pub funding_goal: i128,
    pub permissioned_claims: bool,
    pub permissioned_open: bool,
    pub invoice_required: bool,
    pub name: String,
    pub description: String,
    pub url: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TieredPercentageParams {
    /// Whole-number percentages, one per tier, summing to 100.
    pub tier_percentages: Vec<u32>,
    pub has_funding_goal: bool,
    pub funding_token: Option<Address>,
    pub funding_goal: i128,
    pub permissioned_claims: bool,
    pub permissioned_open: bool,
    pub invoice_required: bool,
    pub name: String,
    pub description: String,
    pub url: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TieredFixedParams {
    /// Fixed payout per tier, denominated in `payout_token`.
    pub tier_amounts: Vec<i128>,
    pub payout_token: Address,
    pub permissioned_claims: bool,
    pub permissioned_open: bool,
    pub invoice_required: bool,
    pub name: String,
    pub description: String,
    pub url: String,
}

/// Variant-specific initialisation data carried by a mint.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InitOperation {
    Atomic(AtomicParams),
    Ongoing(OngoingParams),
    TieredPercentage(TieredPercentageParams),
    TieredFixed(TieredFixedParams),
}

impl InitOperation {
    pub fn variant(&self) -> BountyVariant {
        match self {
            InitOperation::Atomic(_) => BountyVariant::Atomic,
            InitOperation::Ongoing(_) => BountyVariant::Ongoing,
            InitOperation::TieredPercentage(_) => BountyVariant::TieredPercentage,
            InitOperation::TieredFixed(_) => BountyVariant::TieredFixed,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundingGoal {
    pub token: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OngoingPayout {
    pub token: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PayoutTerms {
    Atomic,
    Ongoing(OngoingPayout),
    TieredPercentage,
    /// Token every fixed tier pays out in.
    TieredFixed(Address),
}

/// Validated configuration an implementation derives from an [`InitOperation`].
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BountyConfig {
    pub funding_goal: Option<FundingGoal>,
    pub permissioned_claims: bool,
    pub permissioned_open: bool,
    pub invoice_required: bool,
    pub name: String,
    pub description: String,
    pub url: String,
    pub terms: PayoutTerms,
    /// Tier shares: percentages or fixed amounts. Empty for untiered variants.
    pub shares: Vec<i128>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bounty {
    pub bounty_id: String,
    pub issuer: Address,
    pub organization: String,
    pub variant: BountyVariant,
    pub status: BountyStatus,
    pub funding_goal: Option<FundingGoal>,
    pub terms: PayoutTerms,
    pub permissioned_claims: bool,
    pub permissioned_open: bool,
    pub invoice_required: bool,
    pub name: String,
    pub description: String,
    pub url: String,
    pub created_at: u64,
    pub closed_at: u64,
    pub closer: Option<Address>,
    pub deposit_count: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    pub deposit_id: BytesN<32>,
    pub funder: Address,
    pub token: Address,
    /// Zero for NFT deposits.
    pub amount: i128,
    pub token_id: u32,
    pub is_nft: bool,
    /// Tier an NFT deposit is reserved for. Zero for fungible deposits.
    pub tier: u32,
    pub deposit_time: u64,
    /// Seconds after `deposit_time` before the funder may refund.
    pub expiration: u64,
    pub withdrawn: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tier {
    /// Percentage of the closing snapshot, or a fixed amount.
    pub share: i128,
    pub winner: Option<String>,
    pub invoice_complete: bool,
    pub supporting_documents_complete: bool,
    pub claimed: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Gates {
    pub invoice_complete: bool,
    pub supporting_documents_complete: bool,
}

impl Gates {
    pub fn pending() -> Self {
        Gates {
            invoice_complete: false,
            supporting_documents_complete: false,
        }
    }
}

/// What a completion flag applies to: the whole bounty (atomic), a tier
/// (tiered variants) or one claimant's claim (ongoing).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompletionTarget {
    Bounty,
    Tier(u32),
    Claim(BytesN<32>),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenAmount {
    pub token: Address,
    pub amount: i128,
}

/// Resolver-supplied description of who is being paid and why.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CloserData {
    pub claimant: Address,
    /// Off-chain identity; matched against tier winners.
    pub claimant_handle: String,
    pub payout_account: Address,
    /// Identifies the delivered work; pairs with the handle to form the claim id.
    pub proof_url: String,
    pub tier: u32,
}

/// Read-only state handed to an implementation when planning a claim.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimContext {
    pub bounty: Bounty,
    pub tiers: Vec<Tier>,
    /// Current attributed balance per token.
    pub pool: Vec<TokenAmount>,
    /// Balances frozen when a competition closed.
    pub funding_totals: Vec<TokenAmount>,
    /// Outstanding (not withdrawn) NFT deposits.
    pub nft_deposits: Vec<Deposit>,
    pub claim_id: BytesN<32>,
    pub already_claimed: bool,
}

/// Transfers and state transitions an implementation asks the vault to apply.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimPlan {
    pub payouts: Vec<TokenAmount>,
    pub nft_deposits: Vec<BytesN<32>>,
    pub tier: Option<u32>,
    pub record_claim: bool,
    pub close_bounty: bool,
}
