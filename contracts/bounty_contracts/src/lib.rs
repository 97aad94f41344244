#![no_std]

//! Bounty custody and payout contracts.
//!
//! Funders deposit fungible tokens or NFTs against a task through the
//! [`DepositManager`]. A trusted resolver later finalises payouts through the
//! [`ClaimManager`]. Every bounty instance lives in the [`BountyVault`], which
//! owns the instance's ledger state and custody but forwards variant
//! behaviour to a shared, upgradeable implementation contract per
//! [`BountyVariant`]. The [`OpenQ`] registry maps task ids to instances and is
//! the privileged caller for minting and tier bookkeeping.

use soroban_sdk::{contracterror, InvokeError};

mod events;
mod ledger;
mod storage;
mod tiers;

pub mod atomic;
pub mod claim_manager;
pub mod deposit_manager;
pub mod ids;
pub mod logic;
pub mod nft;
pub mod ongoing;
pub mod openq;
pub mod tiered_fixed;
pub mod tiered_percentage;
pub mod types;
pub mod vault;
pub mod whitelist;

pub use atomic::AtomicBountyV1;
pub use claim_manager::{ClaimManager, ClaimManagerClient};
pub use deposit_manager::{DepositManager, DepositManagerClient};
pub use logic::{BountyLogic, BountyLogicClient};
pub use nft::{NftClient, NonFungibleToken};
pub use ongoing::OngoingBountyV1;
pub use openq::{OpenQ, OpenQClient};
pub use tiered_fixed::TieredFixedBountyV1;
pub use tiered_percentage::TieredPercentageBountyV1;
pub use types::*;
pub use vault::{BountyVault, BountyVaultClient};
pub use whitelist::{TokenWhitelist, TokenWhitelistClient};

/// Maximum number of outstanding NFT deposits a single bounty may hold.
pub const NFT_DEPOSIT_LIMIT: u32 = 5;

/// Whitelist capacity used when none is configured explicitly.
pub const DEFAULT_TOKEN_LIMIT: u32 = 5;

/// Percentage tiers must add up to exactly this value.
pub const PERCENTAGE_TOTAL: i128 = 100;

#[contracterror]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    UnauthorizedCaller = 3,
    BountyNotFound = 4,
    BountyAlreadyExists = 5,
    ExpirationNotGreaterThanZero = 6,
    NftDepositLimitReached = 7,
    TokenNotWhitelisted = 8,
    TokenAlreadyWhitelisted = 9,
    TokenLimitReached = 10,
    InvalidAmount = 11,
    InvalidFundingGoal = 12,
    DepositNotFound = 13,
    OnlyFunderCanRefund = 14,
    PrematureRefundRequest = 15,
    DepositAlreadyRefunded = 16,
    BountyClosed = 17,
    CompetitionNotClosed = 18,
    InvalidTier = 19,
    InvalidTierSchedule = 20,
    TierPercentagesNotOneHundred = 21,
    TierWinnerNotSet = 22,
    ClaimantNotTierWinner = 23,
    TierAlreadyClaimed = 24,
    ClaimantAlreadyClaimed = 25,
    InvoiceNotComplete = 26,
    SupportingDocumentsNotComplete = 27,
    InvalidCompletionTarget = 28,
    InsufficientFunds = 29,
    /// The operation does not apply to the bounty's variant.
    VariantMismatch = 30,
    ImplementationNotSet = 31,
    /// A nested call failed without a contract error (host trap or bad return value).
    ExternalCallFailed = 32,
    MathOverflow = 33,
}

/// Collapses the result of a generated `try_*` client call back into this
/// crate's error type. Contract errors keep their code; host failures and
/// undecodable return values become [`Error::ExternalCallFailed`].
pub(crate) fn lift<T, C, E>(
    result: Result<Result<T, C>, Result<E, InvokeError>>,
) -> Result<T, Error>
where
    E: TryInto<Error>,
{
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(Error::ExternalCallFailed),
        Err(Ok(err)) => Err(err.try_into().unwrap_or(Error::ExternalCallFailed)),
        Err(Err(_)) => Err(Error::ExternalCallFailed),
    }
}

#[cfg(test)]
mod testutils;
#[cfg(test)]
mod test_managers;
