use soroban_sdk::{contractclient, Address, Env};

/// Minimal non-fungible token surface the vault needs to take and release custody.
#[contractclient(name = "NftClient")]
pub trait NonFungibleToken {
    fn owner_of(env: Env, token_id: u32) -> Address;

    /// Moves `token_id` from `from` to `to`. Requires `from` to authorize.
    fn transfer(env: Env, from: Address, to: Address, token_id: u32);
}
