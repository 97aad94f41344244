//! Deterministic identifiers. All are keccak-256 digests over the XDR
//! encoding of their inputs, so off-chain indexers can recompute them.

use soroban_sdk::{symbol_short, xdr::ToXdr, BytesN, Env, String};

/// Address of the bounty instance minted for `bounty_id`.
pub fn bounty_address(env: &Env, bounty_id: &String) -> BytesN<32> {
    let preimage = (symbol_short!("bounty"), bounty_id.clone()).to_xdr(env);
    env.crypto().keccak256(&preimage).to_bytes()
}

/// Id of the deposit recorded when the bounty had seen `deposit_count` deposits.
pub fn deposit_id(env: &Env, bounty_id: &String, deposit_count: u32) -> BytesN<32> {
    let preimage = (bounty_id.clone(), deposit_count).to_xdr(env);
    env.crypto().keccak256(&preimage).to_bytes()
}

/// Claim id for a claimant handle and the work it delivered.
pub fn claimant_id(env: &Env, claimant_handle: &String, proof_url: &String) -> BytesN<32> {
    let preimage = (claimant_handle.clone(), proof_url.clone()).to_xdr(env);
    env.crypto().keccak256(&preimage).to_bytes()
}
