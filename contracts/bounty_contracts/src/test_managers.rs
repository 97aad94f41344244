#![cfg(test)]

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, AuthorizedFunction, Events},
    vec, Address, IntoVal,
};

use crate::testutils::{
    assert_contract_error, atomic_op, atomic_params, closer, mint_tokens, ongoing_params, s,
    set_timestamp, setup_protocol, tiered_fixed_op, FUNDER_BALANCE, START,
};
use crate::{
    CompletionTarget, Error, InitOperation, TokenWhitelist, TokenWhitelistClient,
    DEFAULT_TOKEN_LIMIT,
};

const DAY: u64 = 86_400;

#[test]
fn test_fund_bounty_token_records_deposit_through_manager() {
    let p = setup_protocol();
    let bounty = p.mint("issue-1", &atomic_op(&p.env));

    let deposit_id = p.fund(&bounty, 400, DAY);

    let auths = p.env.auths();
    assert_eq!(auths[0].0, p.funder);
    assert!(matches!(
        auths[0].1.function,
        AuthorizedFunction::Contract((_, _, _))
    ));

    assert_eq!(p.vault.funder(&bounty, &deposit_id), p.funder);
    assert_eq!(p.vault.token_balance(&bounty, &p.token.address), 400);
    assert_eq!(p.token.balance(&p.vault.address), 400);
    assert_eq!(p.token.balance(&p.funder), FUNDER_BALANCE - 400);
}

#[test]
fn test_vault_rejects_deposits_not_relayed_by_manager() {
    let p = setup_protocol();
    let bounty = p.mint("issue-1", &atomic_op(&p.env));

    assert_contract_error(
        p.vault
            .try_receive_funds(&p.funder, &bounty, &p.funder, &p.token.address, &100, &DAY),
        Error::UnauthorizedCaller,
    );
    assert_contract_error(
        p.vault
            .try_receive_nft(&p.funder, &bounty, &p.funder, &p.nft.address, &0, &DAY, &0),
        Error::UnauthorizedCaller,
    );
}

#[test]
fn test_fund_bounty_token_rejects_non_whitelisted_token() {
    let p = setup_protocol();
    let bounty = p.mint("issue-1", &atomic_op(&p.env));
    let other = p.env.register_stellar_asset_contract_v2(p.admin.clone()).address();
    mint_tokens(&p.env, &other, &p.funder, 1_000);

    assert_contract_error(
        p.deposit_manager
            .try_fund_bounty_token(&p.funder, &bounty, &other, &100, &DAY),
        Error::TokenNotWhitelisted,
    );
    assert_eq!(p.vault.tokens(&bounty).len(), 0);

    p.whitelist.add_token(&other);
    p.deposit_manager
        .fund_bounty_token(&p.funder, &bounty, &other, &100, &DAY);
    assert_eq!(p.vault.token_balance(&bounty, &other), 100);
}

#[test]
fn test_fund_bounty_nft_bypasses_whitelist() {
    let p = setup_protocol();
    let bounty = p.mint("issue-1", &atomic_op(&p.env));
    assert!(!p.whitelist.is_whitelisted(&p.nft.address));

    let deposit_id = p
        .deposit_manager
        .fund_bounty_nft(&p.funder, &bounty, &p.nft.address, &3, &DAY, &0);

    assert!(p.vault.is_nft(&bounty, &deposit_id));
    assert_eq!(p.nft.owner_of(&3), p.vault.address);
}

#[test]
fn test_fund_bounty_nft_enforces_expiration_and_limit() {
    let p = setup_protocol();
    let bounty = p.mint("issue-1", &atomic_op(&p.env));

    assert_contract_error(
        p.deposit_manager
            .try_fund_bounty_nft(&p.funder, &bounty, &p.nft.address, &0, &0, &0),
        Error::ExpirationNotGreaterThanZero,
    );
    for token_id in 0..5u32 {
        p.deposit_manager
            .fund_bounty_nft(&p.funder, &bounty, &p.nft.address, &token_id, &DAY, &0);
    }
    assert_contract_error(
        p.deposit_manager
            .try_fund_bounty_nft(&p.funder, &bounty, &p.nft.address, &5, &DAY, &0),
        Error::NftDepositLimitReached,
    );
}

#[test]
fn test_permissioned_open_restricts_funding_to_issuer() {
    let p = setup_protocol();
    let mut params = atomic_params(&p.env);
    params.permissioned_open = true;
    let bounty = p.mint("issue-1", &InitOperation::Atomic(params));

    assert_contract_error(
        p.deposit_manager
            .try_fund_bounty_token(&p.funder, &bounty, &p.token.address, &100, &DAY),
        Error::UnauthorizedCaller,
    );

    mint_tokens(&p.env, &p.token.address, &p.issuer, 100);
    p.deposit_manager
        .fund_bounty_token(&p.issuer, &bounty, &p.token.address, &100, &DAY);
    assert_eq!(p.vault.token_balance(&bounty, &p.token.address), 100);
}

#[test]
fn test_refund_through_manager_after_expiry() {
    let p = setup_protocol();
    let bounty = p.mint("issue-1", &atomic_op(&p.env));
    let deposit_id = p.fund(&bounty, 400, DAY);

    assert_contract_error(
        p.deposit_manager
            .try_refund_deposit(&p.funder, &bounty, &deposit_id),
        Error::PrematureRefundRequest,
    );

    set_timestamp(&p.env, START + DAY + 1);
    assert_eq!(
        p.deposit_manager
            .refund_deposit(&p.funder, &bounty, &deposit_id),
        400
    );
    assert_eq!(p.token.balance(&p.funder), FUNDER_BALANCE);
    assert_contract_error(
        p.deposit_manager
            .try_refund_deposit(&p.funder, &bounty, &deposit_id),
        Error::DepositAlreadyRefunded,
    );
}

#[test]
fn test_deposit_rejected_on_closed_bounty() {
    let p = setup_protocol();
    let bounty = p.mint("issue-1", &atomic_op(&p.env));
    p.fund(&bounty, 100, DAY);
    let claimant = Address::generate(&p.env);
    p.claim_manager
        .claim_bounty(&p.oracle, &bounty, &closer(&p.env, &claimant, "alice", 0));

    assert_contract_error(
        p.deposit_manager
            .try_fund_bounty_token(&p.funder, &bounty, &p.token.address, &100, &DAY),
        Error::BountyClosed,
    );
}

#[test]
fn test_whitelist_enforces_capacity_and_uniqueness() {
    let p = setup_protocol();
    assert_eq!(p.whitelist.token_limit(), DEFAULT_TOKEN_LIMIT);
    assert_eq!(p.whitelist.token_count(), 1);

    assert_contract_error(
        p.whitelist.try_add_token(&p.token.address),
        Error::TokenAlreadyWhitelisted,
    );
    for _ in 1..DEFAULT_TOKEN_LIMIT {
        p.whitelist.add_token(&Address::generate(&p.env));
    }
    assert_contract_error(
        p.whitelist.try_add_token(&Address::generate(&p.env)),
        Error::TokenLimitReached,
    );
    assert_contract_error(
        p.whitelist.try_set_token_limit(&(DEFAULT_TOKEN_LIMIT - 1)),
        Error::TokenLimitReached,
    );

    p.whitelist.remove_token(&p.token.address);
    assert!(!p.whitelist.is_whitelisted(&p.token.address));
    assert_contract_error(
        p.whitelist.try_remove_token(&p.token.address),
        Error::TokenNotWhitelisted,
    );

    p.whitelist.set_token_limit(&(DEFAULT_TOKEN_LIMIT + 1));
    p.whitelist.add_token(&p.token.address);
    p.whitelist.add_token(&Address::generate(&p.env));
    assert_eq!(p.whitelist.token_count(), DEFAULT_TOKEN_LIMIT + 1);
}

#[test]
fn test_whitelist_publishes_membership_events() {
    let p = setup_protocol();
    let extra = Address::generate(&p.env);

    p.whitelist.add_token(&extra);
    let events = p.env.events().all();
    assert_eq!(
        events.slice(events.len() - 1..),
        vec![
            &p.env,
            (
                p.whitelist.address.clone(),
                (symbol_short!("wl_add"),).into_val(&p.env),
                extra.into_val(&p.env),
            ),
        ]
    );

    p.whitelist.remove_token(&extra);
    let events = p.env.events().all();
    assert_eq!(
        events.slice(events.len() - 1..),
        vec![
            &p.env,
            (
                p.whitelist.address.clone(),
                (symbol_short!("wl_rm"),).into_val(&p.env),
                extra.into_val(&p.env),
            ),
        ]
    );
}

#[test]
fn test_whitelist_ownership_transfer() {
    let p = setup_protocol();
    let new_owner = Address::generate(&p.env);

    p.whitelist.transfer_ownership(&new_owner);
    assert_eq!(p.whitelist.owner(), new_owner);
    assert_contract_error(
        p.whitelist.try_initialize(&p.admin, &DEFAULT_TOKEN_LIMIT),
        Error::AlreadyInitialized,
    );
}

#[test]
fn test_claim_requires_resolver() {
    let p = setup_protocol();
    let bounty = p.mint("issue-1", &atomic_op(&p.env));
    p.fund(&bounty, 100, DAY);
    let claimant = Address::generate(&p.env);

    assert_contract_error(
        p.claim_manager
            .try_claim_bounty(&claimant, &bounty, &closer(&p.env, &claimant, "alice", 0)),
        Error::UnauthorizedCaller,
    );
    assert_contract_error(
        p.claim_manager
            .try_claim_bounty(&p.issuer, &bounty, &closer(&p.env, &claimant, "alice", 0)),
        Error::UnauthorizedCaller,
    );

    p.claim_manager
        .claim_bounty(&p.oracle, &bounty, &closer(&p.env, &claimant, "alice", 0));
    assert_eq!(p.token.balance(&claimant), 100);
}

#[test]
fn test_issuer_cannot_claim_even_when_claims_unpermissioned() {
    let p = setup_protocol();
    let mut params = atomic_params(&p.env);
    params.permissioned_claims = false;
    let bounty = p.mint("issue-1", &InitOperation::Atomic(params));
    p.fund(&bounty, 500, DAY);

    assert_contract_error(
        p.claim_manager
            .try_claim_bounty(&p.issuer, &bounty, &closer(&p.env, &p.issuer, "issuer", 0)),
        Error::UnauthorizedCaller,
    );
    assert_eq!(p.token.balance(&p.issuer), 0);
    assert_eq!(p.vault.token_balance(&bounty, &p.token.address), 500);
    p.assert_open(&bounty, true);

    let claimant = Address::generate(&p.env);
    p.claim_manager
        .claim_bounty(&p.oracle, &bounty, &closer(&p.env, &claimant, "alice", 0));
    assert_eq!(p.token.balance(&claimant), 500);
}

#[test]
fn test_invoice_required_gates_atomic_claim() {
    let p = setup_protocol();
    let mut params = atomic_params(&p.env);
    params.invoice_required = true;
    let bounty = p.mint("issue-1", &InitOperation::Atomic(params));
    p.fund(&bounty, 100, DAY);
    let claimant = Address::generate(&p.env);
    let data = closer(&p.env, &claimant, "alice", 0);
    let id = s(&p.env, "issue-1");

    assert_contract_error(
        p.claim_manager.try_claim_bounty(&p.oracle, &bounty, &data),
        Error::InvoiceNotComplete,
    );
    p.openq
        .set_invoice_complete(&p.issuer, &id, &CompletionTarget::Bounty, &true);
    assert_contract_error(
        p.claim_manager.try_claim_bounty(&p.oracle, &bounty, &data),
        Error::SupportingDocumentsNotComplete,
    );
    p.openq
        .set_supporting_docs_complete(&p.oracle, &id, &CompletionTarget::Bounty, &true);

    p.claim_manager.claim_bounty(&p.oracle, &bounty, &data);
    assert_eq!(p.token.balance(&claimant), 100);
}

#[test]
fn test_invoice_required_gates_each_ongoing_claim() {
    let p = setup_protocol();
    let mut params = ongoing_params(&p.env, &p.token.address, 50);
    params.invoice_required = true;
    let bounty = p.mint("issue-1", &InitOperation::Ongoing(params));
    p.fund(&bounty, 200, DAY);
    let alice = Address::generate(&p.env);
    let bob = Address::generate(&p.env);
    let alice_claim = closer(&p.env, &alice, "alice", 0);
    let id = s(&p.env, "issue-1");
    let target = CompletionTarget::Claim(crate::ids::claimant_id(
        &p.env,
        &alice_claim.claimant_handle,
        &alice_claim.proof_url,
    ));

    p.openq.set_invoice_complete(&p.oracle, &id, &target, &true);
    p.openq
        .set_supporting_docs_complete(&p.oracle, &id, &target, &true);
    p.claim_manager.claim_bounty(&p.oracle, &bounty, &alice_claim);
    assert_eq!(p.token.balance(&alice), 50);

    assert_contract_error(
        p.claim_manager
            .try_claim_bounty(&p.oracle, &bounty, &closer(&p.env, &bob, "bob", 0)),
        Error::InvoiceNotComplete,
    );
}

#[test]
fn test_manager_rewiring_is_admin_only_and_takes_effect() {
    let p = setup_protocol();
    let resolver = Address::generate(&p.env);

    p.claim_manager.set_oracle(&resolver);
    let auths = p.env.auths();
    assert_eq!(auths[0].0, p.admin);
    assert_eq!(p.claim_manager.oracle(), resolver);

    let op = tiered_fixed_op(&p.env, vec![&p.env, 10_i128], &p.token.address);
    let bounty = p.mint("issue-1", &op);
    p.fund(&bounty, 10, DAY);
    p.openq
        .set_tier_winner(&p.issuer, &s(&p.env, "issue-1"), &0, &s(&p.env, "alice"));
    let alice = Address::generate(&p.env);

    assert_contract_error(
        p.claim_manager
            .try_claim_bounty(&p.oracle, &bounty, &closer(&p.env, &alice, "alice", 0)),
        Error::UnauthorizedCaller,
    );
    p.claim_manager
        .claim_bounty(&resolver, &bounty, &closer(&p.env, &alice, "alice", 0));
    assert_eq!(p.token.balance(&alice), 10);

    assert_contract_error(
        p.deposit_manager.try_initialize(&p.admin, &p.vault.address, &p.whitelist.address),
        Error::AlreadyInitialized,
    );
}

#[test]
fn test_repointing_vault_roles_and_whitelist() {
    let p = setup_protocol();
    let bounty = p.mint("issue-1", &atomic_op(&p.env));

    let fresh = TokenWhitelistClient::new(&p.env, &p.env.register(TokenWhitelist, ()));
    fresh.initialize(&p.admin, &DEFAULT_TOKEN_LIMIT);
    p.deposit_manager.set_whitelist(&fresh.address);
    assert_eq!(p.deposit_manager.whitelist(), fresh.address);
    assert_contract_error(
        p.deposit_manager
            .try_fund_bounty_token(&p.funder, &bounty, &p.token.address, &10, &DAY),
        Error::TokenNotWhitelisted,
    );
    p.deposit_manager.set_whitelist(&p.whitelist.address);
    p.fund(&bounty, 10, DAY);

    let replacement = Address::generate(&p.env);
    p.vault.set_deposit_manager(&replacement);
    assert_eq!(p.vault.deposit_manager(), replacement);
    assert_contract_error(
        p.deposit_manager
            .try_fund_bounty_token(&p.funder, &bounty, &p.token.address, &10, &DAY),
        Error::UnauthorizedCaller,
    );
    assert_eq!(p.vault.token_balance(&bounty, &p.token.address), 10);
}
