//! End-to-end launches against the simulated chain

mod helpers;

use helpers::*;
use launchpad::{
    controller_salt, AddressDeterminism, AmmFactory, BatchExecutor, ControllerState, QuoteSource,
    TokenLedger, VaultApi,
};
use launchpad_simulation::named_account;
use launchpad_types::{LaunchpadError, LaunchpadEvent, PoolParams, PoolSide, Pubkey, WAD};

#[test]
fn test_launch_swap_close() {
    let mut h = Harness::new();
    let request = h.request("LNCH");
    let (asset_salt, hook) = (request.asset_salt, request.hook_salt);
    let protocol_fee = request.protocol_fee;
    let launcher = h.launcher;

    let bundle = h.registry.launch(&mut h.chain, &launcher, request).unwrap();

    // Addresses land where they were predicted
    let determinism = AddressDeterminism::new(CHAIN_ID);
    assert_eq!(bundle.asset_a, determinism.predict_for_salt(&h.chain, &asset_salt));
    assert_eq!(
        bundle.controller,
        determinism.predict_for_salt(&h.chain, &controller_salt(&bundle.asset_a))
    );
    assert!(h.registry.minter().has_reserved_prefix(&bundle.asset_a));
    assert_eq!((bundle.asset_b, bundle.vault_b), (h.quote_asset, h.quote_vault));

    let side_a = PoolSide {
        asset: bundle.asset_a,
        vault: bundle.vault_a,
        equilibrium_reserve: SUPPLY,
        price: WAD,
        concentration: CONCENTRATION,
        initial_reserve: SUPPLY,
    };
    let side_b = PoolSide {
        asset: bundle.asset_b,
        vault: bundle.vault_b,
        equilibrium_reserve: 0,
        price: WAD,
        concentration: CONCENTRATION,
        initial_reserve: 0,
    };
    let (params, _, _) =
        PoolParams::canonical(bundle.controller, &side_a, &side_b, FEE, &protocol_fee);
    assert_eq!(bundle.pool, h.chain.compute_instance_address(&params, &hook));
    assert_eq!(h.chain.instance_of(&bundle.controller), Some(bundle.pool));
    assert!(h.chain.is_operator(&bundle.controller, &bundle.pool));

    // The whole supply sits in the base vault on the controller's behalf
    assert_eq!(h.chain.total_supply(&bundle.asset_a), Ok(SUPPLY));
    assert_eq!(h.chain.balance_of(&bundle.asset_a, &bundle.controller), 0);
    assert_eq!(h.chain.balance_of(&bundle.asset_a, &h.registry.address()), 0);
    assert_eq!(h.chain.total_assets(&bundle.vault_a), Ok(SUPPLY));
    assert_eq!(h.chain.max_withdraw(&bundle.vault_a, &bundle.controller), Ok(SUPPLY));

    let controller = h.registry.controller(&bundle.controller).unwrap();
    assert_eq!(controller.state(), ControllerState::Live { pool: bundle.pool });
    assert_eq!(controller.owner(), Some(launcher));

    // Buy with one unit of the quote asset
    let trader = named_account("trader");
    h.fund(&trader, 1_000_000_000);
    let quote = h
        .chain
        .swap(&trader, &bundle.pool, &h.quote_asset, 1_000_000_000, 0)
        .unwrap();
    assert!(quote.amount_out > 997_000_000 && quote.amount_out < 998_000_000);
    assert_eq!(h.chain.balance_of(&bundle.asset_a, &trader), quote.amount_out);
    assert_eq!(h.chain.total_assets(&bundle.vault_b), Ok(1_000_000_000));

    // Only the owner can close
    let stranger = named_account("stranger");
    let recipient = named_account("recipient");
    let controller = h.registry.controller_mut(&bundle.controller).unwrap();
    assert_eq!(
        controller.close(&mut h.chain, &stranger, &recipient),
        Err(LaunchpadError::unauthorized(stranger, Some(launcher)))
    );

    let closed = controller.close(&mut h.chain, &launcher, &recipient).unwrap();
    assert_eq!(closed, (SUPPLY - quote.amount_out, 1_000_000_000));
    assert_eq!(controller.state(), ControllerState::Closed { pool: bundle.pool });
    assert_eq!(
        h.chain.balance_of(&bundle.asset_a, &recipient),
        SUPPLY - quote.amount_out
    );
    assert_eq!(h.chain.balance_of(&h.quote_asset, &recipient), 1_000_000_000);
    assert_eq!(h.chain.instance_of(&bundle.controller), None);
    assert!(!h.chain.is_operator(&bundle.controller, &bundle.pool));
    assert_eq!(h.chain.max_withdraw(&bundle.vault_a, &bundle.controller), Ok(0));

    assert_eq!(
        controller.close(&mut h.chain, &launcher, &recipient),
        Err(LaunchpadError::AlreadyClosed {
            controller: bundle.controller
        })
    );
}

#[test]
fn test_launch_emits_events_in_order() {
    let mut h = Harness::new();
    let bundle = h.launch("LNCH");

    let events = h.chain.events();
    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[0],
        LaunchpadEvent::AssetMinted { asset, total_supply, .. }
            if *asset == bundle.asset_a && *total_supply == SUPPLY
    ));
    assert!(matches!(
        &events[1],
        LaunchpadEvent::PoolDeployed { pool, controller, .. }
            if *pool == bundle.pool && *controller == bundle.controller
    ));
    assert_eq!(
        events[2],
        LaunchpadEvent::Launched {
            index: 0,
            owner: h.launcher,
            bundle,
        }
    );
}

#[test]
fn test_quote_vault_lookup_by_asset() {
    let mut h = Harness::new();
    let mut request = h.request("LNCH");
    request.quote = QuoteSource::Asset(h.quote_asset);
    let launcher = h.launcher;

    let bundle = h.registry.launch(&mut h.chain, &launcher, request).unwrap();
    assert_eq!(bundle.vault_b, h.quote_vault);
}

#[test]
fn test_missing_quote_vault_fails_before_any_deployment() {
    let mut h = Harness::new();
    let launcher = h.launcher;
    let unlisted = h
        .chain
        .create_token("Unlisted", "UNL", &launcher, 1_000)
        .unwrap();

    let mut request = h.request("LNCH");
    request.quote = QuoteSource::Asset(unlisted);
    let predicted = AddressDeterminism::new(CHAIN_ID).predict_for_salt(&h.chain, &request.asset_salt);

    assert_eq!(
        h.registry.launch(&mut h.chain, &launcher, request),
        Err(LaunchpadError::QuoteVaultNotFound { asset: unlisted })
    );
    assert!(!h.chain.state().deployments.is_deployed(&predicted));
    assert!(h.chain.events().is_empty());
    assert!(h.registry.is_empty());
}

#[test]
fn test_unknown_quote_vault_is_rejected() {
    let mut h = Harness::new();
    let mut request = h.request("LNCH");
    let bogus = Pubkey::new_unique();
    request.quote = QuoteSource::Vault(bogus);
    let launcher = h.launcher;

    assert!(matches!(
        h.registry.launch(&mut h.chain, &launcher, request),
        Err(LaunchpadError::InvalidVault { vault, .. }) if vault == bogus
    ));
}

#[test]
fn test_failed_registration_rolls_back_whole_launch() {
    // Same seed, same chain: this is where the rejected launch would have landed
    let expected = Harness::new().launch("LNCH");

    let mut h = Harness::new();
    let request = h.request("LNCH");
    let launcher = h.launcher;
    let predicted = AddressDeterminism::new(CHAIN_ID).predict_for_salt(&h.chain, &request.asset_salt);
    assert_eq!(predicted, expected.asset_a);
    let quote_balance = h.chain.balance_of(&h.quote_asset, &launcher);

    h.chain.failures_mut().reject_registrations = true;
    let result = h.registry.launch(&mut h.chain, &launcher, request.clone());
    assert!(matches!(result, Err(LaunchpadError::Downstream { .. })));

    assert!(h.registry.is_empty());
    assert!(h.chain.events().is_empty());
    assert!(!h.chain.state().tokens.exists(&predicted));
    assert!(!h.chain.state().deployments.is_deployed(&predicted));
    assert_eq!(h.chain.balance_of(&h.quote_asset, &launcher), quote_balance);

    // The operator grant batched with the rejected registration is gone too
    assert!(!h.chain.state().deployments.is_deployed(&expected.controller));
    assert!(!h.chain.is_operator(&expected.controller, &expected.pool));
    assert_eq!(h.chain.instance_of(&expected.controller), None);

    // Nothing was left behind, so the very same request goes through
    h.chain.failures_mut().reject_registrations = false;
    let bundle = h.registry.launch(&mut h.chain, &launcher, request).unwrap();
    assert_eq!(bundle, expected);
    assert!(h.chain.is_operator(&bundle.controller, &bundle.pool));
    assert_eq!(h.registry.len(), 1);
}

#[test]
fn test_misplaced_controller_is_rejected() {
    let mut h = Harness::new();
    let request = h.request("LNCH");
    let launcher = h.launcher;
    h.chain.failures_mut().skew_controller_deployments = true;

    let result = h.registry.launch(&mut h.chain, &launcher, request);
    assert!(matches!(result, Err(LaunchpadError::InvalidController { .. })));
    assert!(h.registry.is_empty());
    assert!(h.chain.events().is_empty());
}

#[test]
fn test_asset_outside_reserved_namespace_is_rejected() {
    let mut h = Harness::new();
    let mut request = h.request("LNCH");
    request.asset_salt = h.unprefixed_salt();
    let launcher = h.launcher;

    let result = h.registry.launch(&mut h.chain, &launcher, request);
    assert!(matches!(result, Err(LaunchpadError::InvalidAssetPrefix { .. })));
    assert!(h.registry.is_empty());
    assert!(h.chain.events().is_empty());
}

#[test]
fn test_metadata_is_checked_first() {
    let mut h = Harness::new();
    let launcher = h.launcher;

    let mut request = h.request("LNCH");
    request.asset.name.clear();
    assert_eq!(
        h.registry.launch(&mut h.chain, &launcher, request),
        Err(LaunchpadError::EmptyName)
    );

    let mut request = h.request("LNCH");
    request.asset.symbol = "S".repeat(32);
    assert_eq!(
        h.registry.launch(&mut h.chain, &launcher, request),
        Err(LaunchpadError::SymbolTooLong { len: 32, max: 32 })
    );

    let mut request = h.request("LNCH");
    request.asset.total_supply = 0;
    assert!(matches!(
        h.registry.launch(&mut h.chain, &launcher, request),
        Err(LaunchpadError::InvalidParameter { .. })
    ));
    assert!(h.registry.is_empty());
}

#[test]
fn test_reused_asset_salt_cannot_launch_twice() {
    let mut h = Harness::new();
    let request = h.request("LNCH");
    let launcher = h.launcher;

    h.registry
        .launch(&mut h.chain, &launcher, request.clone())
        .unwrap();
    assert!(h.registry.launch(&mut h.chain, &launcher, request).is_err());
    assert_eq!(h.registry.len(), 1);
    assert_eq!(h.chain.events().len(), 3);
}

#[test]
fn test_zero_caller_is_rejected() {
    let mut h = Harness::new();
    let request = h.request("LNCH");
    assert_eq!(
        h.registry.launch(&mut h.chain, &Pubkey::default(), request),
        Err(LaunchpadError::ZeroAddress { field: "caller" })
    );
}
