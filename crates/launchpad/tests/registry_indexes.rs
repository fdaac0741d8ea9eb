//! Ledger indexes and listings over real launches

mod helpers;

use helpers::*;
use launchpad::{LaunchRequest, QuoteSource};
use launchpad_simulation::named_account;
use launchpad_types::{LaunchpadError, LaunchpadEvent, ResourceBundle};
use proptest::prelude::*;

fn launch_many(h: &mut Harness, count: usize) -> Vec<ResourceBundle> {
    (0..count).map(|i| h.launch(&format!("L{}", i))).collect()
}

#[test]
fn test_every_index_resolves_the_same_bundle() {
    let mut h = Harness::new();
    let bundles = launch_many(&mut h, 3);

    for (index, bundle) in bundles.iter().enumerate() {
        assert_eq!(h.registry.by_index(index), Ok(*bundle));
        assert_eq!(h.registry.by_pool(&bundle.pool), Ok(*bundle));
        assert_eq!(h.registry.by_controller(&bundle.controller), Ok(*bundle));
        assert_eq!(h.registry.by_asset(&bundle.asset_a), Ok(*bundle));
        assert_eq!(h.registry.by_pair(&bundle.asset_a, &bundle.asset_b), Ok(*bundle));
        assert_eq!(h.registry.by_pair(&bundle.asset_b, &bundle.asset_a), Ok(*bundle));
    }

    // The quote asset is shared, so it is not a unique key
    assert_eq!(
        h.registry.by_asset(&h.quote_asset),
        Err(LaunchpadError::ResourcesNotFound)
    );
    assert_eq!(h.registry.by_index(3), Err(LaunchpadError::ResourcesNotFound));
    assert_eq!(
        h.registry.by_pool(&named_account("nowhere")),
        Err(LaunchpadError::ResourcesNotFound)
    );
}

#[test]
fn test_launched_event_index_matches_lookup() {
    let mut h = Harness::new();
    launch_many(&mut h, 3);

    let launched: Vec<_> = h
        .chain
        .events()
        .iter()
        .filter_map(|event| match event {
            LaunchpadEvent::Launched { index, bundle, .. } => Some((*index, *bundle)),
            _ => None,
        })
        .collect();
    assert_eq!(launched.len(), 3);
    for (index, bundle) in launched {
        assert_eq!(h.registry.by_index(index as usize), Ok(bundle));
    }
}

#[test]
fn test_list_by_quote_asset_separates_quotes() {
    let mut h = Harness::new();
    let launcher = h.launcher;
    let other_quote = h
        .chain
        .create_token("Other Quote", "OQT", &launcher, 1_000_000)
        .unwrap();
    let other_vault = h.chain.create_listed_vault(&other_quote).unwrap();

    let first = h.launch("ONE");
    let mut request: LaunchRequest = h.request("TWO");
    request.quote = QuoteSource::Vault(other_vault);
    let second = h.registry.launch(&mut h.chain, &launcher, request).unwrap();
    let third = h.launch("THREE");

    let page = h.registry.list_by_quote_asset(&h.quote_asset, 10, 0);
    assert_eq!(page.total, 2);
    assert_eq!(page.items, vec![first, third]);

    let page = h.registry.list_by_quote_asset(&other_quote, 10, 0);
    assert_eq!(page.items, vec![second]);

    let page = h.registry.list_by_quote_asset(&h.quote_asset, 1, 1);
    assert_eq!((page.total, page.items), (2, vec![third]));

    assert_eq!(
        h.registry.list_by_quote_asset(&named_account("none"), 10, 0).total,
        0
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_list_all_pages_cover_launch_order(
        count in 1usize..5,
        limit in 0usize..6,
        offset in 0usize..7,
        seed in any::<u64>(),
    ) {
        let mut h = Harness::with_seed(seed);
        let bundles = launch_many(&mut h, count);

        let page = h.registry.list_all(limit, offset);
        prop_assert_eq!(page.total, count);

        let start = offset.min(count);
        let end = (start + limit).min(count);
        prop_assert_eq!(page.items, bundles[start..end].to_vec());
    }
}
