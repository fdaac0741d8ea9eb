//! Append-only store of launched bundles with lookup indexes

use std::collections::HashMap;
use std::ops::Range;

use serde::Serialize;

use launchpad_types::{LaunchpadError, LaunchpadResult, PairKey, Pubkey, ResourceBundle};

/// One page of a listing plus the size of the whole listing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Page {
    pub items: Vec<ResourceBundle>,
    pub total: usize,
}

/// Clamp `offset` and `limit` against `total` entries
pub fn window(total: usize, limit: usize, offset: usize) -> Range<usize> {
    if offset >= total {
        return total..total;
    }
    let end = offset + limit.min(total - offset);
    offset..end
}

/// Bundles in launch order, indexed by pool, controller, base asset and pair
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    bundles: Vec<ResourceBundle>,
    by_pool: HashMap<Pubkey, usize>,
    by_controller: HashMap<Pubkey, usize>,
    by_asset: HashMap<Pubkey, usize>,
    by_pair: HashMap<PairKey, usize>,
    by_quote: HashMap<Pubkey, Vec<usize>>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Append `bundle` and index it. Returns its position.
    ///
    /// Every key is checked before anything is written, so a rejected
    /// bundle leaves the ledger untouched.
    pub fn record(&mut self, bundle: ResourceBundle) -> LaunchpadResult<usize> {
        let pair = bundle.pair_key();
        if self.by_pool.contains_key(&bundle.pool) {
            return Err(already_registered("pool", &bundle.pool));
        }
        if self.by_controller.contains_key(&bundle.controller) {
            return Err(already_registered("controller", &bundle.controller));
        }
        if self.by_asset.contains_key(&bundle.asset_a) {
            return Err(already_registered("asset", &bundle.asset_a));
        }
        if self.by_pair.contains_key(&pair) {
            return Err(already_registered("pair", &pair));
        }

        let position = self.bundles.len();
        self.bundles.push(bundle);
        self.by_pool.insert(bundle.pool, position);
        self.by_controller.insert(bundle.controller, position);
        self.by_asset.insert(bundle.asset_a, position);
        self.by_pair.insert(pair, position);
        self.by_quote.entry(bundle.asset_b).or_default().push(position);

        Ok(position)
    }

    pub fn get(&self, position: usize) -> Option<ResourceBundle> {
        self.bundles.get(position).copied()
    }

    pub fn by_pool(&self, pool: &Pubkey) -> Option<ResourceBundle> {
        self.by_pool.get(pool).and_then(|&i| self.get(i))
    }

    pub fn by_controller(&self, controller: &Pubkey) -> Option<ResourceBundle> {
        self.by_controller.get(controller).and_then(|&i| self.get(i))
    }

    /// Lookup by launched (base) asset
    pub fn by_asset(&self, asset: &Pubkey) -> Option<ResourceBundle> {
        self.by_asset.get(asset).and_then(|&i| self.get(i))
    }

    pub fn by_pair(&self, asset_a: &Pubkey, asset_b: &Pubkey) -> Option<ResourceBundle> {
        self.by_pair
            .get(&PairKey::new(asset_a, asset_b))
            .and_then(|&i| self.get(i))
    }

    pub fn list_all(&self, limit: usize, offset: usize) -> Page {
        let range = window(self.bundles.len(), limit, offset);
        Page {
            items: self.bundles[range].to_vec(),
            total: self.bundles.len(),
        }
    }

    /// Bundles quoted in `quote`, in launch order
    pub fn list_by_quote_asset(&self, quote: &Pubkey, limit: usize, offset: usize) -> Page {
        let positions = self.by_quote.get(quote).map(Vec::as_slice).unwrap_or(&[]);
        let range = window(positions.len(), limit, offset);
        Page {
            items: positions[range]
                .iter()
                .filter_map(|&i| self.get(i))
                .collect(),
            total: positions.len(),
        }
    }
}

fn already_registered(kind: &str, key: &dyn std::fmt::Display) -> LaunchpadError {
    LaunchpadError::ResourcesAlreadyRegistered {
        key: format!("{} {}", kind, key),
    }
}
