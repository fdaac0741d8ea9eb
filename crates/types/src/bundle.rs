//! Resource bundles and the keys they are indexed under

use serde::{Deserialize, Serialize};
use solana_program::hash::{hashv, Hash};
use solana_program::pubkey::Pubkey;
use std::cmp::Ordering;

use crate::constants::PAIR_KEY_SEED;

/// Addresses produced by one successful launch
///
/// Recorded once and never mutated. `asset_a`/`vault_a` is the launched
/// (base) side, `asset_b`/`vault_b` the quote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceBundle {
    #[serde(with = "crate::serde_pubkey")]
    pub pool: Pubkey,
    #[serde(with = "crate::serde_pubkey")]
    pub controller: Pubkey,
    #[serde(with = "crate::serde_pubkey")]
    pub asset_a: Pubkey,
    #[serde(with = "crate::serde_pubkey")]
    pub vault_a: Pubkey,
    #[serde(with = "crate::serde_pubkey")]
    pub asset_b: Pubkey,
    #[serde(with = "crate::serde_pubkey")]
    pub vault_b: Pubkey,
}

impl ResourceBundle {
    /// Canonical pair key of the bundle's two assets
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.asset_a, &self.asset_b)
    }
}

/// Sort two assets into canonical order
/// Returns (asset_0, asset_1) where asset_0 < asset_1 by byte comparison
pub fn sort_assets(asset_a: &Pubkey, asset_b: &Pubkey) -> (Pubkey, Pubkey) {
    match asset_a.as_ref().cmp(asset_b.as_ref()) {
        Ordering::Less | Ordering::Equal => (*asset_a, *asset_b),
        Ordering::Greater => (*asset_b, *asset_a),
    }
}

/// Hash of two asset addresses in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(Hash);

impl PairKey {
    pub fn new(asset_a: &Pubkey, asset_b: &Pubkey) -> Self {
        let (asset_0, asset_1) = sort_assets(asset_a, asset_b);
        Self(hashv(&[PAIR_KEY_SEED, asset_0.as_ref(), asset_1.as_ref()]))
    }

    pub fn as_hash(&self) -> &Hash {
        &self.0
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
