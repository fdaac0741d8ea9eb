//! Chain-scoped salts and typed init code for salted deployment

use solana_program::hash::{hashv, Hash};
use solana_program::pubkey::Pubkey;

use crate::constants::{ASSET_CODE_SEED, CONTROLLER_CODE_SEED};

/// Salt combined with the chain identity
///
/// Only constructible through [`GuardedSalt::derive`], so a raw salt can
/// never reach a deployer by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuardedSalt(Hash);

impl GuardedSalt {
    /// `hash(chain_id_be || salt)`
    pub fn derive(chain_id: u64, salt: &Hash) -> Self {
        Self(hashv(&[&chain_id.to_be_bytes(), salt.as_ref()]))
    }

    pub fn as_hash(&self) -> &Hash {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl AsRef<[u8]> for GuardedSalt {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl std::fmt::Display for GuardedSalt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Constructor arguments of a fixed-supply asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInit {
    pub name: String,
    pub symbol: String,
    pub mint_to: Pubkey,
    pub total_supply: u64,
}

/// Constructor arguments of a position controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerInit {
    pub registry: Pubkey,
    pub owner: Pubkey,
    pub asset_a: Pubkey,
    pub vault_a: Pubkey,
    pub asset_b: Pubkey,
    pub vault_b: Pubkey,
}

/// Typed deployment payload handed to the salted deployer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitCode {
    Asset(AssetInit),
    Controller(ControllerInit),
}

impl InitCode {
    /// Deterministic hash of the code and its constructor arguments
    pub fn code_hash(&self) -> Hash {
        match self {
            InitCode::Asset(init) => hashv(&[
                ASSET_CODE_SEED,
                &(init.name.len() as u32).to_le_bytes(),
                init.name.as_bytes(),
                &(init.symbol.len() as u32).to_le_bytes(),
                init.symbol.as_bytes(),
                init.mint_to.as_ref(),
                &init.total_supply.to_le_bytes(),
            ]),
            InitCode::Controller(init) => hashv(&[
                CONTROLLER_CODE_SEED,
                init.registry.as_ref(),
                init.owner.as_ref(),
                init.asset_a.as_ref(),
                init.vault_a.as_ref(),
                init.asset_b.as_ref(),
                init.vault_b.as_ref(),
            ]),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InitCode::Asset(_) => "asset",
            InitCode::Controller(_) => "controller",
        }
    }
}
