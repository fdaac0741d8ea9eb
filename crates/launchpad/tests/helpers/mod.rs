//! Test helpers

#![allow(dead_code)]

use launchpad::{
    AssetParams, LaunchRegistry, LaunchRequest, MinterConfig, QuoteSource, RegistryConfig,
    TokenLedger,
};
use launchpad_simulation::{hook_salt, named_account, MockChain, SaltMiner};
use launchpad_types::{CurveParams, Hash, ProtocolFeeParams, Pubkey, ResourceBundle, WAD};

pub const CHAIN_ID: u64 = 1;
pub const SUPPLY: u64 = 60_000_000_000;
pub const QUOTE_SUPPLY: u64 = 1_000_000_000_000;

/// 0.85 on both sides
pub const CONCENTRATION: u64 = WAD / 100 * 85;

/// 1 bp
pub const FEE: u64 = WAD / 10_000;

pub struct Harness {
    pub chain: MockChain,
    pub registry: LaunchRegistry,
    pub launcher: Pubkey,
    pub quote_asset: Pubkey,
    pub quote_vault: Pubkey,
    miner: SaltMiner,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut chain = MockChain::new(CHAIN_ID);
        let launcher = named_account("launcher");
        let quote_asset = chain
            .create_token("Quote", "QTE", &launcher, QUOTE_SUPPLY)
            .unwrap();
        let quote_vault = chain.create_listed_vault(&quote_asset).unwrap();

        let registry = LaunchRegistry::new(RegistryConfig {
            address: named_account("registry"),
            minter: MinterConfig::default(),
        })
        .unwrap();

        Self {
            chain,
            registry,
            launcher,
            quote_asset,
            quote_vault,
            miner: SaltMiner::seeded(seed, 1_000_000),
        }
    }

    /// Salt whose asset address carries the reserved prefix
    pub fn mine_salt(&mut self) -> Hash {
        self.miner
            .mine(self.registry.minter(), &self.chain, CHAIN_ID)
            .unwrap()
            .salt
    }

    /// Salt whose asset address does not carry the reserved prefix
    pub fn unprefixed_salt(&self) -> Hash {
        (0u8..=255)
            .map(|byte| Hash::new_from_array([byte; 32]))
            .find(|salt| {
                let address = self
                    .registry
                    .minter()
                    .predict_asset_address(&self.chain, CHAIN_ID, salt);
                !self.registry.minter().has_reserved_prefix(&address)
            })
            .unwrap()
    }

    /// Launch request selling the whole supply against the quote vault
    pub fn request(&mut self, symbol: &str) -> LaunchRequest {
        let asset_salt = self.mine_salt();
        LaunchRequest {
            asset: AssetParams {
                name: format!("{} Token", symbol),
                symbol: symbol.to_string(),
                total_supply: SUPPLY,
            },
            asset_salt,
            quote: QuoteSource::Vault(self.quote_vault),
            curve: launch_curve(SUPPLY),
            fee: FEE,
            protocol_fee: ProtocolFeeParams {
                protocol_fee: 0,
                recipient: named_account("treasury"),
            },
            hook_salt: hook_salt(&asset_salt),
        }
    }

    pub fn launch(&mut self, symbol: &str) -> ResourceBundle {
        let request = self.request(symbol);
        let launcher = self.launcher;
        self.registry
            .launch(&mut self.chain, &launcher, request)
            .unwrap()
    }

    /// Give `account` some of the quote asset
    pub fn fund(&mut self, account: &Pubkey, amount: u64) {
        let (launcher, quote) = (self.launcher, self.quote_asset);
        self.chain.transfer(&launcher, &quote, account, amount).unwrap();
    }
}

/// Single-sided curve with the whole supply as the base equilibrium
pub fn launch_curve(supply: u64) -> CurveParams {
    CurveParams {
        equilibrium_reserve_a: supply,
        equilibrium_reserve_b: 0,
        price_a: WAD,
        price_b: WAD,
        concentration_a: CONCENTRATION,
        concentration_b: CONCENTRATION,
    }
}
