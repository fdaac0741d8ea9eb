use serde::Serialize;
use solana_program::hash::hashv;

use launchpad::{
    AssetParams, LaunchEntry, LaunchRegistry, LaunchRequest, LaunchpadConfig, QuoteSource,
    TokenLedger,
};
use launchpad_types::{Hash, Pubkey, ResourceBundle};

use crate::amm::SwapQuote;
use crate::chain::{named_account, MockChain};
use crate::salt_miner::{SaltMiner, DEFAULT_MAX_ATTEMPTS};
use crate::{SimulationError, SimulationResult};

/// Outcome of one scripted launch
#[derive(Debug, Clone, Serialize)]
pub struct LaunchOutcome {
    pub symbol: String,
    pub bundle: ResourceBundle,
    /// Salts tried before the asset address carried the reserved prefix
    pub salt_attempts: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub chain_id: u64,
    #[serde(with = "launchpad_types::serde_pubkey")]
    pub quote_asset: Pubkey,
    #[serde(with = "launchpad_types::serde_pubkey")]
    pub quote_vault: Pubkey,
    pub launches: Vec<LaunchOutcome>,
    pub events: usize,
}

/// Drives a configured sequence of launches against a fresh mock chain
pub struct ScenarioRunner {
    pub chain: MockChain,
    pub registry: LaunchRegistry,
    config: LaunchpadConfig,
    launcher: Pubkey,
    quote_asset: Pubkey,
    quote_vault: Pubkey,
    miner: SaltMiner,
}

impl ScenarioRunner {
    /// Validate the configuration and bootstrap the quote asset and its vault.
    ///
    /// With a `seed` every mined salt, and therefore every address, is
    /// reproducible.
    pub fn new(config: LaunchpadConfig, seed: Option<u64>) -> SimulationResult<Self> {
        config.validate()?;

        let mut chain = MockChain::new(config.chain_id);
        let registry = LaunchRegistry::new(config.registry_config())?;
        let launcher = named_account("launcher");

        let scenario = &config.scenario;
        let quote_asset = chain.create_token(
            &scenario.quote_symbol,
            &scenario.quote_symbol,
            &launcher,
            scenario.quote_supply,
        )?;
        let quote_vault = chain.create_listed_vault(&quote_asset)?;
        log::info!(
            "Bootstrapped quote asset {} ({}) with vault {}",
            scenario.quote_symbol,
            quote_asset,
            quote_vault
        );

        let miner = match seed {
            Some(seed) => SaltMiner::seeded(seed, DEFAULT_MAX_ATTEMPTS),
            None => SaltMiner::new(DEFAULT_MAX_ATTEMPTS),
        };

        Ok(Self {
            chain,
            registry,
            config,
            launcher,
            quote_asset,
            quote_vault,
            miner,
        })
    }

    pub fn launcher(&self) -> Pubkey {
        self.launcher
    }

    pub fn quote_asset(&self) -> Pubkey {
        self.quote_asset
    }

    pub fn quote_vault(&self) -> Pubkey {
        self.quote_vault
    }

    /// Run every configured launch in order
    pub fn run(&mut self) -> SimulationResult<ScenarioReport> {
        let entries = self.config.scenario.launches.clone();
        if entries.is_empty() {
            return Err(SimulationError::InvalidScenario(
                "no launches configured".to_string(),
            ));
        }

        let mut launches = Vec::with_capacity(entries.len());
        for entry in &entries {
            launches.push(self.launch(entry)?);
        }

        Ok(ScenarioReport {
            chain_id: self.config.chain_id,
            quote_asset: self.quote_asset,
            quote_vault: self.quote_vault,
            launches,
            events: self.chain.events().len(),
        })
    }

    /// Mine a salt for `entry` and launch it from the launcher account
    pub fn launch(&mut self, entry: &LaunchEntry) -> SimulationResult<LaunchOutcome> {
        let mined = self
            .miner
            .mine(self.registry.minter(), &self.chain, self.config.chain_id)?;

        let quote = if self.config.scenario.lookup_quote_vault {
            QuoteSource::Asset(self.quote_asset)
        } else {
            QuoteSource::Vault(self.quote_vault)
        };
        let request = LaunchRequest {
            asset: AssetParams {
                name: entry.name.clone(),
                symbol: entry.symbol.clone(),
                total_supply: entry.total_supply,
            },
            asset_salt: mined.salt,
            quote,
            curve: entry.curve,
            fee: entry.fee,
            protocol_fee: entry.protocol_fee,
            hook_salt: hook_salt(&mined.salt),
        };

        let bundle = self.registry.launch(&mut self.chain, &self.launcher, request)?;
        Ok(LaunchOutcome {
            symbol: entry.symbol.clone(),
            bundle,
            salt_attempts: mined.attempts,
        })
    }

    /// Send `amount` of the quote asset from the launcher to `account`
    pub fn fund(&mut self, account: &Pubkey, amount: u64) -> SimulationResult<()> {
        self.chain
            .transfer(&self.launcher, &self.quote_asset, account, amount)?;
        Ok(())
    }

    /// Buy the launched asset of `bundle` with `amount` of the quote asset
    pub fn buy(
        &mut self,
        trader: &Pubkey,
        bundle: &ResourceBundle,
        amount: u64,
    ) -> SimulationResult<SwapQuote> {
        let quote = self
            .chain
            .swap(trader, &bundle.pool, &bundle.asset_b, amount, 0)?;
        Ok(quote)
    }
}

/// AMM salt paired with an asset salt
pub fn hook_salt(asset_salt: &Hash) -> Hash {
    hashv(&[b"hook", asset_salt.as_ref()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(lookup: bool) -> LaunchpadConfig {
        let mut config = LaunchpadConfig::default();
        config.scenario.lookup_quote_vault = lookup;
        config.scenario.launches = vec![
            LaunchEntry::default(),
            LaunchEntry {
                name: "Other".to_string(),
                symbol: "OTHR".to_string(),
                ..LaunchEntry::default()
            },
        ];
        config
    }

    #[test]
    fn test_scenario_launches_every_entry() {
        let mut runner = ScenarioRunner::new(config(false), Some(3)).unwrap();
        let report = runner.run().unwrap();

        assert_eq!(report.launches.len(), 2);
        assert_eq!(runner.registry.len(), 2);
        for outcome in &report.launches {
            assert_eq!(outcome.bundle.asset_b, runner.quote_asset());
            assert_eq!(outcome.bundle.vault_b, runner.quote_vault());
            assert!(runner.registry.minter().has_reserved_prefix(&outcome.bundle.asset_a));
        }
        assert_eq!(
            runner
                .registry
                .list_by_quote_asset(&runner.quote_asset(), 10, 0)
                .total,
            2
        );
    }

    #[test]
    fn test_lookup_resolves_same_vault() {
        let mut runner = ScenarioRunner::new(config(true), Some(5)).unwrap();
        let report = runner.run().unwrap();
        assert!(report
            .launches
            .iter()
            .all(|outcome| outcome.bundle.vault_b == report.quote_vault));
    }

    #[test]
    fn test_buy_moves_launched_asset_to_trader() {
        let mut runner = ScenarioRunner::new(config(false), Some(9)).unwrap();
        let outcome = runner.launch(&LaunchEntry::default()).unwrap();

        let trader = named_account("trader");
        runner.fund(&trader, 1_000_000).unwrap();
        let quote = runner.buy(&trader, &outcome.bundle, 1_000_000).unwrap();

        assert!(quote.amount_out > 0);
        assert_eq!(
            runner.chain.balance_of(&outcome.bundle.asset_a, &trader),
            quote.amount_out
        );
        assert_eq!(runner.chain.balance_of(&runner.quote_asset(), &trader), 0);
    }

    #[test]
    fn test_empty_scenario_is_rejected() {
        let mut runner = ScenarioRunner::new(LaunchpadConfig::default(), Some(1)).unwrap();
        assert!(matches!(runner.run(), Err(SimulationError::InvalidScenario(_))));
    }
}
