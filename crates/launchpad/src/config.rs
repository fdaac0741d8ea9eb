use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use launchpad_types::{
    serde_pubkey, CurveParams, LaunchpadError, LaunchpadResult, ProtocolFeeParams, Pubkey,
    MAX_CONCENTRATION, MAX_FEE, MAX_PROTOCOL_FEE, WAD,
};

use crate::asset::MinterConfig;
use crate::registry::RegistryConfig;

/// Registry address used when none is configured
const DEFAULT_REGISTRY: [u8; 32] = [0xF1; 32];

/// Launchpad configuration loaded from a TOML file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LaunchpadConfig {
    /// Chain identity mixed into every deployment salt
    pub chain_id: u64,

    /// Launch registry address
    #[serde(with = "serde_pubkey")]
    pub registry: Pubkey,

    /// Asset minting rules
    #[serde(default)]
    pub minter: MinterConfig,

    /// Launches replayed by the simulation
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

/// A quote asset and the launches paired against it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScenarioConfig {
    /// Symbol of the quote asset bootstrapped before any launch
    pub quote_symbol: String,

    /// Supply of the quote asset, held by the launcher
    pub quote_supply: u64,

    /// Look the quote vault up by asset instead of passing it directly
    #[serde(default)]
    pub lookup_quote_vault: bool,

    /// Launches to run, in order
    #[serde(default)]
    pub launches: Vec<LaunchEntry>,
}

/// One launch of the scenario
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LaunchEntry {
    pub name: String,
    pub symbol: String,
    pub total_supply: u64,

    /// Curve parameters in base/quote order
    pub curve: CurveParams,

    /// WAD-scaled swap fee
    pub fee: u64,

    #[serde(default)]
    pub protocol_fee: ProtocolFeeParams,
}

impl LaunchpadConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> LaunchpadResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LaunchpadError::invalid_configuration(
                "config",
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: LaunchpadConfig = toml::from_str(&content).map_err(|e| {
            LaunchpadError::invalid_configuration(
                "config",
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> LaunchpadResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| {
            LaunchpadError::invalid_configuration(
                "config",
                format!("Failed to serialize config: {}", e),
            )
        })?;
        fs::write(path, content).map_err(|e| {
            LaunchpadError::invalid_configuration(
                "config",
                format!("Failed to write config file {}: {}", path.display(), e),
            )
        })?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> LaunchpadResult<()> {
        if self.chain_id == 0 {
            return Err(LaunchpadError::invalid_parameter(
                "chain_id",
                "0",
                "greater than 0",
            ));
        }

        if self.registry == Pubkey::default() {
            return Err(LaunchpadError::ZeroAddress { field: "registry" });
        }

        self.minter.validate()?;
        self.scenario.validate(&self.minter)?;

        Ok(())
    }

    /// Runtime settings for the launch registry
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            address: self.registry,
            minter: self.minter.clone(),
        }
    }
}

impl ScenarioConfig {
    fn validate(&self, minter: &MinterConfig) -> LaunchpadResult<()> {
        if self.quote_symbol.is_empty() {
            return Err(LaunchpadError::invalid_parameter(
                "quote_symbol",
                "empty",
                "non-empty string",
            ));
        }

        for launch in &self.launches {
            launch.validate(minter)?;
        }

        Ok(())
    }
}

impl LaunchEntry {
    fn validate(&self, minter: &MinterConfig) -> LaunchpadResult<()> {
        if self.name.is_empty() || self.name.len() >= minter.max_name_length {
            return Err(LaunchpadError::invalid_parameter(
                "name",
                &self.name,
                &format!("1 to {} bytes", minter.max_name_length - 1),
            ));
        }

        if self.symbol.is_empty() || self.symbol.len() >= minter.max_symbol_length {
            return Err(LaunchpadError::invalid_parameter(
                "symbol",
                &self.symbol,
                &format!("1 to {} bytes", minter.max_symbol_length - 1),
            ));
        }

        if self.total_supply == 0 {
            return Err(LaunchpadError::invalid_parameter(
                "total_supply",
                "0",
                "greater than 0",
            ));
        }

        // The AMM enforces these too; failing here keeps a bad file from
        // getting halfway through a scenario
        if self.curve.concentration_a > MAX_CONCENTRATION
            || self.curve.concentration_b > MAX_CONCENTRATION
        {
            return Err(LaunchpadError::invalid_parameter(
                "concentration",
                &format!("{}/{}", self.curve.concentration_a, self.curve.concentration_b),
                "at most 1e18",
            ));
        }

        if self.fee > MAX_FEE {
            return Err(LaunchpadError::invalid_parameter(
                "fee",
                &self.fee.to_string(),
                "at most 1e18",
            ));
        }

        if self.protocol_fee.protocol_fee > MAX_PROTOCOL_FEE {
            return Err(LaunchpadError::invalid_parameter(
                "protocol_fee",
                &self.protocol_fee.protocol_fee.to_string(),
                "at most 1e18",
            ));
        }

        Ok(())
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            quote_symbol: "QUOTE".to_string(),
            quote_supply: 1_000_000_000_000,
            lookup_quote_vault: false,
            launches: vec![],
        }
    }
}

impl Default for LaunchEntry {
    fn default() -> Self {
        Self {
            name: "Launch".to_string(),
            symbol: "LNCH".to_string(),
            total_supply: 60_000_000_000,
            curve: single_sided_curve(60_000_000_000),
            fee: 0,
            protocol_fee: ProtocolFeeParams::default(),
        }
    }
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            registry: default_registry(),
            minter: MinterConfig::default(),
            scenario: ScenarioConfig::default(),
        }
    }
}

/// Curve selling `supply` of the base asset against a quote side that starts empty
pub fn single_sided_curve(supply: u64) -> CurveParams {
    CurveParams {
        equilibrium_reserve_a: supply,
        equilibrium_reserve_b: 0,
        price_a: WAD,
        price_b: WAD,
        concentration_a: WAD / 2,
        concentration_b: WAD / 2,
    }
}

fn default_registry() -> Pubkey {
    Pubkey::new_from_array(DEFAULT_REGISTRY)
}

/// Create example configuration file
pub fn create_example_config<P: AsRef<Path>>(path: P) -> LaunchpadResult<()> {
    let example_config = LaunchpadConfig {
        chain_id: 1,
        registry: default_registry(),
        minter: MinterConfig::default(),
        scenario: ScenarioConfig {
            quote_symbol: "USDF".to_string(),
            quote_supply: 1_000_000_000_000,
            lookup_quote_vault: true,
            launches: vec![
                LaunchEntry::default(),
                LaunchEntry {
                    name: "Second Launch".to_string(),
                    symbol: "SCND".to_string(),
                    total_supply: 1_000_000_000_000,
                    curve: single_sided_curve(1_000_000_000_000),
                    fee: WAD / 1000, // 0.1%
                    protocol_fee: ProtocolFeeParams {
                        protocol_fee: WAD / 10,
                        recipient: default_registry(),
                    },
                },
            ],
        },
    };

    example_config.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = LaunchpadConfig::default();
        config.scenario.launches.push(LaunchEntry::default());
        assert!(config.validate().is_ok());

        // Test invalid chain id
        config.chain_id = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_launch_entry_bounds() {
        let minter = MinterConfig::default();

        let mut entry = LaunchEntry::default();
        entry.symbol = "S".repeat(32);
        assert!(entry.validate(&minter).is_err());

        let mut entry = LaunchEntry::default();
        entry.fee = WAD + 1;
        assert!(entry.validate(&minter).is_err());

        let mut entry = LaunchEntry::default();
        entry.total_supply = 0;
        assert!(entry.validate(&minter).is_err());
    }

    #[test]
    fn test_example_config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launchpad.toml");

        create_example_config(&path).unwrap();
        let loaded = LaunchpadConfig::load(&path).unwrap();

        assert!(loaded.scenario.lookup_quote_vault);
        assert_eq!(loaded.scenario.launches.len(), 2);
        assert_eq!(loaded.registry_config().address, loaded.registry);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(&loaded.registry.to_string()));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "chain_id = 0\nregistry = \"not a key\"\n").unwrap();

        assert!(matches!(
            LaunchpadConfig::load(&path),
            Err(LaunchpadError::InvalidConfiguration { .. })
        ));
        assert!(LaunchpadConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
