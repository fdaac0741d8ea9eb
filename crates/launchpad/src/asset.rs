/// Fixed-supply asset minting at deterministic addresses
///
/// Every launched asset must live under a reserved address prefix. The
/// minter only verifies the prefix; finding a salt that produces it is the
/// caller's job.
use serde::{Deserialize, Serialize};

use launchpad_types::{
    AssetInit, Hash, InitCode, LaunchpadError, LaunchpadEvent, LaunchpadResult, Pubkey,
    DEFAULT_RESERVED_PREFIX, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH,
};

use crate::determinism::AddressDeterminism;
use crate::interfaces::{atomically, Deployer, Environment};

/// Longest reserved prefix a configuration may ask for
pub const MAX_PREFIX_LENGTH: usize = 8;

/// Minter configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MinterConfig {
    /// Leading address bytes every minted asset must carry
    pub reserved_prefix: Vec<u8>,

    /// Names must be strictly shorter than this many bytes
    pub max_name_length: usize,

    /// Symbols must be strictly shorter than this many bytes
    pub max_symbol_length: usize,
}

impl Default for MinterConfig {
    fn default() -> Self {
        Self {
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_vec(),
            max_name_length: MAX_NAME_LENGTH,
            max_symbol_length: MAX_SYMBOL_LENGTH,
        }
    }
}

impl MinterConfig {
    pub fn validate(&self) -> LaunchpadResult<()> {
        if self.reserved_prefix.len() > MAX_PREFIX_LENGTH {
            return Err(LaunchpadError::invalid_configuration(
                "minter.reserved_prefix",
                format!(
                    "{} bytes, at most {} allowed",
                    self.reserved_prefix.len(),
                    MAX_PREFIX_LENGTH
                ),
            ));
        }
        if self.max_name_length < 2 {
            return Err(LaunchpadError::invalid_configuration(
                "minter.max_name_length",
                "must allow at least one byte",
            ));
        }
        if self.max_symbol_length < 2 {
            return Err(LaunchpadError::invalid_configuration(
                "minter.max_symbol_length",
                "must allow at least one byte",
            ));
        }
        Ok(())
    }
}

/// Constructor parameters of a launched asset
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssetParams {
    pub name: String,
    pub symbol: String,
    pub total_supply: u64,
}

/// Deploys fixed-supply assets through the salted deployer
#[derive(Debug, Clone, Default)]
pub struct AssetMinter {
    config: MinterConfig,
}

impl AssetMinter {
    pub fn new(config: MinterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MinterConfig {
        &self.config
    }

    /// Check name and symbol against the configured bounds
    pub fn validate_metadata(&self, name: &str, symbol: &str) -> LaunchpadResult<()> {
        if name.is_empty() {
            return Err(LaunchpadError::EmptyName);
        }
        if symbol.is_empty() {
            return Err(LaunchpadError::EmptySymbol);
        }
        if name.len() >= self.config.max_name_length {
            return Err(LaunchpadError::NameTooLong {
                len: name.len(),
                max: self.config.max_name_length,
            });
        }
        if symbol.len() >= self.config.max_symbol_length {
            return Err(LaunchpadError::SymbolTooLong {
                len: symbol.len(),
                max: self.config.max_symbol_length,
            });
        }
        Ok(())
    }

    pub fn has_reserved_prefix(&self, address: &Pubkey) -> bool {
        address.as_ref().starts_with(&self.config.reserved_prefix)
    }

    /// Address an asset minted with `salt` would receive
    pub fn predict_asset_address<D: Deployer + ?Sized>(
        &self,
        deployer: &D,
        chain_id: u64,
        salt: &Hash,
    ) -> Pubkey {
        AddressDeterminism::new(chain_id).predict_for_salt(deployer, salt)
    }

    /// Deploy an asset and mint its whole supply to `mint_to`
    pub fn mint_asset<E: Environment + ?Sized>(
        &self,
        env: &mut E,
        caller: &Pubkey,
        params: &AssetParams,
        mint_to: &Pubkey,
        salt: &Hash,
    ) -> LaunchpadResult<Pubkey> {
        self.validate_metadata(&params.name, &params.symbol)?;
        if *mint_to == Pubkey::default() {
            return Err(LaunchpadError::ZeroAddress { field: "mint_to" });
        }
        if params.total_supply == 0 {
            return Err(LaunchpadError::invalid_parameter(
                "total_supply",
                "0",
                "greater than 0",
            ));
        }

        let determinism = AddressDeterminism::for_env(env);
        let init_code = InitCode::Asset(AssetInit {
            name: params.name.clone(),
            symbol: params.symbol.clone(),
            mint_to: *mint_to,
            total_supply: params.total_supply,
        });

        atomically(env, |env| {
            let asset = determinism.deploy(env, caller, salt, init_code)?;
            if !self.has_reserved_prefix(&asset) {
                return Err(LaunchpadError::InvalidAssetPrefix {
                    address: asset,
                    prefix: self.config.reserved_prefix.clone(),
                });
            }

            env.emit(LaunchpadEvent::AssetMinted {
                asset,
                name: params.name.clone(),
                symbol: params.symbol.clone(),
                mint_to: *mint_to,
                total_supply: params.total_supply,
            });
            log::debug!("Minted {} {} at {}", params.total_supply, params.symbol, asset);
            Ok(asset)
        })
    }
}
