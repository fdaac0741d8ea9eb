//! Launch registry
//!
//! Orchestrates a launch end to end (mint, escrow vault, controller,
//! initialize) and keeps the ledger every launched bundle is resolved from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use solana_program::hash::hashv;

use launchpad_types::{
    ControllerInit, CurveParams, Hash, InitCode, LaunchpadError, LaunchpadEvent, LaunchpadResult,
    ProtocolFeeParams, Pubkey, ResourceBundle, CONTROLLER_SALT_SEED,
};

use crate::asset::{AssetMinter, AssetParams, MinterConfig};
use crate::controller::{InitializeArgs, PositionController, RegistryIdentity, RegistryKind};
use crate::determinism::AddressDeterminism;
use crate::interfaces::{atomically, Environment};
use crate::ledger::{Page, ResourceLedger};

/// Runtime registry settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistryConfig {
    #[serde(with = "launchpad_types::serde_pubkey")]
    pub address: Pubkey,
    #[serde(default)]
    pub minter: MinterConfig,
}

/// Where the quote side's vault comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSource {
    /// Use this vault directly
    Vault(Pubkey),
    /// Look the vault up by its underlying asset
    Asset(Pubkey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub asset: AssetParams,
    pub asset_salt: Hash,
    pub quote: QuoteSource,
    pub curve: CurveParams,
    /// WAD-scaled swap fee
    pub fee: u64,
    pub protocol_fee: ProtocolFeeParams,
    pub hook_salt: Hash,
}

/// Salt a launched asset's controller is deployed under
pub fn controller_salt(asset: &Pubkey) -> Hash {
    hashv(&[CONTROLLER_SALT_SEED, asset.as_ref()])
}

pub struct LaunchRegistry {
    address: Pubkey,
    minter: AssetMinter,
    ledger: ResourceLedger,
    controllers: HashMap<Pubkey, PositionController>,
}

impl RegistryIdentity for LaunchRegistry {
    fn registry_address(&self) -> Pubkey {
        self.address
    }

    fn registry_kind(&self) -> RegistryKind {
        RegistryKind::LaunchRegistry
    }
}

impl LaunchRegistry {
    pub fn new(config: RegistryConfig) -> LaunchpadResult<Self> {
        if config.address == Pubkey::default() {
            return Err(LaunchpadError::ZeroAddress { field: "registry" });
        }
        config.minter.validate()?;

        Ok(Self {
            address: config.address,
            minter: AssetMinter::new(config.minter),
            ledger: ResourceLedger::new(),
            controllers: HashMap::new(),
        })
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn minter(&self) -> &AssetMinter {
        &self.minter
    }

    // ========================================================================
    // Launch
    // ========================================================================

    /// Launch a new asset paired with an existing quote vault.
    ///
    /// `caller` becomes the owner of the controller. Either everything
    /// happens or nothing does.
    pub fn launch<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        caller: &Pubkey,
        request: LaunchRequest,
    ) -> LaunchpadResult<ResourceBundle> {
        if *caller == Pubkey::default() {
            return Err(LaunchpadError::ZeroAddress { field: "caller" });
        }
        self.minter
            .validate_metadata(&request.asset.name, &request.asset.symbol)?;
        let (asset_b, vault_b) = self.resolve_quote(env, &request.quote)?;

        let result = atomically(env, |env| {
            self.launch_inner(env, caller, &request, asset_b, vault_b)
        });
        if let Err(err) = &result {
            log::warn!("Launch of {} rolled back: {}", request.asset.symbol, err);
        }
        result
    }

    fn resolve_quote<E: Environment + ?Sized>(
        &self,
        env: &E,
        quote: &QuoteSource,
    ) -> LaunchpadResult<(Pubkey, Pubkey)> {
        match *quote {
            QuoteSource::Vault(vault) => {
                if vault == Pubkey::default() {
                    return Err(LaunchpadError::ZeroAddress { field: "quote_vault" });
                }
                let asset = env
                    .vault_asset(&vault)
                    .map_err(|err| LaunchpadError::invalid_vault(vault, err.to_string()))?;
                Ok((asset, vault))
            }
            QuoteSource::Asset(asset) => {
                if asset == Pubkey::default() {
                    return Err(LaunchpadError::ZeroAddress { field: "quote_asset" });
                }
                let vault = env
                    .vault_for_asset(&asset)
                    .ok_or(LaunchpadError::QuoteVaultNotFound { asset })?;
                let underlying = env.vault_asset(&vault)?;
                if underlying != asset {
                    return Err(LaunchpadError::invalid_vault(
                        vault,
                        format!("registered for {} but holds {}", asset, underlying),
                    ));
                }
                Ok((asset, vault))
            }
        }
    }

    fn launch_inner<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        caller: &Pubkey,
        request: &LaunchRequest,
        asset_b: Pubkey,
        vault_b: Pubkey,
    ) -> LaunchpadResult<ResourceBundle> {
        let asset_a = self.minter.mint_asset(
            env,
            &self.address,
            &request.asset,
            &self.address,
            &request.asset_salt,
        )?;
        if asset_a == asset_b {
            return Err(LaunchpadError::IdenticalAssets { asset: asset_a });
        }
        log::debug!("Minted {} at {}", request.asset.symbol, asset_a);

        let vault_a = env.deploy_escrow_vault(&self.address, &asset_a)?;
        log::debug!("Escrow vault {} deployed for {}", vault_a, asset_a);

        let init = ControllerInit {
            registry: self.address,
            owner: *caller,
            asset_a,
            vault_a,
            asset_b,
            vault_b,
        };
        let controller_address = self.deploy_controller(env, init)?;
        let mut controller = PositionController::new(controller_address, &*self, init)?;
        log::debug!("Controller deployed at {}", controller_address);

        let supply = env.total_supply(&asset_a)?;
        env.transfer(&self.address, &asset_a, &controller_address, supply)?;

        let bundle = controller.initialize(
            env,
            &self.address,
            InitializeArgs {
                curve: request.curve,
                initial_reserve_a: supply,
                fee: request.fee,
                protocol_fee: request.protocol_fee,
                hook_salt: request.hook_salt,
            },
        )?;

        let index = self.ledger.record(bundle)?;
        self.controllers.insert(controller_address, controller);

        env.emit(LaunchpadEvent::Launched {
            index: index as u64,
            owner: *caller,
            bundle,
        });
        log::info!(
            "Launched {} (#{}): pool {} controller {}",
            request.asset.symbol,
            index,
            bundle.pool,
            bundle.controller
        );

        Ok(bundle)
    }

    /// Deploy the controller and check it landed on the predicted address
    fn deploy_controller<E: Environment + ?Sized>(
        &self,
        env: &mut E,
        init: ControllerInit,
    ) -> LaunchpadResult<Pubkey> {
        let determinism = AddressDeterminism::for_env(env);
        let guarded = determinism.guard(&controller_salt(&init.asset_a));
        let predicted = determinism.predict(env, &guarded);

        let deployed = env.deploy(&self.address, &guarded, InitCode::Controller(init))?;
        if deployed != predicted {
            return Err(LaunchpadError::InvalidController {
                predicted,
                deployed,
            });
        }
        Ok(deployed)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    pub fn by_pool(&self, pool: &Pubkey) -> LaunchpadResult<ResourceBundle> {
        self.ledger.by_pool(pool).ok_or(LaunchpadError::ResourcesNotFound)
    }

    /// Lookup by launched asset; quote assets are listed with `list_by_quote_asset`
    pub fn by_asset(&self, asset: &Pubkey) -> LaunchpadResult<ResourceBundle> {
        self.ledger.by_asset(asset).ok_or(LaunchpadError::ResourcesNotFound)
    }

    pub fn by_controller(&self, controller: &Pubkey) -> LaunchpadResult<ResourceBundle> {
        self.ledger
            .by_controller(controller)
            .ok_or(LaunchpadError::ResourcesNotFound)
    }

    /// Lookup by either ordering of the two assets
    pub fn by_pair(&self, asset_a: &Pubkey, asset_b: &Pubkey) -> LaunchpadResult<ResourceBundle> {
        self.ledger
            .by_pair(asset_a, asset_b)
            .ok_or(LaunchpadError::ResourcesNotFound)
    }

    /// Lookup by launch index, as carried by the `Launched` event
    pub fn by_index(&self, index: usize) -> LaunchpadResult<ResourceBundle> {
        self.ledger.get(index).ok_or(LaunchpadError::ResourcesNotFound)
    }

    pub fn list_all(&self, limit: usize, offset: usize) -> Page {
        self.ledger.list_all(limit, offset)
    }

    pub fn list_by_quote_asset(&self, quote: &Pubkey, limit: usize, offset: usize) -> Page {
        self.ledger.list_by_quote_asset(quote, limit, offset)
    }

    // ========================================================================
    // Controllers
    // ========================================================================

    pub fn controller(&self, address: &Pubkey) -> LaunchpadResult<&PositionController> {
        self.controllers
            .get(address)
            .ok_or(LaunchpadError::ResourcesNotFound)
    }

    pub fn controller_mut(&mut self, address: &Pubkey) -> LaunchpadResult<&mut PositionController> {
        self.controllers
            .get_mut(address)
            .ok_or(LaunchpadError::ResourcesNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RegistryConfig {
        RegistryConfig {
            address: Pubkey::new_from_array([1u8; 32]),
            minter: MinterConfig::default(),
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = LaunchRegistry::new(config()).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.registry_kind(), RegistryKind::LaunchRegistry);
        assert_eq!(registry.by_index(0), Err(LaunchpadError::ResourcesNotFound));
        assert_eq!(
            registry.by_pool(&Pubkey::new_unique()),
            Err(LaunchpadError::ResourcesNotFound)
        );
        assert_eq!(registry.list_all(10, 0), Page::default());
    }

    #[test]
    fn test_rejects_bad_config() {
        let mut zero = config();
        zero.address = Pubkey::default();
        assert!(LaunchRegistry::new(zero).is_err());

        let mut prefix = config();
        prefix.minter.reserved_prefix = vec![0; 20];
        assert!(LaunchRegistry::new(prefix).is_err());
    }

    #[test]
    fn test_controller_salt_is_per_asset() {
        let a = Pubkey::new_from_array([3u8; 32]);
        let b = Pubkey::new_from_array([4u8; 32]);
        assert_eq!(controller_salt(&a), controller_salt(&a));
        assert_ne!(controller_salt(&a), controller_salt(&b));
    }
}
