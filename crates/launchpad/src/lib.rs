//! Feels launchpad core
//!
//! A launch registry that mints a fixed-supply asset at a deterministic
//! address, parks it in an escrow vault and hands it to a position
//! controller, which registers a single-sided AMM instance over the vaults.
//! External collaborators (vaults, AMM, salted deployer, batch executor)
//! are reached through the traits in [`interfaces`].

pub mod asset;
pub mod config;
pub mod controller;
pub mod determinism;
pub mod guard;
pub mod interfaces;
pub mod ledger;
pub mod registry;

pub use asset::{AssetMinter, AssetParams, MinterConfig};
pub use config::{create_example_config, LaunchEntry, LaunchpadConfig, ScenarioConfig};
pub use controller::{
    ControllerState, InitializeArgs, PositionController, RegistryIdentity, RegistryKind,
};
pub use determinism::{guard_salt, AddressDeterminism};
pub use interfaces::{
    atomically, AmmFactory, BatchExecutor, Deployer, Environment, EscrowVaultFactory, EventSink,
    TokenLedger, Transactional, VaultApi, VaultLookup,
};
pub use ledger::{Page, ResourceLedger};
pub use registry::{controller_salt, LaunchRegistry, LaunchRequest, QuoteSource, RegistryConfig};

// Re-export shared types
pub use launchpad_types::*;
