//! Position controller
//!
//! A controller owns exactly one AMM instance for its lifetime. It moves
//! once from `Uninitialized` to `Live` (deposit + register) and once from
//! `Live` to `Closed` (deregister + withdraw). The bound registry drives the
//! first edge, the owner the second.
//!
//! `execute` is an owner-only trapdoor: it forwards an arbitrary call from
//! the controller's account and is not covered by the lifecycle rules.

use std::cell::Cell;

use launchpad_types::{
    BatchItem, Call, ControllerInit, CurveParams, Hash, LaunchpadError, LaunchpadEvent,
    LaunchpadResult, PoolParams, PoolSide, ProtocolFeeParams, Pubkey, ResourceBundle,
};

use crate::guard::{ReentrancyStatus, ScopedGuard};
use crate::interfaces::{atomically, Environment, EventSink};

// ============================================================================
// Registry Identity
// ============================================================================

/// What a registry claims to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    LaunchRegistry,
    Unrecognized,
}

/// Typed self-identification a controller checks at construction
pub trait RegistryIdentity {
    fn registry_address(&self) -> Pubkey;

    fn registry_kind(&self) -> RegistryKind;
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Controller lifecycle; `Closed` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Uninitialized,
    Live {
        pool: Pubkey,
    },
    Closed {
        pool: Pubkey,
    },
}

/// Arguments of the one-shot initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializeArgs {
    pub curve: CurveParams,
    /// Amount of asset a deposited into vault a
    pub initial_reserve_a: u64,
    /// WAD-scaled swap fee
    pub fee: u64,
    pub protocol_fee: ProtocolFeeParams,
    pub hook_salt: Hash,
}

#[derive(Debug)]
pub struct PositionController {
    address: Pubkey,
    registry: Pubkey,
    /// `None` once renounced
    owner: Option<Pubkey>,
    asset_a: Pubkey,
    vault_a: Pubkey,
    asset_b: Pubkey,
    vault_b: Pubkey,
    state: ControllerState,
    status: Cell<ReentrancyStatus>,
}

impl PositionController {
    /// Bind a controller at `address` to `registry` and one asset/vault pair
    pub fn new<R: RegistryIdentity + ?Sized>(
        address: Pubkey,
        registry: &R,
        init: ControllerInit,
    ) -> LaunchpadResult<Self> {
        if registry.registry_kind() != RegistryKind::LaunchRegistry
            || registry.registry_address() != init.registry
        {
            return Err(LaunchpadError::NotExpectedRegistry {
                caller: registry.registry_address(),
            });
        }

        for (field, value) in [
            ("controller", &address),
            ("owner", &init.owner),
            ("asset_a", &init.asset_a),
            ("vault_a", &init.vault_a),
            ("asset_b", &init.asset_b),
            ("vault_b", &init.vault_b),
        ] {
            if *value == Pubkey::default() {
                return Err(LaunchpadError::ZeroAddress { field });
            }
        }
        if init.asset_a == init.asset_b {
            return Err(LaunchpadError::IdenticalAssets {
                asset: init.asset_a,
            });
        }

        Ok(Self {
            address,
            registry: init.registry,
            owner: Some(init.owner),
            asset_a: init.asset_a,
            vault_a: init.vault_a,
            asset_b: init.asset_b,
            vault_b: init.vault_b,
            state: ControllerState::Uninitialized,
            status: Cell::new(ReentrancyStatus::Unlocked),
        })
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn registry(&self) -> Pubkey {
        self.registry
    }

    pub fn owner(&self) -> Option<Pubkey> {
        self.owner
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// AMM instance, once registered
    pub fn pool(&self) -> Option<Pubkey> {
        match self.state {
            ControllerState::Uninitialized => None,
            ControllerState::Live { pool } | ControllerState::Closed { pool } => Some(pool),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state != ControllerState::Uninitialized
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, ControllerState::Closed { .. })
    }

    pub fn bundle(&self) -> Option<ResourceBundle> {
        self.pool().map(|pool| ResourceBundle {
            pool,
            controller: self.address,
            asset_a: self.asset_a,
            vault_a: self.vault_a,
            asset_b: self.asset_b,
            vault_b: self.vault_b,
        })
    }

    // ------------------------------------------------------------------------
    // Lifecycle transitions
    // ------------------------------------------------------------------------

    /// Deposit the initial reserve and register the AMM instance
    pub fn initialize<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        caller: &Pubkey,
        args: InitializeArgs,
    ) -> LaunchpadResult<ResourceBundle> {
        if *caller != self.registry {
            return Err(LaunchpadError::NotExpectedRegistry { caller: *caller });
        }
        if self.state != ControllerState::Uninitialized {
            return Err(LaunchpadError::AlreadyInitialized {
                controller: self.address,
            });
        }

        atomically(env, |env| self.initialize_inner(env, &args))
    }

    fn initialize_inner<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        args: &InitializeArgs,
    ) -> LaunchpadResult<ResourceBundle> {
        let _guard = ScopedGuard::enter(&self.status, &self.address)?;

        self.check_vault(env, &self.vault_a, &self.asset_a)?;
        self.check_vault(env, &self.vault_b, &self.asset_b)?;

        env.approve(&self.address, &self.asset_a, &self.vault_a, args.initial_reserve_a)?;
        let shares = env.deposit(
            &self.address,
            &self.vault_a,
            args.initial_reserve_a,
            &self.address,
        )?;
        log::debug!(
            "Controller {} deposited {} into {} for {} shares",
            self.address,
            args.initial_reserve_a,
            self.vault_a,
            shares
        );

        // Single-sided: only the launched side starts with reserves
        let side_a = PoolSide {
            asset: self.asset_a,
            vault: self.vault_a,
            equilibrium_reserve: args.curve.equilibrium_reserve_a,
            price: args.curve.price_a,
            concentration: args.curve.concentration_a,
            initial_reserve: args.initial_reserve_a,
        };
        let side_b = PoolSide {
            asset: self.asset_b,
            vault: self.vault_b,
            equilibrium_reserve: args.curve.equilibrium_reserve_b,
            price: args.curve.price_b,
            concentration: args.curve.concentration_b,
            initial_reserve: 0,
        };
        let (params, initial_state, a_is_asset0) =
            PoolParams::canonical(self.address, &side_a, &side_b, args.fee, &args.protocol_fee);

        let predicted = env.compute_instance_address(&params, &args.hook_salt);
        let executor = env.executor_address();
        let factory = env.amm_factory_address();

        env.batch(
            &self.address,
            vec![
                BatchItem::new(
                    executor,
                    self.address,
                    Call::SetOperator {
                        account: self.address,
                        operator: predicted,
                        authorized: true,
                    },
                ),
                BatchItem::new(
                    factory,
                    self.address,
                    Call::RegisterPool {
                        params,
                        initial_state,
                        salt: args.hook_salt,
                    },
                ),
            ],
        )?;

        let pool = env
            .instance_of(&self.address)
            .ok_or_else(|| LaunchpadError::downstream("amm factory", "no instance after registration"))?;
        if pool != predicted {
            return Err(LaunchpadError::AddressMismatch {
                predicted,
                deployed: pool,
            });
        }

        self.state = ControllerState::Live { pool };

        let (asset0, asset1) = if a_is_asset0 {
            (self.asset_a, self.asset_b)
        } else {
            (self.asset_b, self.asset_a)
        };
        env.emit(LaunchpadEvent::PoolDeployed {
            controller: self.address,
            pool,
            asset0,
            asset1,
        });
        log::debug!("Controller {} registered pool {}", self.address, pool);

        Ok(ResourceBundle {
            pool,
            controller: self.address,
            asset_a: self.asset_a,
            vault_a: self.vault_a,
            asset_b: self.asset_b,
            vault_b: self.vault_b,
        })
    }

    /// Deregister the pool and withdraw everything to `recipient`.
    ///
    /// Returns the amounts of asset a and asset b withdrawn.
    pub fn close<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        caller: &Pubkey,
        recipient: &Pubkey,
    ) -> LaunchpadResult<(u64, u64)> {
        self.only_owner(caller)?;
        let pool = match self.state {
            ControllerState::Uninitialized => {
                return Err(LaunchpadError::NotInitialized {
                    controller: self.address,
                })
            }
            ControllerState::Closed { .. } => {
                return Err(LaunchpadError::AlreadyClosed {
                    controller: self.address,
                })
            }
            ControllerState::Live { pool } => pool,
        };
        if *recipient == Pubkey::default() {
            return Err(LaunchpadError::ZeroAddress { field: "recipient" });
        }

        atomically(env, |env| self.close_inner(env, pool, recipient))
    }

    fn close_inner<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        pool: Pubkey,
        recipient: &Pubkey,
    ) -> LaunchpadResult<(u64, u64)> {
        let _guard = ScopedGuard::enter(&self.status, &self.address)?;

        let executor = env.executor_address();
        let factory = env.amm_factory_address();
        env.batch(
            &self.address,
            vec![
                BatchItem::new(
                    executor,
                    self.address,
                    Call::SetOperator {
                        account: self.address,
                        operator: pool,
                        authorized: false,
                    },
                ),
                BatchItem::new(factory, self.address, Call::DeregisterPool),
            ],
        )?;

        let amount_a = self.withdraw_all(env, &self.vault_a, recipient)?;
        let amount_b = self.withdraw_all(env, &self.vault_b, recipient)?;

        self.state = ControllerState::Closed { pool };

        env.emit(LaunchpadEvent::PositionClosed {
            controller: self.address,
            recipient: *recipient,
            amount_a,
            amount_b,
        });
        log::info!(
            "Closed controller {}: {} of {} and {} of {} to {}",
            self.address,
            amount_a,
            self.asset_a,
            amount_b,
            self.asset_b,
            recipient
        );

        Ok((amount_a, amount_b))
    }

    /// Forward an arbitrary call from the controller's account.
    ///
    /// Allowed at any lifecycle stage. A revert surfaces as `CallFailed`
    /// carrying the target's payload unchanged.
    pub fn execute<E: Environment + ?Sized>(
        &self,
        env: &mut E,
        caller: &Pubkey,
        target: &Pubkey,
        data: &[u8],
        value: u64,
    ) -> LaunchpadResult<Vec<u8>> {
        self.only_owner(caller)?;

        atomically(env, |env| {
            let _guard = ScopedGuard::enter(&self.status, &self.address)?;

            let output = env
                .call(&self.address, target, value, data)
                .map_err(|revert| LaunchpadError::CallFailed {
                    target: revert.target,
                    payload: revert.payload,
                })?;

            env.emit(LaunchpadEvent::Executed {
                controller: self.address,
                target: *target,
                value,
            });
            Ok(output)
        })
    }

    // ------------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------------

    pub fn transfer_ownership<S: EventSink + ?Sized>(
        &mut self,
        events: &mut S,
        caller: &Pubkey,
        new_owner: &Pubkey,
    ) -> LaunchpadResult<()> {
        let previous_owner = self.only_owner(caller)?;
        if *new_owner == Pubkey::default() {
            return Err(LaunchpadError::ZeroAddress { field: "new_owner" });
        }

        self.owner = Some(*new_owner);
        events.emit(LaunchpadEvent::OwnershipTransferred {
            controller: self.address,
            previous_owner,
            new_owner: Some(*new_owner),
        });
        log::info!(
            "Controller {} ownership transferred from {} to {}",
            self.address,
            previous_owner,
            new_owner
        );
        Ok(())
    }

    /// Give up ownership for good; the position can never be closed afterwards
    pub fn renounce_ownership<S: EventSink + ?Sized>(
        &mut self,
        events: &mut S,
        caller: &Pubkey,
    ) -> LaunchpadResult<()> {
        let previous_owner = self.only_owner(caller)?;

        self.owner = None;
        events.emit(LaunchpadEvent::OwnershipTransferred {
            controller: self.address,
            previous_owner,
            new_owner: None,
        });
        log::info!("Controller {} ownership renounced, position locked", self.address);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn only_owner(&self, caller: &Pubkey) -> LaunchpadResult<Pubkey> {
        match self.owner {
            Some(owner) if owner == *caller => Ok(owner),
            required => Err(LaunchpadError::unauthorized(*caller, required)),
        }
    }

    fn check_vault<E: Environment + ?Sized>(
        &self,
        env: &E,
        vault: &Pubkey,
        asset: &Pubkey,
    ) -> LaunchpadResult<()> {
        let underlying = env.vault_asset(vault)?;
        if underlying != *asset {
            return Err(LaunchpadError::invalid_vault(
                *vault,
                format!("holds {} instead of {}", underlying, asset),
            ));
        }
        Ok(())
    }

    fn withdraw_all<E: Environment + ?Sized>(
        &self,
        env: &mut E,
        vault: &Pubkey,
        recipient: &Pubkey,
    ) -> LaunchpadResult<u64> {
        let amount = env.max_withdraw(vault, &self.address)?;
        if amount > 0 {
            env.withdraw(&self.address, vault, amount, recipient, &self.address)?;
        }
        Ok(amount)
    }
}
