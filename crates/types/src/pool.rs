//! Curve and pool parameter types
//!
//! Callers describe a launch in base/quote terms ("side a" is the launched
//! asset, "side b" the quote asset). The AMM identifies an instance by its
//! asset0/asset1 slots, so every paired value is reordered by ascending
//! asset address before registration. The values are opaque to the core and
//! only validated by the AMM when the instance is registered.

use serde::{Deserialize, Serialize};
use solana_program::hash::{hashv, Hash};
use solana_program::pubkey::Pubkey;

use crate::constants::POOL_PARAMS_SEED;

/// Curve shape supplied by the launcher, in base/quote order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurveParams {
    pub equilibrium_reserve_a: u64,
    pub equilibrium_reserve_b: u64,
    /// WAD-scaled price of asset a
    pub price_a: u64,
    /// WAD-scaled price of asset b
    pub price_b: u64,
    /// WAD-scaled, in [0, 1]
    pub concentration_a: u64,
    /// WAD-scaled, in [0, 1]
    pub concentration_b: u64,
}

/// Protocol fee share and its recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProtocolFeeParams {
    /// WAD-scaled share of the swap fee
    pub protocol_fee: u64,
    #[serde(with = "crate::serde_pubkey")]
    pub recipient: Pubkey,
}

/// One side of a pool before canonical ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSide {
    pub asset: Pubkey,
    pub vault: Pubkey,
    pub equilibrium_reserve: u64,
    pub price: u64,
    pub concentration: u64,
    pub initial_reserve: u64,
}

/// Parameters of an AMM instance in asset0/asset1 slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolParams {
    pub vault0: Pubkey,
    pub vault1: Pubkey,
    /// Account whose vault positions back the instance
    pub account: Pubkey,
    pub equilibrium_reserve0: u64,
    pub equilibrium_reserve1: u64,
    pub price_x: u64,
    pub price_y: u64,
    pub concentration_x: u64,
    pub concentration_y: u64,
    pub fee: u64,
    pub protocol_fee: u64,
    pub protocol_fee_recipient: Pubkey,
}

/// Reserves an instance starts trading from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitialState {
    pub reserve0: u64,
    pub reserve1: u64,
}

impl PoolParams {
    /// Order two sides by ascending asset address.
    ///
    /// Returns the parameters, the initial state and whether side a landed
    /// in slot 0.
    pub fn canonical(
        account: Pubkey,
        side_a: &PoolSide,
        side_b: &PoolSide,
        fee: u64,
        protocol_fee: &ProtocolFeeParams,
    ) -> (Self, InitialState, bool) {
        let a_is_asset0 = side_a.asset.as_ref() < side_b.asset.as_ref();
        let (s0, s1) = if a_is_asset0 {
            (side_a, side_b)
        } else {
            (side_b, side_a)
        };

        let params = Self {
            vault0: s0.vault,
            vault1: s1.vault,
            account,
            equilibrium_reserve0: s0.equilibrium_reserve,
            equilibrium_reserve1: s1.equilibrium_reserve,
            price_x: s0.price,
            price_y: s1.price,
            concentration_x: s0.concentration,
            concentration_y: s1.concentration,
            fee,
            protocol_fee: protocol_fee.protocol_fee,
            protocol_fee_recipient: protocol_fee.recipient,
        };
        let state = InitialState {
            reserve0: s0.initial_reserve,
            reserve1: s1.initial_reserve,
        };

        (params, state, a_is_asset0)
    }

    /// Deterministic hash of every field, in declaration order
    pub fn hash(&self) -> Hash {
        hashv(&[
            POOL_PARAMS_SEED,
            self.vault0.as_ref(),
            self.vault1.as_ref(),
            self.account.as_ref(),
            &self.equilibrium_reserve0.to_le_bytes(),
            &self.equilibrium_reserve1.to_le_bytes(),
            &self.price_x.to_le_bytes(),
            &self.price_y.to_le_bytes(),
            &self.concentration_x.to_le_bytes(),
            &self.concentration_y.to_le_bytes(),
            &self.fee.to_le_bytes(),
            &self.protocol_fee.to_le_bytes(),
            self.protocol_fee_recipient.as_ref(),
        ])
    }
}
