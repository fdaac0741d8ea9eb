//! Stand-in for the external AMM factory and its curve
//!
//! Instances trade on a two-sided curve around an equilibrium point. While
//! one side sits below its equilibrium reserve, the other side must hold at
//! least
//!
//! ```text
//! y0 + px/py * (x0 - x) * (c + (1 - c) * x0 / x)
//! ```
//!
//! where `c` is that side's concentration. Swaps pick the largest output that
//! keeps the reserves on or above the curve. Fees are taken from the input
//! before it counts toward reserves.

use std::collections::HashMap;

use solana_program::hash::{hashv, Hash};

use launchpad_types::{
    InitialState, LaunchpadError, LaunchpadResult, PoolParams, Pubkey, MAX_CONCENTRATION, MAX_FEE,
    MAX_PROTOCOL_FEE, WAD,
};

/// A registered instance and its live reserves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmInstance {
    pub address: Pubkey,
    pub params: PoolParams,
    pub asset0: Pubkey,
    pub asset1: Pubkey,
    pub reserve0: u64,
    pub reserve1: u64,
}

/// Result of pricing an exact-input swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    pub amount_in: u64,
    pub amount_out: u64,
    /// Input that counts toward reserves
    pub amount_in_after_fee: u64,
    /// Part of the fee routed to the protocol fee recipient
    pub protocol_fee_amount: u64,
    /// Whether the input is asset0
    pub zero_for_one: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AmmBook {
    instances: HashMap<Pubkey, AmmInstance>,
    accounts: HashMap<Pubkey, Pubkey>,
}

pub fn instance_address(factory: &Pubkey, params: &PoolParams, salt: &Hash) -> Pubkey {
    Pubkey::new_from_array(
        hashv(&[
            b"amm_instance",
            factory.as_ref(),
            params.hash().as_ref(),
            salt.as_ref(),
        ])
        .to_bytes(),
    )
}

/// Bounds the factory enforces on every registration
pub fn validate_params(params: &PoolParams) -> LaunchpadResult<()> {
    if params.price_x == 0 || params.price_y == 0 {
        return Err(rejected("prices must be non-zero"));
    }
    if params.concentration_x > MAX_CONCENTRATION || params.concentration_y > MAX_CONCENTRATION {
        return Err(rejected("concentration above 1"));
    }
    if params.fee > MAX_FEE {
        return Err(rejected("fee above 1"));
    }
    if params.protocol_fee > MAX_PROTOCOL_FEE {
        return Err(rejected("protocol fee above 1"));
    }
    Ok(())
}

/// Minimum reserve of the other side while this side holds `x < x0`
fn curve_floor(x: u64, x0: u64, y0: u64, px: u64, py: u64, c: u64) -> Option<u128> {
    if x == 0 {
        return None;
    }
    let wad = WAD as u128;
    let delta = (x0 - x) as u128;
    let term = div_ceil(delta * px as u128, py as u128);
    let num = c as u128 * x as u128 + wad.saturating_sub(c as u128) * x0 as u128;
    let factor = div_ceil(num, x as u128);
    let extra = div_ceil(term.checked_mul(factor)?, wad);
    (y0 as u128).checked_add(extra)
}

/// Whether reserves `(r0, r1)` sit on or above the curve
pub fn on_curve(params: &PoolParams, r0: u64, r1: u64) -> bool {
    let (x0, y0) = (params.equilibrium_reserve0, params.equilibrium_reserve1);
    if r0 >= x0 && r1 >= y0 {
        return true;
    }
    if r0 < x0 {
        return match curve_floor(r0, x0, y0, params.price_x, params.price_y, params.concentration_x) {
            Some(floor) => r1 as u128 >= floor,
            None => false,
        };
    }
    match curve_floor(r1, y0, x0, params.price_y, params.price_x, params.concentration_y) {
        Some(floor) => r0 as u128 >= floor,
        None => false,
    }
}

fn div_ceil(a: u128, b: u128) -> u128 {
    a / b + u128::from(a % b != 0)
}

fn rejected(reason: &str) -> LaunchpadError {
    LaunchpadError::downstream("amm factory", reason)
}

impl AmmInstance {
    /// Price an exact-input swap of `amount_in` of `token_in`
    pub fn quote_exact_in(&self, token_in: &Pubkey, amount_in: u64) -> LaunchpadResult<SwapQuote> {
        let zero_for_one = if *token_in == self.asset0 {
            true
        } else if *token_in == self.asset1 {
            false
        } else {
            return Err(rejected("token is not traded by this instance"));
        };

        let wad = WAD as u128;
        let after_fee = (amount_in as u128 * (wad - self.params.fee as u128) / wad) as u64;
        let fee_amount = amount_in - after_fee;
        let protocol_fee_amount =
            (fee_amount as u128 * self.params.protocol_fee as u128 / wad) as u64;

        let (reserve_in, reserve_out) = if zero_for_one {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        };
        let new_in = reserve_in
            .checked_add(after_fee)
            .ok_or(LaunchpadError::MathOverflow { operation: "swap input" })?;

        let valid = |out: u64| {
            let new_out = reserve_out - out;
            if zero_for_one {
                on_curve(&self.params, new_in, new_out)
            } else {
                on_curve(&self.params, new_out, new_in)
            }
        };

        // Largest output that stays on the curve
        let (mut lo, mut hi) = (0u64, reserve_out);
        while lo < hi {
            let mid = lo + (hi - lo) / 2 + (hi - lo) % 2;
            if valid(mid) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        Ok(SwapQuote {
            amount_in,
            amount_out: lo,
            amount_in_after_fee: after_fee,
            protocol_fee_amount,
            zero_for_one,
        })
    }

    pub fn apply(&mut self, quote: &SwapQuote) {
        if quote.zero_for_one {
            self.reserve0 += quote.amount_in_after_fee;
            self.reserve1 -= quote.amount_out;
        } else {
            self.reserve1 += quote.amount_in_after_fee;
            self.reserve0 -= quote.amount_out;
        }
    }
}

impl AmmBook {
    pub fn instance_of(&self, account: &Pubkey) -> Option<&AmmInstance> {
        self.instances.get(account)
    }

    pub fn by_address(&self, instance: &Pubkey) -> Option<&AmmInstance> {
        self.accounts
            .get(instance)
            .and_then(|account| self.instances.get(account))
    }

    pub fn by_address_mut(&mut self, instance: &Pubkey) -> Option<&mut AmmInstance> {
        let account = self.accounts.get(instance)?;
        self.instances.get_mut(account)
    }

    /// Store a validated instance for `params.account`
    pub fn insert(
        &mut self,
        address: Pubkey,
        params: PoolParams,
        asset0: Pubkey,
        asset1: Pubkey,
        initial_state: &InitialState,
    ) -> LaunchpadResult<()> {
        if self.instances.contains_key(&params.account) {
            return Err(rejected("account already has an instance"));
        }
        if self.accounts.contains_key(&address) {
            return Err(rejected("instance address in use"));
        }
        self.accounts.insert(address, params.account);
        self.instances.insert(
            params.account,
            AmmInstance {
                address,
                params,
                asset0,
                asset1,
                reserve0: initial_state.reserve0,
                reserve1: initial_state.reserve1,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, account: &Pubkey) -> LaunchpadResult<Pubkey> {
        let instance = self
            .instances
            .remove(account)
            .ok_or_else(|| rejected("account has no instance"))?;
        self.accounts.remove(&instance.address);
        Ok(instance.address)
    }
}
