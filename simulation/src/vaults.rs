//! Escrow vaults with minimal share accounting
//!
//! Underlying tokens are held in the token book under the vault's own
//! address. Shares are priced against that balance, so anything sent to the
//! vault without minting shares (simulated yield) raises every holder's
//! withdrawable amount.

use std::collections::HashMap;

use solana_program::hash::hashv;

use launchpad_types::{LaunchpadError, LaunchpadResult, Pubkey};

use crate::tokens::TokenBook;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowVault {
    pub asset: Pubkey,
    pub total_shares: u64,
    shares: HashMap<Pubkey, u64>,
}

impl EscrowVault {
    fn new(asset: Pubkey) -> Self {
        Self {
            asset,
            total_shares: 0,
            shares: HashMap::new(),
        }
    }

    pub fn shares_of(&self, owner: &Pubkey) -> u64 {
        self.shares.get(owner).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct VaultBook {
    vaults: HashMap<Pubkey, EscrowVault>,
    deployed: u64,
}

impl VaultBook {
    /// Deploy a fresh escrow vault for `asset`
    pub fn deploy(&mut self, factory: &Pubkey, asset: &Pubkey) -> Pubkey {
        self.deployed += 1;
        let address = Pubkey::new_from_array(
            hashv(&[
                b"escrow_vault",
                factory.as_ref(),
                asset.as_ref(),
                &self.deployed.to_le_bytes(),
            ])
            .to_bytes(),
        );
        self.vaults.insert(address, EscrowVault::new(*asset));
        address
    }

    pub fn get(&self, vault: &Pubkey) -> LaunchpadResult<&EscrowVault> {
        self.vaults.get(vault).ok_or_else(|| unknown_vault(vault))
    }

    pub fn asset(&self, vault: &Pubkey) -> LaunchpadResult<Pubkey> {
        self.get(vault).map(|v| v.asset)
    }

    pub fn total_assets(&self, tokens: &TokenBook, vault: &Pubkey) -> LaunchpadResult<u64> {
        let asset = self.asset(vault)?;
        Ok(tokens.balance_of(&asset, vault))
    }

    pub fn max_withdraw(&self, tokens: &TokenBook, vault: &Pubkey, owner: &Pubkey) -> LaunchpadResult<u64> {
        let state = self.get(vault)?;
        if state.total_shares == 0 {
            return Ok(0);
        }
        let assets = tokens.balance_of(&state.asset, vault);
        mul_div(state.shares_of(owner), assets, state.total_shares, false)
    }

    /// Pull `amount` from `caller` against its allowance and credit shares to `on_behalf_of`
    pub fn deposit(
        &mut self,
        tokens: &mut TokenBook,
        caller: &Pubkey,
        vault: &Pubkey,
        amount: u64,
        on_behalf_of: &Pubkey,
    ) -> LaunchpadResult<u64> {
        let (asset, total_shares) = {
            let state = self.get(vault)?;
            (state.asset, state.total_shares)
        };
        let total_assets = tokens.balance_of(&asset, vault);
        let shares = if total_shares == 0 || total_assets == 0 {
            amount
        } else {
            mul_div(amount, total_shares, total_assets, false)?
        };

        tokens.transfer_from(&asset, vault, caller, vault, amount)?;

        let state = self.vaults.get_mut(vault).ok_or_else(|| unknown_vault(vault))?;
        state.total_shares = state
            .total_shares
            .checked_add(shares)
            .ok_or(LaunchpadError::MathOverflow {
                operation: "vault deposit",
            })?;
        *state.shares.entry(*on_behalf_of).or_default() += shares;
        Ok(shares)
    }

    /// Burn `owner`'s shares for `amount` of the underlying and send it to `to`.
    /// Authorization of the caller is the chain's job.
    pub fn withdraw(
        &mut self,
        tokens: &mut TokenBook,
        vault: &Pubkey,
        amount: u64,
        to: &Pubkey,
        owner: &Pubkey,
    ) -> LaunchpadResult<u64> {
        let (asset, total_shares, owned) = {
            let state = self.get(vault)?;
            (state.asset, state.total_shares, state.shares_of(owner))
        };
        let total_assets = tokens.balance_of(&asset, vault);
        if amount > total_assets {
            return Err(LaunchpadError::downstream(
                "vault",
                format!("withdraw {} exceeds total assets {}", amount, total_assets),
            ));
        }
        let shares = if amount == 0 {
            0
        } else {
            mul_div(amount, total_shares, total_assets, true)?
        };
        if amount > 0 && shares == 0 {
            return Err(LaunchpadError::downstream("vault", "vault has no shares outstanding"));
        }
        if shares > owned {
            return Err(LaunchpadError::downstream(
                "vault",
                format!("{} holds {} shares, {} needed", owner, owned, shares),
            ));
        }

        tokens.transfer(&asset, vault, to, amount)?;

        let state = self.vaults.get_mut(vault).ok_or_else(|| unknown_vault(vault))?;
        state.total_shares -= shares;
        state.shares.insert(*owner, owned - shares);
        Ok(shares)
    }
}

fn mul_div(a: u64, b: u64, denominator: u64, round_up: bool) -> LaunchpadResult<u64> {
    let product = a as u128 * b as u128;
    let denominator = denominator as u128;
    let mut quotient = product / denominator;
    if round_up && product % denominator != 0 {
        quotient += 1;
    }
    u64::try_from(quotient).map_err(|_| LaunchpadError::MathOverflow {
        operation: "share conversion",
    })
}

fn unknown_vault(vault: &Pubkey) -> LaunchpadError {
    LaunchpadError::invalid_vault(*vault, "unknown vault")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    fn setup() -> (TokenBook, VaultBook, Pubkey) {
        let mut tokens = TokenBook::default();
        tokens.create(key(1), "Quote", "QTE", key(2), 1_000).unwrap();
        let mut vaults = VaultBook::default();
        let vault = vaults.deploy(&key(9), &key(1));
        (tokens, vaults, vault)
    }

    #[test]
    fn test_deposit_requires_allowance() {
        let (mut tokens, mut vaults, vault) = setup();
        assert!(matches!(
            vaults.deposit(&mut tokens, &key(2), &vault, 100, &key(3)),
            Err(LaunchpadError::InsufficientAllowance { .. })
        ));

        tokens.approve(&key(1), &key(2), &vault, 100).unwrap();
        assert_eq!(vaults.deposit(&mut tokens, &key(2), &vault, 100, &key(3)), Ok(100));
        assert_eq!(vaults.total_assets(&tokens, &vault), Ok(100));
        assert_eq!(vaults.max_withdraw(&tokens, &vault, &key(3)), Ok(100));
        assert_eq!(vaults.max_withdraw(&tokens, &vault, &key(2)), Ok(0));
    }

    #[test]
    fn test_yield_raises_withdrawable_amount() {
        let (mut tokens, mut vaults, vault) = setup();
        tokens.approve(&key(1), &key(2), &vault, 300).unwrap();
        vaults.deposit(&mut tokens, &key(2), &vault, 100, &key(3)).unwrap();
        vaults.deposit(&mut tokens, &key(2), &vault, 200, &key(4)).unwrap();

        // Donation without shares
        tokens.mint(&key(1), &vault, 30).unwrap();
        assert_eq!(vaults.max_withdraw(&tokens, &vault, &key(3)), Ok(110));
        assert_eq!(vaults.max_withdraw(&tokens, &vault, &key(4)), Ok(220));

        let max = vaults.max_withdraw(&tokens, &vault, &key(3)).unwrap();
        vaults.withdraw(&mut tokens, &vault, max, &key(5), &key(3)).unwrap();
        assert_eq!(tokens.balance_of(&key(1), &key(5)), 110);
        assert_eq!(vaults.get(&vault).unwrap().shares_of(&key(3)), 0);
    }

    #[test]
    fn test_withdraw_beyond_shares_fails() {
        let (mut tokens, mut vaults, vault) = setup();
        tokens.approve(&key(1), &key(2), &vault, 100).unwrap();
        vaults.deposit(&mut tokens, &key(2), &vault, 100, &key(3)).unwrap();

        assert!(vaults.withdraw(&mut tokens, &vault, 101, &key(5), &key(3)).is_err());
        assert!(vaults.withdraw(&mut tokens, &vault, 1, &key(5), &key(4)).is_err());
        assert_eq!(vaults.total_assets(&tokens, &vault), Ok(100));
    }
}
