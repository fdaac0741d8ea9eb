//! Fungible asset balances for the simulated chain

use std::collections::HashMap;

use launchpad_types::{LaunchpadError, LaunchpadResult, Pubkey};

/// Metadata of a simulated asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub total_supply: u64,
}

/// Every asset, balance and allowance on the chain
#[derive(Debug, Clone, Default)]
pub struct TokenBook {
    tokens: HashMap<Pubkey, TokenInfo>,
    balances: HashMap<(Pubkey, Pubkey), u64>,
    allowances: HashMap<(Pubkey, Pubkey, Pubkey), u64>,
}

impl TokenBook {
    /// Create `token` and mint its whole supply to `mint_to`
    pub fn create(
        &mut self,
        token: Pubkey,
        name: &str,
        symbol: &str,
        mint_to: Pubkey,
        supply: u64,
    ) -> LaunchpadResult<()> {
        if self.tokens.contains_key(&token) {
            return Err(LaunchpadError::downstream(
                "token ledger",
                format!("token {} already exists", token),
            ));
        }
        self.tokens.insert(
            token,
            TokenInfo {
                name: name.to_string(),
                symbol: symbol.to_string(),
                total_supply: 0,
            },
        );
        self.mint(&token, &mint_to, supply)
    }

    pub fn info(&self, token: &Pubkey) -> Option<&TokenInfo> {
        self.tokens.get(token)
    }

    pub fn exists(&self, token: &Pubkey) -> bool {
        self.tokens.contains_key(token)
    }

    /// Increase supply; only the simulation itself mints after creation
    pub fn mint(&mut self, token: &Pubkey, to: &Pubkey, amount: u64) -> LaunchpadResult<()> {
        let info = self.tokens.get_mut(token).ok_or_else(|| unknown_token(token))?;
        info.total_supply = info
            .total_supply
            .checked_add(amount)
            .ok_or(LaunchpadError::MathOverflow {
                operation: "mint",
            })?;
        *self.balances.entry((*token, *to)).or_default() += amount;
        Ok(())
    }

    pub fn total_supply(&self, token: &Pubkey) -> LaunchpadResult<u64> {
        self.tokens
            .get(token)
            .map(|info| info.total_supply)
            .ok_or_else(|| unknown_token(token))
    }

    pub fn balance_of(&self, token: &Pubkey, owner: &Pubkey) -> u64 {
        self.balances.get(&(*token, *owner)).copied().unwrap_or(0)
    }

    pub fn allowance(&self, token: &Pubkey, owner: &Pubkey, spender: &Pubkey) -> u64 {
        self.allowances
            .get(&(*token, *owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn approve(&mut self, token: &Pubkey, owner: &Pubkey, spender: &Pubkey, amount: u64) -> LaunchpadResult<()> {
        if !self.exists(token) {
            return Err(unknown_token(token));
        }
        self.allowances.insert((*token, *owner, *spender), amount);
        Ok(())
    }

    pub fn transfer(&mut self, token: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u64) -> LaunchpadResult<()> {
        if !self.exists(token) {
            return Err(unknown_token(token));
        }
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(LaunchpadError::InsufficientBalance {
                token: *token,
                available,
                required: amount,
            });
        }
        self.balances.insert((*token, *from), available - amount);
        *self.balances.entry((*token, *to)).or_default() += amount;
        Ok(())
    }

    /// Spend `spender`'s allowance over `from` and move the tokens
    pub fn transfer_from(
        &mut self,
        token: &Pubkey,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> LaunchpadResult<()> {
        let allowed = self.allowance(token, from, spender);
        if allowed < amount {
            return Err(LaunchpadError::InsufficientAllowance {
                token: *token,
                available: allowed,
                required: amount,
            });
        }
        self.transfer(token, from, to, amount)?;
        self.allowances
            .insert((*token, *from, *spender), allowed - amount);
        Ok(())
    }
}

fn unknown_token(token: &Pubkey) -> LaunchpadError {
    LaunchpadError::downstream("token ledger", format!("unknown token {}", token))
}
