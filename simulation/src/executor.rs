//! Arbitrary call targets reachable through the batch executor

use launchpad_types::{Pubkey, Revert};

/// Behaviour of an address that accepts raw calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTarget {
    /// Pays `amount` of `token` from its own balance to the caller on every call
    Rewards { token: Pubkey, amount: u64 },
    /// Always reverts with `payload`
    Reverting { payload: Vec<u8> },
    /// Returns the call data unchanged
    Echo,
}

impl RawTarget {
    pub fn reverting(reason: &str) -> Self {
        Self::Reverting {
            payload: reason.as_bytes().to_vec(),
        }
    }
}

/// Revert raised when a call hits an address with no code
pub fn no_code(target: &Pubkey) -> Revert {
    Revert::new(*target, "no code at target")
}
