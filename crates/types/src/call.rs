//! Items executed by the batched-call executor

use solana_program::hash::Hash;
use solana_program::pubkey::Pubkey;

use crate::pool::{InitialState, PoolParams};

/// Typed payload of a batch item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Grant or revoke `operator` over `account`'s vault positions
    SetOperator {
        account: Pubkey,
        operator: Pubkey,
        authorized: bool,
    },
    /// Register an AMM instance for the calling account
    RegisterPool {
        params: PoolParams,
        initial_state: InitialState,
        salt: Hash,
    },
    /// Deregister the calling account's AMM instance
    DeregisterPool,
    /// Opaque call data for arbitrary targets
    Raw { data: Vec<u8> },
}

/// One entry of an all-or-nothing batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub target: Pubkey,
    pub on_behalf_of: Pubkey,
    pub value: u64,
    pub call: Call,
}

impl BatchItem {
    pub fn new(target: Pubkey, on_behalf_of: Pubkey, call: Call) -> Self {
        Self {
            target,
            on_behalf_of,
            value: 0,
            call,
        }
    }
}

/// Outcome of a single executed call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallResult {
    pub return_data: Vec<u8>,
}

/// A reverted call and its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revert {
    pub target: Pubkey,
    pub payload: Vec<u8>,
}

impl Revert {
    pub fn new(target: Pubkey, reason: &str) -> Self {
        Self {
            target,
            payload: reason.as_bytes().to_vec(),
        }
    }

    /// Payload rendered as text where it is valid UTF-8
    pub fn reason(&self) -> String {
        String::from_utf8_lossy(&self.payload).to_string()
    }
}
