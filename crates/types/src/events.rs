use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::bundle::ResourceBundle;

/// Notifications emitted by the launchpad
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LaunchpadEvent {
    AssetMinted {
        #[serde(with = "crate::serde_pubkey")]
        asset: Pubkey,
        name: String,
        symbol: String,
        #[serde(with = "crate::serde_pubkey")]
        mint_to: Pubkey,
        total_supply: u64,
    },
    PoolDeployed {
        #[serde(with = "crate::serde_pubkey")]
        controller: Pubkey,
        #[serde(with = "crate::serde_pubkey")]
        pool: Pubkey,
        #[serde(with = "crate::serde_pubkey")]
        asset0: Pubkey,
        #[serde(with = "crate::serde_pubkey")]
        asset1: Pubkey,
    },
    PositionClosed {
        #[serde(with = "crate::serde_pubkey")]
        controller: Pubkey,
        #[serde(with = "crate::serde_pubkey")]
        recipient: Pubkey,
        amount_a: u64,
        amount_b: u64,
    },
    Launched {
        index: u64,
        #[serde(with = "crate::serde_pubkey")]
        owner: Pubkey,
        bundle: ResourceBundle,
    },
    OwnershipTransferred {
        #[serde(with = "crate::serde_pubkey")]
        controller: Pubkey,
        #[serde(with = "crate::serde_pubkey")]
        previous_owner: Pubkey,
        /// `None` once ownership is renounced
        #[serde(with = "crate::serde_pubkey::option")]
        new_owner: Option<Pubkey>,
    },
    Executed {
        #[serde(with = "crate::serde_pubkey")]
        controller: Pubkey,
        #[serde(with = "crate::serde_pubkey")]
        target: Pubkey,
        value: u64,
    },
}
