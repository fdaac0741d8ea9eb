//! Grinds asset salts until the predicted address carries the reserved prefix

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;

use launchpad::{AssetMinter, Deployer};
use launchpad_types::{Hash, Pubkey};

use crate::{SimulationError, SimulationResult};

/// Attempts allowed when the caller does not pick a limit
pub const DEFAULT_MAX_ATTEMPTS: u64 = 1_000_000;

/// A salt whose asset address lands in the reserved namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinedSalt {
    #[serde(with = "launchpad_types::serde_pubkey::hash")]
    pub salt: Hash,
    #[serde(with = "launchpad_types::serde_pubkey")]
    pub address: Pubkey,
    pub attempts: u64,
}

pub struct SaltMiner {
    rng: StdRng,
    max_attempts: u64,
}

impl SaltMiner {
    /// Miner seeded from OS entropy
    pub fn new(max_attempts: u64) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max_attempts,
        }
    }

    /// Reproducible miner for tests and scripted scenarios
    pub fn seeded(seed: u64, max_attempts: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_attempts,
        }
    }

    pub fn mine<D: Deployer + ?Sized>(
        &mut self,
        minter: &AssetMinter,
        deployer: &D,
        chain_id: u64,
    ) -> SimulationResult<MinedSalt> {
        let mut bytes = [0u8; 32];
        for attempt in 1..=self.max_attempts {
            self.rng.fill_bytes(&mut bytes);
            let salt = Hash::new_from_array(bytes);
            let address = minter.predict_asset_address(deployer, chain_id, &salt);
            if minter.has_reserved_prefix(&address) {
                log::debug!("Found salt {} after {} attempts", salt, attempt);
                return Ok(MinedSalt {
                    salt,
                    address,
                    attempts: attempt,
                });
            }
        }
        Err(SimulationError::SaltNotFound {
            attempts: self.max_attempts,
        })
    }
}
