//! Deterministic deployment addresses
//!
//! Salts are first bound to the chain identity (so the same nominal salt
//! lands on different addresses on different chains), then handed to the
//! salted deployer. Prediction and deployment always go through the same
//! [`AddressDeterminism`] so both sides see the identical guarded salt.

use launchpad_types::{GuardedSalt, Hash, InitCode, LaunchpadError, LaunchpadResult, Pubkey};

use crate::interfaces::{Deployer, Environment};

/// Bind a caller-supplied salt to a chain
pub fn guard_salt(chain_id: u64, salt: &Hash) -> GuardedSalt {
    GuardedSalt::derive(chain_id, salt)
}

/// Salt guarding and address prediction for one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDeterminism {
    chain_id: u64,
}

impl AddressDeterminism {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    pub fn for_env<E: Environment + ?Sized>(env: &E) -> Self {
        Self::new(env.chain_id())
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn guard(&self, salt: &Hash) -> GuardedSalt {
        guard_salt(self.chain_id, salt)
    }

    /// Address the deployer will use for an already guarded salt
    pub fn predict<D: Deployer + ?Sized>(&self, deployer: &D, salt: &GuardedSalt) -> Pubkey {
        deployer.compute_address(salt)
    }

    /// Guard `salt` and predict its address
    pub fn predict_for_salt<D: Deployer + ?Sized>(&self, deployer: &D, salt: &Hash) -> Pubkey {
        self.predict(deployer, &self.guard(salt))
    }

    /// Guard, predict, deploy, and verify the deployment landed where predicted
    pub fn deploy<D: Deployer + ?Sized>(
        &self,
        deployer: &mut D,
        caller: &Pubkey,
        salt: &Hash,
        init_code: InitCode,
    ) -> LaunchpadResult<Pubkey> {
        let guarded = self.guard(salt);
        let predicted = self.predict(deployer, &guarded);
        let kind = init_code.kind();

        let deployed = deployer.deploy(caller, &guarded, init_code)?;
        if deployed != predicted {
            return Err(LaunchpadError::AddressMismatch {
                predicted,
                deployed,
            });
        }

        log::debug!("Deployed {} at {} (guarded salt {})", kind, deployed, guarded);
        Ok(deployed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_types::{AssetInit, ASSET_CODE_SEED};
    use solana_program::hash::hashv;
    use std::collections::HashSet;

    /// Deployer whose addresses depend only on the guarded salt
    struct SaltOnlyDeployer {
        address: Pubkey,
        occupied: HashSet<Pubkey>,
        skew: bool,
    }

    impl SaltOnlyDeployer {
        fn new(skew: bool) -> Self {
            Self {
                address: Pubkey::new_from_array([9u8; 32]),
                occupied: HashSet::new(),
                skew,
            }
        }
    }

    impl Deployer for SaltOnlyDeployer {
        fn deployer_address(&self) -> Pubkey {
            self.address
        }

        fn compute_address(&self, salt: &GuardedSalt) -> Pubkey {
            Pubkey::new_from_array(hashv(&[self.address.as_ref(), salt.as_ref()]).to_bytes())
        }

        fn deploy(
            &mut self,
            _caller: &Pubkey,
            salt: &GuardedSalt,
            init_code: InitCode,
        ) -> LaunchpadResult<Pubkey> {
            let mut address = self.compute_address(salt);
            if self.skew {
                address = Pubkey::new_from_array(
                    hashv(&[ASSET_CODE_SEED, init_code.code_hash().as_ref()]).to_bytes(),
                );
            }
            if !self.occupied.insert(address) {
                return Err(LaunchpadError::downstream("deployer", "address occupied"));
            }
            Ok(address)
        }
    }

    fn asset_code() -> InitCode {
        InitCode::Asset(AssetInit {
            name: "Launch".to_string(),
            symbol: "LNCH".to_string(),
            mint_to: Pubkey::new_from_array([1u8; 32]),
            total_supply: 60,
        })
    }

    #[test]
    fn test_prediction_matches_deployment() {
        let determinism = AddressDeterminism::new(1);
        let mut deployer = SaltOnlyDeployer::new(false);
        let salt = Hash::new_from_array([4u8; 32]);

        let predicted = determinism.predict_for_salt(&deployer, &salt);
        let deployed = determinism
            .deploy(&mut deployer, &Pubkey::new_unique(), &salt, asset_code())
            .unwrap();
        assert_eq!(predicted, deployed);

        // Same salt again collides at the deployer
        assert!(determinism
            .deploy(&mut deployer, &Pubkey::new_unique(), &salt, asset_code())
            .is_err());
    }

    #[test]
    fn test_chain_id_changes_prediction() {
        let deployer = SaltOnlyDeployer::new(false);
        let salt = Hash::new_from_array([4u8; 32]);

        let mainnet = AddressDeterminism::new(1);
        let testnet = AddressDeterminism::new(2);
        assert_ne!(mainnet.guard(&salt), testnet.guard(&salt));
        assert_ne!(
            mainnet.predict_for_salt(&deployer, &salt),
            testnet.predict_for_salt(&deployer, &salt)
        );
    }

    #[test]
    fn test_mismatched_deployment_is_fatal() {
        let determinism = AddressDeterminism::new(1);
        let mut deployer = SaltOnlyDeployer::new(true);
        let salt = Hash::new_from_array([4u8; 32]);

        let err = determinism
            .deploy(&mut deployer, &Pubkey::new_unique(), &salt, asset_code())
            .unwrap_err();
        assert!(matches!(err, LaunchpadError::AddressMismatch { .. }));
    }
}
