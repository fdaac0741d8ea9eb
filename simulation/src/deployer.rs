//! Two-stage salted deployment
//!
//! A fixed proxy is first placed at an address derived from the deployer
//! and the salt; the proxy then deploys the real code at an address derived
//! from the proxy alone. The final address therefore never depends on the
//! code being deployed.

use std::collections::HashMap;

use solana_program::hash::{hashv, Hash};

use launchpad_types::{GuardedSalt, LaunchpadError, LaunchpadResult, Pubkey};

/// Hash of the fixed proxy code
pub const PROXY_CODE_HASH: &[u8] = b"launchpad.create3.proxy.v1";

/// Final address for `salt` deployed through `deployer`
pub fn create3_address(deployer: &Pubkey, salt: &GuardedSalt) -> Pubkey {
    let proxy = hashv(&[b"proxy", deployer.as_ref(), salt.as_ref(), PROXY_CODE_HASH]);
    Pubkey::new_from_array(hashv(&[b"deployed", proxy.as_ref()]).to_bytes())
}

/// Addresses occupied by deployed code
#[derive(Debug, Clone, Default)]
pub struct DeploymentBook {
    code: HashMap<Pubkey, Hash>,
}

impl DeploymentBook {
    pub fn record(&mut self, address: Pubkey, code_hash: Hash) -> LaunchpadResult<()> {
        if self.code.contains_key(&address) {
            return Err(LaunchpadError::downstream(
                "deployer",
                format!("address {} already occupied", address),
            ));
        }
        self.code.insert(address, code_hash);
        Ok(())
    }

    pub fn code_hash(&self, address: &Pubkey) -> Option<Hash> {
        self.code.get(address).copied()
    }

    pub fn is_deployed(&self, address: &Pubkey) -> bool {
        self.code.contains_key(address)
    }
}
