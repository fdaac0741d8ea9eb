//! External collaborators the launchpad drives
//!
//! Vaults, the AMM factory, the salted deployer and the batch executor live
//! outside this crate. Every call names its `caller`, the account whose
//! authority it runs under. [`Environment`] bundles them together with the
//! chain identity, the event sink and checkpoint/rollback support.

use launchpad_types::{
    BatchItem, CallResult, GuardedSalt, Hash, InitCode, InitialState, LaunchpadEvent,
    LaunchpadResult, PoolParams, Pubkey, Revert,
};

/// Fungible asset balances and allowances
pub trait TokenLedger {
    fn total_supply(&self, token: &Pubkey) -> LaunchpadResult<u64>;

    fn balance_of(&self, token: &Pubkey, owner: &Pubkey) -> u64;

    fn allowance(&self, token: &Pubkey, owner: &Pubkey, spender: &Pubkey) -> u64;

    fn transfer(
        &mut self,
        caller: &Pubkey,
        token: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> LaunchpadResult<()>;

    fn approve(
        &mut self,
        caller: &Pubkey,
        token: &Pubkey,
        spender: &Pubkey,
        amount: u64,
    ) -> LaunchpadResult<()>;

    fn transfer_from(
        &mut self,
        caller: &Pubkey,
        token: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> LaunchpadResult<()>;
}

/// Yield-bearing deposit vaults
pub trait VaultApi {
    /// Underlying asset of `vault`
    fn vault_asset(&self, vault: &Pubkey) -> LaunchpadResult<Pubkey>;

    /// Pull `amount` of the underlying from `caller`, credit shares to `on_behalf_of`
    fn deposit(
        &mut self,
        caller: &Pubkey,
        vault: &Pubkey,
        amount: u64,
        on_behalf_of: &Pubkey,
    ) -> LaunchpadResult<u64>;

    /// Burn `owner`'s shares and send `amount` of the underlying to `to`.
    /// `caller` must be `owner` or an authorized operator of it.
    fn withdraw(
        &mut self,
        caller: &Pubkey,
        vault: &Pubkey,
        amount: u64,
        to: &Pubkey,
        owner: &Pubkey,
    ) -> LaunchpadResult<u64>;

    /// Largest amount `owner` can withdraw right now, accrued yield included
    fn max_withdraw(&self, vault: &Pubkey, owner: &Pubkey) -> LaunchpadResult<u64>;

    fn total_assets(&self, vault: &Pubkey) -> LaunchpadResult<u64>;
}

/// AMM instance factory
pub trait AmmFactory {
    fn amm_factory_address(&self) -> Pubkey;

    /// Address an instance with these parameters and salt will live at
    fn compute_instance_address(&self, params: &PoolParams, salt: &Hash) -> Pubkey;

    fn register(
        &mut self,
        caller: &Pubkey,
        params: &PoolParams,
        initial_state: &InitialState,
        salt: &Hash,
    ) -> LaunchpadResult<Pubkey>;

    fn deregister(&mut self, caller: &Pubkey) -> LaunchpadResult<Pubkey>;

    /// Instance currently registered for `account`
    fn instance_of(&self, account: &Pubkey) -> Option<Pubkey>;
}

/// Salted deterministic deployment primitive
pub trait Deployer {
    fn deployer_address(&self) -> Pubkey;

    fn compute_address(&self, salt: &GuardedSalt) -> Pubkey;

    fn deploy(
        &mut self,
        caller: &Pubkey,
        salt: &GuardedSalt,
        init_code: InitCode,
    ) -> LaunchpadResult<Pubkey>;
}

/// Vault-suite factory for escrow vaults
pub trait EscrowVaultFactory {
    fn deploy_escrow_vault(&mut self, caller: &Pubkey, asset: &Pubkey) -> LaunchpadResult<Pubkey>;
}

/// Registry of recognised vaults by underlying asset
pub trait VaultLookup {
    fn vault_for_asset(&self, asset: &Pubkey) -> Option<Pubkey>;
}

/// All-or-nothing call batching and operator authorization
pub trait BatchExecutor {
    fn executor_address(&self) -> Pubkey;

    /// Execute every item or none of them
    fn batch(&mut self, caller: &Pubkey, items: Vec<BatchItem>) -> LaunchpadResult<Vec<CallResult>>;

    /// Single arbitrary call from `caller`; reverts carry the target's payload
    fn call(
        &mut self,
        caller: &Pubkey,
        target: &Pubkey,
        value: u64,
        data: &[u8],
    ) -> Result<Vec<u8>, Revert>;

    fn is_operator(&self, account: &Pubkey, operator: &Pubkey) -> bool;
}

/// Destination for launchpad notifications
pub trait EventSink {
    fn emit(&mut self, event: LaunchpadEvent);
}

/// Checkpoint and rollback of the whole environment
pub trait Transactional {
    type Checkpoint;

    fn checkpoint(&mut self) -> Self::Checkpoint;

    fn commit(&mut self, checkpoint: Self::Checkpoint);

    fn rollback(&mut self, checkpoint: Self::Checkpoint);
}

/// Everything an operation can touch
pub trait Environment:
    TokenLedger
    + VaultApi
    + AmmFactory
    + Deployer
    + EscrowVaultFactory
    + VaultLookup
    + BatchExecutor
    + EventSink
    + Transactional
{
    fn chain_id(&self) -> u64;
}

/// Run `f` as one unit: commit on success, roll the environment back on error
pub fn atomically<E, T, F>(env: &mut E, f: F) -> LaunchpadResult<T>
where
    E: Transactional + ?Sized,
    F: FnOnce(&mut E) -> LaunchpadResult<T>,
{
    let checkpoint = env.checkpoint();
    match f(env) {
        Ok(value) => {
            env.commit(checkpoint);
            Ok(value)
        }
        Err(err) => {
            env.rollback(checkpoint);
            Err(err)
        }
    }
}
