//! In-memory chain implementing every collaborator the launchpad drives

use std::collections::{HashMap, HashSet};

use solana_program::hash::{hashv, Hash};

use launchpad::{
    atomically, AmmFactory, BatchExecutor, Deployer, Environment, EscrowVaultFactory, EventSink,
    TokenLedger, Transactional, VaultApi, VaultLookup,
};
use launchpad_types::{
    BatchItem, Call, CallResult, GuardedSalt, InitCode, InitialState, LaunchpadError,
    LaunchpadEvent, LaunchpadResult, PoolParams, Pubkey, Revert,
};

use crate::amm::{instance_address, on_curve, validate_params, AmmBook, AmmInstance, SwapQuote};
use crate::deployer::{create3_address, DeploymentBook};
use crate::executor::{no_code, RawTarget};
use crate::tokens::TokenBook;
use crate::vaults::{EscrowVault, VaultBook};

/// Deterministic address for a named simulation account
pub fn named_account(label: &str) -> Pubkey {
    Pubkey::new_from_array(hashv(&[b"account", label.as_bytes()]).to_bytes())
}

/// Everything that rolls back with a failed operation
#[derive(Debug, Clone, Default)]
pub struct ChainState {
    pub tokens: TokenBook,
    pub vaults: VaultBook,
    pub amm: AmmBook,
    pub deployments: DeploymentBook,
    operators: HashSet<(Pubkey, Pubkey)>,
    vault_registry: HashMap<Pubkey, Pubkey>,
    raw_targets: HashMap<Pubkey, RawTarget>,
    events: Vec<LaunchpadEvent>,
    tokens_created: u64,
}

/// Faults the chain injects until cleared. Never rolled back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureInjection {
    /// Every AMM registration is rejected
    pub reject_registrations: bool,
    /// Controller code lands somewhere other than the computed address
    pub skew_controller_deployments: bool,
}

/// The whole simulated chain behind every collaborator trait.
///
/// There is no native currency: the `value` of a raw call is logged and
/// otherwise ignored.
pub struct MockChain {
    chain_id: u64,
    amm_factory: Pubkey,
    deployer: Pubkey,
    executor: Pubkey,
    vault_factory: Pubkey,
    state: ChainState,
    snapshots: Vec<ChainState>,
    failures: FailureInjection,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            amm_factory: named_account("amm_factory"),
            deployer: named_account("create3_deployer"),
            executor: named_account("batch_executor"),
            vault_factory: named_account("vault_factory"),
            state: ChainState::default(),
            snapshots: Vec::new(),
            failures: FailureInjection::default(),
        }
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn events(&self) -> &[LaunchpadEvent] {
        &self.state.events
    }

    pub fn failures_mut(&mut self) -> &mut FailureInjection {
        &mut self.failures
    }

    // ========================================================================
    // Setup helpers
    // ========================================================================

    /// Create a plain token outside the salted deployer
    pub fn create_token(
        &mut self,
        name: &str,
        symbol: &str,
        mint_to: &Pubkey,
        supply: u64,
    ) -> LaunchpadResult<Pubkey> {
        self.state.tokens_created += 1;
        let token = Pubkey::new_from_array(
            hashv(&[
                b"token",
                symbol.as_bytes(),
                &self.state.tokens_created.to_le_bytes(),
            ])
            .to_bytes(),
        );
        self.state.tokens.create(token, name, symbol, *mint_to, supply)?;
        Ok(token)
    }

    /// Deploy an escrow vault for `asset` and list it in the vault lookup
    pub fn create_listed_vault(&mut self, asset: &Pubkey) -> LaunchpadResult<Pubkey> {
        let factory = self.vault_factory;
        let vault = self.deploy_escrow_vault(&factory, asset)?;
        self.list_vault(asset, &vault);
        Ok(vault)
    }

    pub fn list_vault(&mut self, asset: &Pubkey, vault: &Pubkey) {
        self.state.vault_registry.insert(*asset, *vault);
    }

    pub fn add_raw_target(&mut self, address: Pubkey, target: RawTarget) {
        self.state.raw_targets.insert(address, target);
    }

    /// Simulated interest: underlying appears in the vault without new shares
    pub fn accrue_yield(&mut self, vault: &Pubkey, amount: u64) -> LaunchpadResult<()> {
        let asset = self.state.vaults.asset(vault)?;
        self.state.tokens.mint(&asset, vault, amount)?;
        log::debug!("Accrued {} of {} in vault {}", amount, asset, vault);
        Ok(())
    }

    pub fn vault(&self, vault: &Pubkey) -> LaunchpadResult<&EscrowVault> {
        self.state.vaults.get(vault)
    }

    pub fn instance(&self, instance: &Pubkey) -> Option<&AmmInstance> {
        self.state.amm.by_address(instance)
    }

    // ========================================================================
    // Trading
    // ========================================================================

    /// Exact-input swap against a registered instance
    pub fn swap(
        &mut self,
        trader: &Pubkey,
        instance: &Pubkey,
        token_in: &Pubkey,
        amount_in: u64,
        min_amount_out: u64,
    ) -> LaunchpadResult<SwapQuote> {
        atomically(self, |chain| {
            chain.swap_inner(trader, instance, token_in, amount_in, min_amount_out)
        })
    }

    fn swap_inner(
        &mut self,
        trader: &Pubkey,
        instance: &Pubkey,
        token_in: &Pubkey,
        amount_in: u64,
        min_amount_out: u64,
    ) -> LaunchpadResult<SwapQuote> {
        let pool = self
            .state
            .amm
            .by_address(instance)
            .cloned()
            .ok_or_else(|| LaunchpadError::downstream("amm", format!("unknown instance {}", instance)))?;
        let quote = pool.quote_exact_in(token_in, amount_in)?;
        if quote.amount_out < min_amount_out {
            return Err(LaunchpadError::downstream(
                "amm",
                format!("output {} below minimum {}", quote.amount_out, min_amount_out),
            ));
        }

        let (vault_in, vault_out) = if quote.zero_for_one {
            (pool.params.vault0, pool.params.vault1)
        } else {
            (pool.params.vault1, pool.params.vault0)
        };
        let account = pool.params.account;

        if quote.protocol_fee_amount > 0 {
            self.state.tokens.transfer(
                token_in,
                trader,
                &pool.params.protocol_fee_recipient,
                quote.protocol_fee_amount,
            )?;
        }
        let deposited = amount_in - quote.protocol_fee_amount;
        self.state.tokens.approve(token_in, trader, &vault_in, deposited)?;
        self.state
            .vaults
            .deposit(&mut self.state.tokens, trader, &vault_in, deposited, &account)?;

        // The instance pulls the output as an operator of the account
        if quote.amount_out > 0 {
            self.withdraw(&pool.address, &vault_out, quote.amount_out, trader, &account)?;
        }

        if let Some(live) = self.state.amm.by_address_mut(instance) {
            live.apply(&quote);
        }
        log::debug!(
            "Swap on {}: {} in, {} out",
            instance,
            quote.amount_in,
            quote.amount_out
        );
        Ok(quote)
    }

    // ========================================================================
    // Batch execution
    // ========================================================================

    fn run_batch(&mut self, caller: &Pubkey, items: Vec<BatchItem>) -> LaunchpadResult<Vec<CallResult>> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            if *caller != item.on_behalf_of && !self.is_operator(&item.on_behalf_of, caller) {
                return Err(LaunchpadError::unauthorized(*caller, Some(item.on_behalf_of)));
            }

            let return_data = match item.call {
                Call::SetOperator {
                    account,
                    operator,
                    authorized,
                } => {
                    self.expect_target(&item.target, &self.executor)?;
                    if account != item.on_behalf_of {
                        return Err(LaunchpadError::unauthorized(item.on_behalf_of, Some(account)));
                    }
                    if authorized {
                        self.state.operators.insert((account, operator));
                    } else {
                        self.state.operators.remove(&(account, operator));
                    }
                    Vec::new()
                }
                Call::RegisterPool {
                    params,
                    initial_state,
                    salt,
                } => {
                    self.expect_target(&item.target, &self.amm_factory)?;
                    self.register(&item.on_behalf_of, &params, &initial_state, &salt)?
                        .to_bytes()
                        .to_vec()
                }
                Call::DeregisterPool => {
                    self.expect_target(&item.target, &self.amm_factory)?;
                    self.deregister(&item.on_behalf_of)?.to_bytes().to_vec()
                }
                Call::Raw { data } => self
                    .call(&item.on_behalf_of, &item.target, item.value, &data)
                    .map_err(|revert| LaunchpadError::CallFailed {
                        target: revert.target,
                        payload: revert.payload,
                    })?,
            };
            results.push(CallResult { return_data });
        }
        Ok(results)
    }

    fn expect_target(&self, target: &Pubkey, expected: &Pubkey) -> LaunchpadResult<()> {
        if target != expected {
            return Err(LaunchpadError::downstream(
                "batch executor",
                format!("call sent to {} instead of {}", target, expected),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Collaborator implementations
// ============================================================================

impl TokenLedger for MockChain {
    fn total_supply(&self, token: &Pubkey) -> LaunchpadResult<u64> {
        self.state.tokens.total_supply(token)
    }

    fn balance_of(&self, token: &Pubkey, owner: &Pubkey) -> u64 {
        self.state.tokens.balance_of(token, owner)
    }

    fn allowance(&self, token: &Pubkey, owner: &Pubkey, spender: &Pubkey) -> u64 {
        self.state.tokens.allowance(token, owner, spender)
    }

    fn transfer(&mut self, caller: &Pubkey, token: &Pubkey, to: &Pubkey, amount: u64) -> LaunchpadResult<()> {
        self.state.tokens.transfer(token, caller, to, amount)
    }

    fn approve(&mut self, caller: &Pubkey, token: &Pubkey, spender: &Pubkey, amount: u64) -> LaunchpadResult<()> {
        self.state.tokens.approve(token, caller, spender, amount)
    }

    fn transfer_from(
        &mut self,
        caller: &Pubkey,
        token: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> LaunchpadResult<()> {
        self.state.tokens.transfer_from(token, caller, from, to, amount)
    }
}

impl VaultApi for MockChain {
    fn vault_asset(&self, vault: &Pubkey) -> LaunchpadResult<Pubkey> {
        self.state.vaults.asset(vault)
    }

    fn deposit(
        &mut self,
        caller: &Pubkey,
        vault: &Pubkey,
        amount: u64,
        on_behalf_of: &Pubkey,
    ) -> LaunchpadResult<u64> {
        self.state
            .vaults
            .deposit(&mut self.state.tokens, caller, vault, amount, on_behalf_of)
    }

    fn withdraw(
        &mut self,
        caller: &Pubkey,
        vault: &Pubkey,
        amount: u64,
        to: &Pubkey,
        owner: &Pubkey,
    ) -> LaunchpadResult<u64> {
        if caller != owner && !self.is_operator(owner, caller) {
            return Err(LaunchpadError::unauthorized(*caller, Some(*owner)));
        }
        self.state
            .vaults
            .withdraw(&mut self.state.tokens, vault, amount, to, owner)
    }

    fn max_withdraw(&self, vault: &Pubkey, owner: &Pubkey) -> LaunchpadResult<u64> {
        self.state.vaults.max_withdraw(&self.state.tokens, vault, owner)
    }

    fn total_assets(&self, vault: &Pubkey) -> LaunchpadResult<u64> {
        self.state.vaults.total_assets(&self.state.tokens, vault)
    }
}

impl AmmFactory for MockChain {
    fn amm_factory_address(&self) -> Pubkey {
        self.amm_factory
    }

    fn compute_instance_address(&self, params: &PoolParams, salt: &Hash) -> Pubkey {
        instance_address(&self.amm_factory, params, salt)
    }

    fn register(
        &mut self,
        caller: &Pubkey,
        params: &PoolParams,
        initial_state: &InitialState,
        salt: &Hash,
    ) -> LaunchpadResult<Pubkey> {
        if self.failures.reject_registrations {
            return Err(LaunchpadError::downstream("amm factory", "registration rejected"));
        }
        if params.account != *caller {
            return Err(LaunchpadError::unauthorized(*caller, Some(params.account)));
        }
        validate_params(params)?;

        let asset0 = self.state.vaults.asset(&params.vault0)?;
        let asset1 = self.state.vaults.asset(&params.vault1)?;
        if asset0.as_ref() >= asset1.as_ref() {
            return Err(LaunchpadError::downstream("amm factory", "assets out of order"));
        }
        if !on_curve(params, initial_state.reserve0, initial_state.reserve1) {
            return Err(LaunchpadError::downstream("amm factory", "initial state not on curve"));
        }
        if initial_state.reserve0 > self.max_withdraw(&params.vault0, caller)?
            || initial_state.reserve1 > self.max_withdraw(&params.vault1, caller)?
        {
            return Err(LaunchpadError::downstream(
                "amm factory",
                "initial reserves exceed vault positions",
            ));
        }

        let address = self.compute_instance_address(params, salt);
        if !self.is_operator(caller, &address) {
            return Err(LaunchpadError::downstream(
                "amm factory",
                "instance is not an operator of the account",
            ));
        }

        self.state
            .amm
            .insert(address, *params, asset0, asset1, initial_state)?;
        log::debug!("Registered AMM instance {} for {}", address, caller);
        Ok(address)
    }

    fn deregister(&mut self, caller: &Pubkey) -> LaunchpadResult<Pubkey> {
        let address = self.state.amm.remove(caller)?;
        log::debug!("Deregistered AMM instance {} for {}", address, caller);
        Ok(address)
    }

    fn instance_of(&self, account: &Pubkey) -> Option<Pubkey> {
        self.state.amm.instance_of(account).map(|i| i.address)
    }
}

impl Deployer for MockChain {
    fn deployer_address(&self) -> Pubkey {
        self.deployer
    }

    fn compute_address(&self, salt: &GuardedSalt) -> Pubkey {
        create3_address(&self.deployer, salt)
    }

    fn deploy(&mut self, _caller: &Pubkey, salt: &GuardedSalt, init_code: InitCode) -> LaunchpadResult<Pubkey> {
        let mut address = self.compute_address(salt);
        if self.failures.skew_controller_deployments && matches!(init_code, InitCode::Controller(_)) {
            address = Pubkey::new_from_array(hashv(&[b"skewed", address.as_ref()]).to_bytes());
        }

        self.state.deployments.record(address, init_code.code_hash())?;
        if let InitCode::Asset(init) = &init_code {
            self.state
                .tokens
                .create(address, &init.name, &init.symbol, init.mint_to, init.total_supply)?;
        }
        Ok(address)
    }
}

impl EscrowVaultFactory for MockChain {
    fn deploy_escrow_vault(&mut self, _caller: &Pubkey, asset: &Pubkey) -> LaunchpadResult<Pubkey> {
        if !self.state.tokens.exists(asset) {
            return Err(LaunchpadError::downstream(
                "vault factory",
                format!("unknown asset {}", asset),
            ));
        }
        Ok(self.state.vaults.deploy(&self.vault_factory, asset))
    }
}

impl VaultLookup for MockChain {
    fn vault_for_asset(&self, asset: &Pubkey) -> Option<Pubkey> {
        self.state.vault_registry.get(asset).copied()
    }
}

impl BatchExecutor for MockChain {
    fn executor_address(&self) -> Pubkey {
        self.executor
    }

    fn batch(&mut self, caller: &Pubkey, items: Vec<BatchItem>) -> LaunchpadResult<Vec<CallResult>> {
        atomically(self, |chain| chain.run_batch(caller, items))
    }

    fn call(&mut self, caller: &Pubkey, target: &Pubkey, value: u64, data: &[u8]) -> Result<Vec<u8>, Revert> {
        let behaviour = self
            .state
            .raw_targets
            .get(target)
            .cloned()
            .ok_or_else(|| no_code(target))?;
        log::debug!("Raw call {} -> {} ({} value)", caller, target, value);

        match behaviour {
            RawTarget::Rewards { token, amount } => {
                self.state
                    .tokens
                    .transfer(&token, target, caller, amount)
                    .map_err(|err| Revert::new(*target, &err.to_string()))?;
                Ok(amount.to_le_bytes().to_vec())
            }
            RawTarget::Reverting { payload } => Err(Revert {
                target: *target,
                payload,
            }),
            RawTarget::Echo => Ok(data.to_vec()),
        }
    }

    fn is_operator(&self, account: &Pubkey, operator: &Pubkey) -> bool {
        self.state.operators.contains(&(*account, *operator))
    }
}

impl EventSink for MockChain {
    fn emit(&mut self, event: LaunchpadEvent) {
        self.state.events.push(event);
    }
}

impl Transactional for MockChain {
    type Checkpoint = usize;

    fn checkpoint(&mut self) -> usize {
        self.snapshots.push(self.state.clone());
        self.snapshots.len() - 1
    }

    fn commit(&mut self, checkpoint: usize) {
        self.snapshots.truncate(checkpoint);
    }

    fn rollback(&mut self, checkpoint: usize) {
        if let Some(saved) = self.snapshots.drain(checkpoint..).next() {
            self.state = saved;
        }
    }
}

impl Environment for MockChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }
}
