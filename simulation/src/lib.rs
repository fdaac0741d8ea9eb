/// Simulation harness for the Feels launchpad
///
/// Provides an in-memory chain that stands in for every external
/// collaborator of the launchpad:
/// - Token ledger with balances and allowances
/// - Escrow vaults with share accounting and simulated yield
/// - AMM factory with a concentrated two-sided curve
/// - Salted two-stage deployer
/// - Atomic batch executor with operator authorization
///
/// On top of it sit a salt miner for the reserved asset prefix and a
/// scenario runner that replays configured launches.
pub mod amm;
pub mod chain;
pub mod deployer;
pub mod executor;
pub mod salt_miner;
pub mod scenario_runner;
pub mod tokens;
pub mod vaults;

pub use amm::{AmmInstance, SwapQuote};
pub use chain::{named_account, ChainState, FailureInjection, MockChain};
pub use executor::RawTarget;
pub use salt_miner::{MinedSalt, SaltMiner, DEFAULT_MAX_ATTEMPTS};
pub use scenario_runner::{hook_salt, LaunchOutcome, ScenarioReport, ScenarioRunner};

use launchpad_types::LaunchpadError;

/// Simulation error type
#[derive(thiserror::Error, Debug)]
pub enum SimulationError {
    #[error("No salt with the reserved prefix found in {attempts} attempts")]
    SaltNotFound { attempts: u64 },

    #[error("Launchpad error: {0}")]
    Launch(#[from] LaunchpadError),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
}

/// Simulation result type
pub type SimulationResult<T> = std::result::Result<T, SimulationError>;
