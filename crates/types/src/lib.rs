/// Shared types for the Feels launchpad
///
/// This crate provides the value types, constants and error taxonomy
/// used by the launch registry, the position controllers, the simulation
/// harness and the CLI.

pub mod bundle;
pub mod call;
pub mod constants;
pub mod errors;
pub mod events;
pub mod pool;
pub mod salt;
pub mod serde_pubkey;

// Re-export all public types
pub use bundle::*;
pub use call::*;
pub use constants::*;
pub use errors::*;
pub use events::*;
pub use pool::*;
pub use salt::*;

pub use solana_program::hash::Hash;
pub use solana_program::pubkey::Pubkey;

/// Result type alias using the shared error type
pub type LaunchpadResult<T> = std::result::Result<T, LaunchpadError>;
