/// Protocol constants used across the launchpad

// ============================================================================
// Fixed-Point Constants
// ============================================================================

/// Fixed-point scale for prices, concentrations and fees (1e18 = 1.0)
pub const WAD: u64 = 1_000_000_000_000_000_000;

/// Upper bound for curve concentration parameters
pub const MAX_CONCENTRATION: u64 = WAD;

/// Upper bound for swap fees (100%)
pub const MAX_FEE: u64 = WAD;

/// Upper bound for the protocol's share of swap fees (100%)
pub const MAX_PROTOCOL_FEE: u64 = WAD;

/// Largest value an equilibrium reserve or initial reserve may hold
pub const MAX_RESERVE: u64 = u64::MAX;

// ============================================================================
// Asset Metadata Bounds
// ============================================================================

/// Asset names and symbols must be strictly shorter than this many bytes.
///
/// Packed single-word string storage holds 31 bytes plus a length byte;
/// the bound is kept as a validation rule.
pub const MAX_STRING_LENGTH: usize = 32;

/// Default bound for asset names
pub const MAX_NAME_LENGTH: usize = MAX_STRING_LENGTH;

/// Default bound for asset symbols
pub const MAX_SYMBOL_LENGTH: usize = MAX_STRING_LENGTH;

/// Default reserved address prefix for launched assets
pub const DEFAULT_RESERVED_PREFIX: &[u8] = &[0xFE];

// ============================================================================
// Derivation Seeds
// ============================================================================

/// Seed mixed into controller salts so they never collide with asset salts
pub const CONTROLLER_SALT_SEED: &[u8] = b"controller";

/// Seed for the canonical pair key
pub const PAIR_KEY_SEED: &[u8] = b"pair";

/// Seed for asset init code hashing
pub const ASSET_CODE_SEED: &[u8] = b"asset";

/// Seed for controller init code hashing
pub const CONTROLLER_CODE_SEED: &[u8] = b"position_controller";

/// Seed for pool parameter hashing
pub const POOL_PARAMS_SEED: &[u8] = b"pool_params";
