use solana_program::pubkey::Pubkey;
use thiserror::Error;

// ============================================================================
// Main Error Enum
// ============================================================================

/// Error taxonomy for the launchpad
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchpadError {
    // ========================================================================
    // Precondition Errors
    // ========================================================================

    /// Asset name is empty
    #[error("Asset name is empty")]
    EmptyName,

    /// Asset symbol is empty
    #[error("Asset symbol is empty")]
    EmptySymbol,

    /// Asset name does not fit the packed string bound
    #[error("Name too long: {len} bytes (must be below {max})")]
    NameTooLong { len: usize, max: usize },

    /// Asset symbol does not fit the packed string bound
    #[error("Symbol too long: {len} bytes (must be below {max})")]
    SymbolTooLong { len: usize, max: usize },

    /// A required address was the zero address
    #[error("Zero address supplied for '{field}'")]
    ZeroAddress { field: &'static str },

    /// Both sides of a pair reference the same asset
    #[error("Identical assets: {asset}")]
    IdenticalAssets { asset: Pubkey },

    /// Vault reference is unknown or does not hold the expected asset
    #[error("Invalid vault {vault}: {reason}")]
    InvalidVault { vault: Pubkey, reason: String },

    /// No vault is registered for the quote asset
    #[error("Quote vault not found for asset {asset}")]
    QuoteVaultNotFound { asset: Pubkey },

    /// Lookup hit the not-found sentinel
    #[error("Resources not found")]
    ResourcesNotFound,

    /// A bundle key is already present in the ledger indexes
    #[error("Resources already registered under {key}")]
    ResourcesAlreadyRegistered { key: String },

    /// Invalid parameter
    #[error("Invalid parameter '{parameter}': got '{value}', expected '{expected}'")]
    InvalidParameter {
        parameter: String,
        value: String,
        expected: String,
    },

    // ========================================================================
    // Deployment Errors
    // ========================================================================

    /// Minted asset address is outside the reserved namespace
    #[error("Asset {address} does not carry the reserved prefix {prefix:02x?}")]
    InvalidAssetPrefix { address: Pubkey, prefix: Vec<u8> },

    /// Deployment landed somewhere other than the predicted address
    #[error("Address mismatch: predicted {predicted}, deployed {deployed}")]
    AddressMismatch { predicted: Pubkey, deployed: Pubkey },

    /// Controller address differs from the precomputed prediction
    #[error("Invalid controller: predicted {predicted}, deployed {deployed}")]
    InvalidController { predicted: Pubkey, deployed: Pubkey },

    // ========================================================================
    // State Machine Errors
    // ========================================================================

    /// Caller or constructor argument is not the bound launch registry
    #[error("Not the expected registry: {caller}")]
    NotExpectedRegistry { caller: Pubkey },

    /// Controller has already been initialized
    #[error("Controller {controller} already initialized")]
    AlreadyInitialized { controller: Pubkey },

    /// Controller has not been initialized yet
    #[error("Controller {controller} not initialized")]
    NotInitialized { controller: Pubkey },

    /// Controller has already been closed
    #[error("Controller {controller} already closed")]
    AlreadyClosed { controller: Pubkey },

    /// Reentrant call detected
    #[error("Reentrancy detected on {account}")]
    ReentrancyDetected { account: Pubkey },

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    /// Unauthorized access attempt
    #[error("Unauthorized: caller {caller} (required {required:?})")]
    Unauthorized {
        caller: Pubkey,
        required: Option<Pubkey>,
    },

    // ========================================================================
    // Downstream Errors
    // ========================================================================

    /// Arbitrary call through a controller reverted
    #[error("Call to {target} failed with payload {payload:02x?}")]
    CallFailed { target: Pubkey, payload: Vec<u8> },

    /// A vault, AMM, deployer or executor call failed
    #[error("{component} failed: {reason}")]
    Downstream { component: String, reason: String },

    /// Token balance too low
    #[error("Insufficient balance of {token}: have {available}, need {required}")]
    InsufficientBalance {
        token: Pubkey,
        available: u64,
        required: u64,
    },

    /// Token allowance too low
    #[error("Insufficient allowance of {token}: have {available}, need {required}")]
    InsufficientAllowance {
        token: Pubkey,
        available: u64,
        required: u64,
    },

    /// Arithmetic overflow occurred
    #[error("Math overflow in '{operation}'")]
    MathOverflow { operation: &'static str },

    // ========================================================================
    // Configuration Errors
    // ========================================================================

    /// Invalid configuration
    #[error("Invalid configuration for '{component}': {reason}")]
    InvalidConfiguration { component: String, reason: String },
}

impl LaunchpadError {
    /// Create an unauthorized error
    pub fn unauthorized(caller: Pubkey, required: Option<Pubkey>) -> Self {
        Self::Unauthorized { caller, required }
    }

    /// Create a downstream failure attributed to a collaborator
    pub fn downstream(component: &str, reason: impl Into<String>) -> Self {
        Self::Downstream {
            component: component.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, value: &str, expected: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(component: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            component: component.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid vault error
    pub fn invalid_vault(vault: Pubkey, reason: impl Into<String>) -> Self {
        Self::InvalidVault {
            vault,
            reason: reason.into(),
        }
    }

    /// Whether the error is a caller-side precondition violation
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::EmptyName
                | Self::EmptySymbol
                | Self::NameTooLong { .. }
                | Self::SymbolTooLong { .. }
                | Self::ZeroAddress { .. }
                | Self::IdenticalAssets { .. }
                | Self::InvalidVault { .. }
                | Self::QuoteVaultNotFound { .. }
                | Self::ResourcesNotFound
                | Self::InvalidParameter { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = LaunchpadError::NameTooLong { len: 40, max: 32 };
        assert_eq!(err.to_string(), "Name too long: 40 bytes (must be below 32)");

        let err = LaunchpadError::downstream("vault", "insufficient shares");
        assert_eq!(err.to_string(), "vault failed: insufficient shares");

        let err = LaunchpadError::CallFailed {
            target: Pubkey::default(),
            payload: vec![0xde, 0xad],
        };
        assert!(err.to_string().contains("[de, ad]"));
    }

    #[test]
    fn test_precondition_classification() {
        assert!(LaunchpadError::ResourcesNotFound.is_precondition());
        assert!(LaunchpadError::EmptySymbol.is_precondition());
        assert!(!LaunchpadError::AlreadyInitialized {
            controller: Pubkey::default()
        }
        .is_precondition());
        assert!(!LaunchpadError::unauthorized(Pubkey::default(), None).is_precondition());
    }
}
