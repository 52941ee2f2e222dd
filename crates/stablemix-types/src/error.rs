//! Error types for the stablemix router.
//!
//! All errors use the `MX_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Input validation / access control
//! - 2xx: Balance and allowance errors
//! - 3xx: Permit errors
//! - 4xx: Slippage guards
//! - 5xx: Delegated (external collaborator) failures
//! - 6xx: Payload decoding
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::Address;

/// Central error enum for all stablemix operations.
#[derive(Debug, Error)]
pub enum MixerError {
    // =================================================================
    // Input Validation (1xx)
    // =================================================================
    /// A required address was zero, or a lookup resolved to nothing.
    #[error("MX_ERR_100: Zero address")]
    ZeroAddress,

    /// Parallel array arguments disagree in length.
    #[error("MX_ERR_101: Incompatible lengths")]
    IncompatibleLengths,

    /// The stable master or pair is already registered.
    #[error("MX_ERR_102: Already added")]
    AlreadyAdded,

    /// A collaborator does not report the expected relationship.
    #[error("MX_ERR_103: Invalid params: {reason}")]
    InvalidParams { reason: String },

    /// A gauge does not stake the pair's san token.
    #[error("MX_ERR_104: Gauge {gauge} stakes {staked}, expected {expected}")]
    InvalidSanToken {
        gauge: Address,
        staked: Address,
        expected: Address,
    },

    /// The caller holds neither the governor nor the guardian role.
    #[error("MX_ERR_105: Caller {0} is not governor or guardian")]
    NotGovernorOrGuardian(Address),

    /// The role change would leave the router in an invalid state.
    #[error("MX_ERR_106: Invalid conditions: {reason}")]
    InvalidConditions { reason: String },

    /// The action list exceeds the configured limit.
    #[error("MX_ERR_107: Too many actions: {count} > {max}")]
    TooManyActions { count: usize, max: usize },

    // =================================================================
    // Balance / Allowance Errors (2xx)
    // =================================================================
    /// Not enough balance to perform a transfer.
    #[error("MX_ERR_200: Insufficient balance of {token}: need {needed}, have {available}")]
    InsufficientBalance {
        token: Address,
        needed: Decimal,
        available: Decimal,
    },

    /// Spender allowance is below the transferred amount.
    #[error("MX_ERR_201: Insufficient allowance of {token}: need {needed}, have {available}")]
    InsufficientAllowance {
        token: Address,
        needed: Decimal,
        available: Decimal,
    },

    /// The router was asked to burn stablecoins it holds no approval for.
    #[error("MX_ERR_202: Burn amount exceeds allowance: need {needed}, have {available}")]
    BurnAmountExceedsAllowance { needed: Decimal, available: Decimal },

    /// The token rejects a non-zero to non-zero approval change.
    #[error("MX_ERR_203: Approval of {token} must be reset to zero first")]
    ApproveFromNonZero { token: Address },

    /// Not enough native value.
    #[error("MX_ERR_204: Insufficient native balance: need {needed}, have {available}")]
    InsufficientNativeBalance { needed: Decimal, available: Decimal },

    /// The address is not a token known to the ledger.
    #[error("MX_ERR_205: Unknown token {0}")]
    UnknownToken(Address),

    /// Negative amounts are never valid.
    #[error("MX_ERR_206: Negative amount {0}")]
    NegativeAmount(Decimal),

    /// Sum of balances diverged from recorded supply. Critical.
    #[error("MX_ERR_207: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // Permit Errors (3xx)
    // =================================================================
    /// The permit deadline is in the past.
    #[error("MX_ERR_300: Permit expired")]
    PermitExpired,

    /// The signature does not verify for the declared owner.
    #[error("MX_ERR_301: Invalid permit signature")]
    InvalidSignature,

    /// The token has no signature-based approval entry point.
    #[error("MX_ERR_302: Token {0} does not support permits")]
    PermitNotSupported(Address),

    // =================================================================
    // Slippage Guards (4xx)
    // =================================================================
    /// Realized output fell below the declared minimum.
    #[error("MX_ERR_400: Too small amount out: got {actual}, minimum {minimum}")]
    TooSmallAmountOut { actual: Decimal, minimum: Decimal },

    /// Realized input exceeded the declared maximum.
    #[error("MX_ERR_401: Too big amount in: got {actual}, maximum {maximum}")]
    TooBigAmountIn { actual: Decimal, maximum: Decimal },

    /// Collateral spent per stablecoin minted exceeded the declared rate.
    #[error("MX_ERR_402: Mint rate {rate} exceeds maximum {max}")]
    MintRateExceeded { rate: Decimal, max: Decimal },

    // =================================================================
    // Delegated Failures (5xx)
    // =================================================================
    /// An external collaborator failed with a readable message.
    #[error("MX_ERR_500: External call failed: {reason}")]
    ExternalCallFailed { reason: String },

    /// An external collaborator failed without a decodable message.
    #[error("MX_ERR_501: Invalid return message")]
    InvalidReturnMessage,

    /// No contract is deployed at the target address.
    #[error("MX_ERR_502: Unknown contract {0}")]
    UnknownContract(Address),

    /// The contract does not expose the required interface.
    #[error("MX_ERR_503: Contract {target} does not implement {interface}")]
    UnsupportedInterface {
        target: Address,
        interface: &'static str,
    },

    // =================================================================
    // Payload Decoding (6xx)
    // =================================================================
    /// A recognized action tag carried an undecodable payload.
    #[error("MX_ERR_600: Malformed payload for action {action}: {reason}")]
    MalformedPayload { action: String, reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("MX_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("MX_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("MX_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("MX_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MixerError>;

impl From<std::io::Error> for MixerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MixerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = MixerError::ZeroAddress;
        let msg = format!("{err}");
        assert!(msg.starts_with("MX_ERR_100"), "Got: {msg}");
    }

    #[test]
    fn too_small_amount_out_display() {
        let err = MixerError::TooSmallAmountOut {
            actual: Decimal::new(95, 0),
            minimum: Decimal::new(100, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("MX_ERR_400"));
        assert!(msg.contains("95"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn unsupported_interface_names_the_interface() {
        let err = MixerError::UnsupportedInterface {
            target: Address::derive(b"gauge"),
            interface: "LiquidityGauge",
        };
        assert!(format!("{err}").contains("LiquidityGauge"));
    }

    #[test]
    fn all_errors_have_mx_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(MixerError::IncompatibleLengths),
            Box::new(MixerError::PermitExpired),
            Box::new(MixerError::InvalidReturnMessage),
            Box::new(MixerError::Internal("test".into())),
            Box::new(MixerError::MalformedPayload {
                action: "DEPOSIT".into(),
                reason: "eof".into(),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("MX_ERR_"),
                "Error missing MX_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn json_errors_convert_to_serialization() {
        let json_err = serde_json::from_str::<u64>("not a number").unwrap_err();
        let err: MixerError = json_err.into();
        assert!(matches!(err, MixerError::Serialization(_)));
    }
}
