//! Error taxonomy for the custody ledger
//!
//! Every failure is returned synchronously and leaves the ledger untouched:
//! violations are detected before any mutation is staged for commit.

use crate::identity::Amount;
use serde::{Deserialize, Serialize};

/// Unified error type for custody operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CustodyError {
    /// Missing, malformed or mismatched request signature or ownership proof,
    /// including a stale nonce (which changes the signed message)
    #[error("Invalid signature: {reason}")]
    InvalidSignature {
        /// What failed to verify
        reason: String,
    },

    /// Zero amount, or an amount that would overflow a balance
    #[error("Invalid amount: {reason}")]
    InvalidAmount {
        /// Why the amount was rejected
        reason: String,
    },

    /// Empty purpose, or a purpose with no live lock
    #[error("Invalid purpose: '{purpose}'")]
    InvalidPurpose {
        /// The offending purpose label
        purpose: String,
    },

    /// Requested more than the identity can release
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Amount that could have been spent
        available: Amount,
        /// Amount that was requested
        requested: Amount,
    },

    /// Page size outside of the allowed range
    #[error("Invalid page size: {size}")]
    InvalidPageSize {
        /// Requested page size
        size: usize,
    },

    /// Page numbers start at 1
    #[error("Invalid page number: {page}")]
    InvalidPageNumber {
        /// Requested page number
        page: usize,
    },

    /// Signer is already registered
    #[error("Signer already registered: {signer}")]
    RegisteredSigner {
        /// The duplicate signer
        signer: String,
    },

    /// Signer is not registered
    #[error("Signer not registered: {signer}")]
    UnregisteredSigner {
        /// The unknown signer
        signer: String,
    },

    /// External token movement failed
    #[error("Token transfer failed: {reason}")]
    TokenTransfer {
        /// Reason reported by the token custodian
        reason: String,
    },

    /// Configuration could not be loaded or is out of range
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },
}

impl CustodyError {
    /// Create an invalid signature error
    pub fn invalid_signature(reason: impl Into<String>) -> Self {
        Self::InvalidSignature {
            reason: reason.into(),
        }
    }

    /// Create an invalid amount error
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            reason: reason.into(),
        }
    }

    /// Create an invalid purpose error
    pub fn invalid_purpose(purpose: impl Into<String>) -> Self {
        Self::InvalidPurpose {
            purpose: purpose.into(),
        }
    }

    /// Create an insufficient balance error
    pub fn insufficient_balance(available: Amount, requested: Amount) -> Self {
        Self::InsufficientBalance {
            available,
            requested,
        }
    }

    /// Create a token transfer error
    pub fn token_transfer(reason: impl Into<String>) -> Self {
        Self::TokenTransfer {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Short, stable name of the error kind (used in logs)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSignature { .. } => "InvalidSignature",
            Self::InvalidAmount { .. } => "InvalidAmount",
            Self::InvalidPurpose { .. } => "InvalidPurpose",
            Self::InsufficientBalance { .. } => "InsufficientBalance",
            Self::InvalidPageSize { .. } => "InvalidPageSize",
            Self::InvalidPageNumber { .. } => "InvalidPageNumber",
            Self::RegisteredSigner { .. } => "RegisteredSigner",
            Self::UnregisteredSigner { .. } => "UnregisteredSigner",
            Self::TokenTransfer { .. } => "TokenTransfer",
            Self::Config { .. } => "Config",
            Self::Serialization { .. } => "Serialization",
        }
    }
}

impl From<serde_json::Error> for CustodyError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for CustodyError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<std::io::Error> for CustodyError {
    fn from(err: std::io::Error) -> Self {
        Self::config(err.to_string())
    }
}

/// Standard Result type for custody operations
pub type CustodyResult<T> = std::result::Result<T, CustodyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CustodyError::insufficient_balance(10, 20);
        assert_eq!(
            err.to_string(),
            "Insufficient balance: available 10, requested 20"
        );
        assert_eq!(err.kind(), "InsufficientBalance");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(
            CustodyError::from(json_err),
            CustodyError::Serialization { .. }
        ));
    }
}
