//! Error taxonomy shared by both chain clients and the creation flow.

use std::time::Duration;

use crate::rpc::RpcError;
use crate::solana::encoder::EncodeError;
use crate::validation::ValidationError;

/// Errors that can occur while creating or managing a token.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// The request failed an input check. Nothing was sent.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// No signer identity is available.
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// The wallet is still on another chain after one switch attempt.
    #[error("Network mismatch: wallet is on chain {actual}, expected {expected}")]
    NetworkMismatch { expected: u64, actual: u64 },

    /// The request could not be laid out in the program's calling convention.
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodeError),

    /// The node or wallet rejected a call; the message is kept verbatim.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The transaction landed but failed on chain.
    #[error("Transaction {reference} failed: {reason}")]
    TransactionFailed { reference: String, reason: String },

    /// Confirmation polling gave up.
    #[error("Transaction {reference} not confirmed after {timeout:?}")]
    ConfirmationTimeout { reference: String, timeout: Duration },

    #[error("ABI error: {0}")]
    Abi(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Instruction error: {0}")]
    Instruction(String),

    /// The operation is not available for the selected profile or chain.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

pub type ForgeResult<T> = Result<T, ForgeError>;

/// Coarse grouping of [`ForgeError`] used when presenting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Wallet,
    Network,
    Submission,
    Decoding,
    Storage,
}

impl ErrorCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Wallet => "wallet",
            ErrorCategory::Network => "network",
            ErrorCategory::Submission => "submission",
            ErrorCategory::Decoding => "decoding",
            ErrorCategory::Storage => "storage",
        }
    }
}

impl ForgeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ForgeError::Validation(_) | ForgeError::Encoding(_) | ForgeError::Unsupported(_) => {
                ErrorCategory::Input
            }
            ForgeError::WalletNotConnected | ForgeError::Wallet(_) => ErrorCategory::Wallet,
            ForgeError::NetworkMismatch { .. } => ErrorCategory::Network,
            ForgeError::Rpc(RpcError::Transport(_)) => ErrorCategory::Network,
            ForgeError::Rpc(_)
            | ForgeError::TransactionFailed { .. }
            | ForgeError::ConfirmationTimeout { .. }
            | ForgeError::Instruction(_) => ErrorCategory::Submission,
            ForgeError::Abi(_) | ForgeError::InvalidResponse(_) | ForgeError::Serialization(_) => {
                ErrorCategory::Decoding
            }
            ForgeError::Storage(_) => ErrorCategory::Storage,
        }
    }

    /// True when the failure happened before anything was sent to a network.
    pub fn is_pre_submission(&self) -> bool {
        matches!(
            self,
            ForgeError::Validation(_)
                | ForgeError::Encoding(_)
                | ForgeError::WalletNotConnected
                | ForgeError::Unsupported(_)
        )
    }
}

impl From<web3::ethabi::Error> for ForgeError {
    fn from(err: web3::ethabi::Error) -> Self {
        ForgeError::Abi(err.to_string())
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        ForgeError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        ForgeError::Storage(err.to_string())
    }
}
