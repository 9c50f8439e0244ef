use std::time::Duration;

use alloy::{
    contract, hex::FromHexError, primitives::B256, providers::PendingTransactionError,
    transports::TransportError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("precondition unmet: {0}")]
    PreconditionUnmet(&'static str),

    #[error("wallet unavailable: {reason}")]
    WalletUnavailable { reason: String },

    #[error("wallet is on chain {actual}, expected chain {expected}")]
    NetworkMismatch { expected: u64, actual: u64 },

    #[error("network switch rejected: {0}")]
    NetworkSwitchRejected(#[source] WalletError),

    #[error("signature rejected: {0}")]
    SignatureRejected(#[source] WalletError),

    #[error("encryption failed: {0}")]
    EncryptionFailed(#[source] EncryptionError),

    #[error("invalid bid amount: {reason}")]
    InvalidBidAmount { reason: &'static str },

    #[error("submission rejected: {reason}")]
    SubmissionRejected {
        reason: String,
        tx_hash: Option<B256>,
    },

    #[error("{stage} timed out after {limit:?}")]
    Timeout {
        stage: &'static str,
        limit: Duration,
    },

    #[error("a bid submission is already in progress")]
    AlreadySubmitting,

    #[error("core auction read failed, previous snapshot kept: {reason}")]
    StaleDataIgnored { reason: String },

    #[error("session invalidated")]
    SessionInvalidated,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PreconditionUnmet,
    WalletUnavailable,
    NetworkMismatch,
    NetworkSwitchRejected,
    SignatureRejected,
    EncryptionFailed,
    InvalidBidAmount,
    SubmissionRejected,
    Timeout,
    AlreadySubmitting,
    StaleDataIgnored,
    SessionInvalidated,
    Ledger,
    /// The caller dropped a pipeline before it reached a terminal state.
    Abandoned,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PreconditionUnmet(_) => ErrorKind::PreconditionUnmet,
            Self::WalletUnavailable { .. } => ErrorKind::WalletUnavailable,
            Self::NetworkMismatch { .. } => ErrorKind::NetworkMismatch,
            Self::NetworkSwitchRejected(_) => ErrorKind::NetworkSwitchRejected,
            Self::SignatureRejected(_) => ErrorKind::SignatureRejected,
            Self::EncryptionFailed(_) => ErrorKind::EncryptionFailed,
            Self::InvalidBidAmount { .. } => ErrorKind::InvalidBidAmount,
            Self::SubmissionRejected { .. } => ErrorKind::SubmissionRejected,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::AlreadySubmitting => ErrorKind::AlreadySubmitting,
            Self::StaleDataIgnored { .. } => ErrorKind::StaleDataIgnored,
            Self::SessionInvalidated => ErrorKind::SessionInvalidated,
            Self::Ledger(_) => ErrorKind::Ledger,
        }
    }

    /// Transaction reference attached to the failure, if the write was broadcast.
    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            Self::SubmissionRejected { tx_hash, .. } => *tx_hash,
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("unsupported by this wallet: {0}")]
    Unsupported(&'static str),

    #[error("wallet transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("signer error: {0}")]
    Signer(#[from] alloy::signers::Error),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read ledger: {0}")]
    Transport(#[from] TransportError),

    #[error("contract call failed: {0}")]
    Contract(#[from] contract::Error),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("{reason}")]
    Rejected { reason: String },

    #[error("transaction failed: {0}")]
    Contract(#[from] contract::Error),

    #[error("pending transaction error: {0}")]
    Pending(#[from] PendingTransactionError),

    #[error("transaction receipt missing body")]
    MissingReceipt,

    #[error("transaction reverted: {tx_hash:?}")]
    Reverted { tx_hash: B256 },
}

impl WriteError {
    /// Converts into the crate error, keeping the counterparty's reason text as-is.
    pub fn into_rejection(self, tx_hash: Option<B256>) -> Error {
        let tx_hash = match &self {
            Self::Reverted { tx_hash } => Some(*tx_hash),
            _ => tx_hash,
        };
        let reason = match self {
            Self::Rejected { reason } => reason,
            other => other.to_string(),
        };
        Error::SubmissionRejected { reason, tx_hash }
    }
}

#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("encryption service error: {0}")]
    Service(String),

    #[error("encryption service returned no ciphertext handle")]
    MissingHandle,

    #[error("malformed hex from encryption service: {0}")]
    MalformedHex(#[from] FromHexError),

    #[error("encryption service public key is empty")]
    EmptyPublicKey,
}
