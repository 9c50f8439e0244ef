use alloy::primitives::B256;

use crate::error::ErrorKind;

/// Observable progress of the current (or last) bid attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Encrypting,
    Signing,
    Submitting,
    Confirming { tx_hash: B256 },
    Succeeded { tx_hash: B256 },
    Failed {
        kind: ErrorKind,
        reason: String,
        tx_hash: Option<B256>,
    },
}

impl SubmissionState {
    /// An attempt is between its first stage and a terminal state.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Encrypting | Self::Signing | Self::Submitting | Self::Confirming { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            Self::Confirming { tx_hash } | Self::Succeeded { tx_hash } => Some(*tx_hash),
            Self::Failed { tx_hash, .. } => *tx_hash,
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
