//! Seam to the homomorphic encryption service. Loading and key management live
//! in the service; this crate only needs to build inputs, encrypt one `u64` and
//! read the service public key.

pub mod init;
pub mod preparer;

use alloy::{
    hex,
    primitives::{Address, B256, Bytes},
};
use async_trait::async_trait;

use crate::error::EncryptionError;

pub use init::{EncryptionBackend, InstanceConfig, initialize};
pub use preparer::{BidPreparer, parse_bid_units};

/// Byte material as the service happens to encode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Bytes(Vec<u8>),
    /// Hex with or without a `0x` prefix.
    Hex(String),
}

impl Encoded {
    pub fn to_bytes(&self) -> Result<Bytes, EncryptionError> {
        match self {
            Self::Bytes(bytes) => Ok(Bytes::copy_from_slice(bytes)),
            Self::Hex(text) => Ok(Bytes::from(hex::decode(text)?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedOutput {
    pub handles: Vec<B256>,
    pub proof: Encoded,
}

/// Per-(contract, account) builder for one encrypted input.
#[async_trait]
pub trait EncryptedInput: Send {
    fn add_u64(&mut self, value: u64);

    async fn encrypt(self: Box<Self>) -> Result<EncryptedOutput, EncryptionError>;
}

#[async_trait]
pub trait EncryptionService: Send + Sync {
    fn create_input(
        &self,
        contract: Address,
        account: Address,
    ) -> Result<Box<dyn EncryptedInput>, EncryptionError>;

    async fn public_key(&self) -> Result<Encoded, EncryptionError>;
}
