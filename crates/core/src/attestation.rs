//! Binds a ciphertext handle to the encryption service key and has the wallet
//! sign that binding.
//!
//! The signed value is `keccak256(handle ++ key)`. Signing only the handle, or
//! only the key, would let a relayer pair a valid signature with a substituted
//! ciphertext or a substituted key; both are rejected by construction here.

use std::{sync::Arc, time::Duration};

use alloy::{
    primitives::{B256, keccak256},
    sol_types::Eip712Domain,
};
use sealbid_abi::PublicKey;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{
    encryption::EncryptionService,
    error::{EncryptionError, Error},
    time::bounded,
    types::{bid::BidAttestation, primitives::CiphertextHandle},
    wallet::Session,
};

const NO_KEY: &str = "encryption public key not derived";

/// Left-pads keys of up to 32 bytes; hashes longer keys with keccak256.
pub fn normalize_public_key(key: &[u8]) -> B256 {
    if key.len() <= 32 {
        B256::left_padding_from(key)
    } else {
        keccak256(key)
    }
}

pub fn binding_commitment(handle: &CiphertextHandle, key: &B256) -> B256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(handle.as_b256().as_slice());
    preimage[32..].copy_from_slice(key.as_slice());
    keccak256(preimage)
}

pub struct AttestationSigner {
    session: Session,
    domain: Eip712Domain,
    timeout: Duration,
    public_key: OnceCell<B256>,
}

impl AttestationSigner {
    pub fn new(session: Session, domain: Eip712Domain, timeout: Duration) -> Self {
        Self {
            session,
            domain,
            timeout,
            public_key: OnceCell::new(),
        }
    }

    /// Normalized service key, if it has been derived this session.
    pub fn public_key(&self) -> Option<B256> {
        self.public_key.get().copied()
    }

    /// Fetches and normalizes the service key once; later calls hit the cache.
    pub async fn derive_public_key(&self, service: &dyn EncryptionService) -> Result<B256, Error> {
        self.public_key
            .get_or_try_init(|| async {
                let encoded = bounded(self.timeout, "public key retrieval", service.public_key())
                    .await?
                    .map_err(Error::EncryptionFailed)?;
                let raw = encoded.to_bytes().map_err(Error::EncryptionFailed)?;
                if raw.is_empty() {
                    return Err(Error::EncryptionFailed(EncryptionError::EmptyPublicKey));
                }
                let key = normalize_public_key(&raw);
                debug!(raw_len = raw.len(), key = %key, "service public key normalized");
                Ok(key)
            })
            .await
            .copied()
    }

    pub async fn attest(&self, handle: &CiphertextHandle) -> Result<BidAttestation, Error> {
        let key = self.public_key().ok_or(Error::PreconditionUnmet(NO_KEY))?;
        let commitment = binding_commitment(handle, &key);
        let binding = PublicKey { key: commitment };

        let wallet = self.session.wallet();
        let signature = bounded(
            self.timeout,
            "wallet signature",
            wallet.sign_typed_data(self.session.account(), &self.domain, &binding),
        )
        .await?
        .map_err(Error::SignatureRejected)?;

        Ok(BidAttestation {
            commitment,
            signature,
        })
    }
}
