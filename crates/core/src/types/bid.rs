use alloy::primitives::{B256, Bytes, Signature};

use super::primitives::{CiphertextHandle, Wei};

/// Output of the encryption step. Lives for one submission attempt only.
#[derive(Debug, PartialEq, Eq)]
pub struct EncryptedBid {
    pub handle: CiphertextHandle,
    /// Canonical byte form of the validity proof.
    pub proof: Bytes,
}

/// Signature over `commitment`. Not `Clone`: one attestation backs one write.
#[derive(Debug, PartialEq, Eq)]
pub struct BidAttestation {
    pub commitment: B256,
    pub signature: Signature,
}

/// The four-part argument list of the `bid` write.
#[derive(Debug, PartialEq, Eq)]
pub struct BidPayload {
    pub handle: CiphertextHandle,
    pub proof: Bytes,
    pub commitment: B256,
    pub signature: Bytes,
}

impl BidPayload {
    pub fn new(encrypted: EncryptedBid, attestation: BidAttestation) -> Self {
        Self {
            handle: encrypted.handle,
            proof: encrypted.proof,
            commitment: attestation.commitment,
            signature: Bytes::copy_from_slice(&attestation.signature.as_bytes()),
        }
    }
}

/// User input for one attempt. Both amounts are decimal strings in display units.
#[derive(Clone, PartialEq, Eq)]
pub struct BidRequest {
    pub bid_amount: String,
    pub deposit: String,
}

impl std::fmt::Debug for BidRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BidRequest")
            .field("bid_amount", &"<sealed>")
            .field("deposit", &self.deposit)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub tx_hash: B256,
    pub deposit: Wei,
}
