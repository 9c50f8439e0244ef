use std::{sync::Arc, time::Duration};

use alloy::primitives::Address;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use tracing::debug;
use zeroize::Zeroizing;

use crate::{
    error::{EncryptionError, Error},
    time::bounded,
    types::{
        bid::EncryptedBid,
        primitives::{BID_DECIMALS, BID_DENOMINATION, CiphertextHandle},
    },
};

use super::EncryptionService;

/// Converts a decimal display amount into fixed-point units of 10^-9.
/// Sub-unit digits are truncated, never rounded. Only plain `digits[.digits]`
/// notation is accepted.
pub fn parse_bid_units(amount: &str) -> Result<u64, Error> {
    let amount = amount.trim();
    let (negative, digits) = match amount.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, amount),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let well_formed = !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(Error::InvalidBidAmount {
            reason: "not a decimal number",
        });
    }
    if negative && whole.bytes().chain(fraction.bytes()).any(|b| b != b'0') {
        return Err(Error::InvalidBidAmount {
            reason: "amount is negative",
        });
    }

    // Digits past the unit never reach the decimal parser, which would round them.
    let fraction = &fraction[..fraction.len().min(BID_DECIMALS)];
    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_owned()
    } else {
        format!("{whole}.{fraction}")
    };

    Decimal::from_str_exact(&normalized)
        .ok()
        .and_then(|amount| amount.checked_mul(Decimal::from(BID_DENOMINATION)))
        .map(|scaled| scaled.trunc())
        .and_then(|units| units.to_u64())
        .ok_or(Error::InvalidBidAmount {
            reason: "amount does not fit in 64 bits",
        })
}

/// Turns a plaintext bid into a ciphertext handle and validity proof.
#[derive(Clone)]
pub struct BidPreparer {
    service: Arc<dyn EncryptionService>,
    timeout: Duration,
}

impl BidPreparer {
    pub fn new(service: Arc<dyn EncryptionService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub async fn prepare(
        &self,
        amount: &str,
        account: Address,
        contract: Address,
    ) -> Result<EncryptedBid, Error> {
        let units = Zeroizing::new(parse_bid_units(amount)?);

        let mut input = self
            .service
            .create_input(contract, account)
            .map_err(Error::EncryptionFailed)?;
        input.add_u64(*units);
        drop(units);

        let output = bounded(self.timeout, "bid encryption", input.encrypt())
            .await?
            .map_err(Error::EncryptionFailed)?;

        let handle = output
            .handles
            .first()
            .copied()
            .ok_or(Error::EncryptionFailed(EncryptionError::MissingHandle))?;
        let proof = output.proof.to_bytes().map_err(Error::EncryptionFailed)?;

        debug!(handle = %handle, proof_len = proof.len(), "bid encrypted");

        Ok(EncryptedBid {
            handle: CiphertextHandle::new(handle),
            proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, testing::MockEncryption};

    #[test]
    fn smallest_unit_converts_to_one() {
        assert_eq!(parse_bid_units("0.000000001").unwrap(), 1);
    }

    #[test]
    fn fractional_amount_is_scaled() {
        assert_eq!(parse_bid_units("1.5").unwrap(), 1_500_000_000);
        assert_eq!(parse_bid_units(" 2 ").unwrap(), 2_000_000_000);
    }

    #[test]
    fn sub_unit_digits_are_truncated() {
        assert_eq!(parse_bid_units("0.0000000019").unwrap(), 1);
        assert_eq!(parse_bid_units("0.0000000009").unwrap(), 0);
    }

    #[test]
    fn long_fraction_below_one_unit_is_zero() {
        let below_one = parse_bid_units("0.00000000099999999999999999999").unwrap();
        assert_eq!(below_one, 0);
        let below_two = parse_bid_units("1.99999999999999999999999999999999").unwrap();
        assert_eq!(below_two, 1_999_999_999);
    }

    #[test]
    fn bare_fraction_and_negative_zero_are_accepted() {
        assert_eq!(parse_bid_units(".5").unwrap(), 500_000_000);
        assert_eq!(parse_bid_units("3.").unwrap(), 3_000_000_000);
        assert_eq!(parse_bid_units("-0.0").unwrap(), 0);
    }

    #[test]
    fn rejects_negative_malformed_and_oversized() {
        let inputs = [
            "-1",
            "-0.5",
            "abc",
            "",
            ".",
            "-",
            "1.2.3",
            "1e3",
            "+1",
            "18446744074",
            "123456789012345678901234567890",
        ];
        for input in inputs {
            let err = parse_bid_units(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidBidAmount, "input {input:?}");
        }
    }

    #[test]
    fn error_never_echoes_plaintext() {
        let err = parse_bid_units("-123.456").unwrap_err();
        assert!(!err.to_string().contains("123"));
    }

    #[tokio::test]
    async fn encrypts_units_and_normalizes_proof() {
        let service = Arc::new(MockEncryption::default().with_hex_proof("0xCAFE"));
        let preparer = BidPreparer::new(service.clone(), Duration::from_secs(1));

        let (account, contract) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let bid = preparer
            .prepare("1.5", account, contract)
            .await
            .expect("prepared");

        assert_eq!(service.added_values(), vec![1_500_000_000]);
        assert_eq!(service.inputs_for(), vec![(contract, account)]);
        assert_eq!(bid.proof.to_string(), "0xcafe");
        assert_eq!(bid.handle, CiphertextHandle::new(MockEncryption::HANDLE));
    }

    #[tokio::test]
    async fn service_failure_is_encryption_failed() {
        let service = Arc::new(MockEncryption::default().failing());
        let preparer = BidPreparer::new(service, Duration::from_secs(1));

        let err = preparer
            .prepare("1", Address::ZERO, Address::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncryptionFailed);
    }

    #[tokio::test]
    async fn invalid_amount_never_reaches_service() {
        let service = Arc::new(MockEncryption::default());
        let preparer = BidPreparer::new(service.clone(), Duration::from_secs(1));

        let err = preparer
            .prepare("-4", Address::ZERO, Address::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBidAmount);
        assert_eq!(service.input_count(), 0);
    }
}
