use alloy::primitives::{B256, U256};

/// Denomination of the encrypted bid: 1 unit = 10^-9 of the displayed amount.
pub const BID_DENOMINATION: u64 = 1_000_000_000;
/// Fractional digits carried by one bid unit.
pub const BID_DECIMALS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BlockNumber(u64);

impl BlockNumber {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn blocks_until(&self, target: BlockNumber) -> u64 {
        target.0.saturating_sub(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Round(u64);

impl Round {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Native currency amount in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Wei(U256);

impl Wei {
    pub const ZERO: Self = Self(U256::ZERO);

    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// Opaque fixed-width reference to a value held by the encryption service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CiphertextHandle(B256);

impl CiphertextHandle {
    pub fn new(value: B256) -> Self {
        Self(value)
    }

    pub fn as_b256(&self) -> B256 {
        self.0
    }
}
