use std::time::Duration;

use alloy::{
    primitives::{Address, U256},
    sol_types::Eip712Domain,
};

pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const INIT_TIMEOUT: Duration = Duration::from_secs(30);
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(180);

/// Used when `minBidDeposit()` cannot be read.
pub const FALLBACK_MIN_DEPOSIT: U256 = U256::from_limbs([10_000_000, 0, 0, 0]);

pub const BID_GAS_LIMIT: u64 = 10_000_000;
pub const FINALIZE_GAS_LIMIT: u64 = 5_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningDomain {
    pub name: String,
    pub version: String,
}

impl Default for SigningDomain {
    fn default() -> Self {
        Self {
            name: "FHEAuction".to_string(),
            version: "3".to_string(),
        }
    }
}

/// Network-specific settings. The block interval and nominal duration only feed
/// display estimates; they are not protocol invariants.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub contract: Address,
    pub block_interval: Duration,
    pub nominal_duration_blocks: u64,
    pub poll_interval: Duration,
    pub call_timeout: Duration,
    pub init_timeout: Duration,
    pub confirmation_timeout: Duration,
    pub bid_gas_limit: Option<u64>,
    pub finalize_gas_limit: Option<u64>,
    pub domain: SigningDomain,
    pub gateway_url: Option<String>,
    pub switch_network: bool,
}

impl NetworkConfig {
    pub fn sepolia(contract: Address) -> Self {
        Self {
            chain_id: SEPOLIA_CHAIN_ID,
            contract,
            block_interval: Duration::from_secs(12),
            nominal_duration_blocks: 7_200,
            poll_interval: POLL_INTERVAL,
            call_timeout: CALL_TIMEOUT,
            init_timeout: INIT_TIMEOUT,
            confirmation_timeout: CONFIRMATION_TIMEOUT,
            bid_gas_limit: Some(BID_GAS_LIMIT),
            finalize_gas_limit: Some(FINALIZE_GAS_LIMIT),
            domain: SigningDomain::default(),
            gateway_url: Some("https://gateway.sepolia.zama.ai/".to_string()),
            switch_network: true,
        }
    }

    pub fn timing(&self) -> BlockTiming {
        BlockTiming {
            block_interval: self.block_interval,
            nominal_duration_blocks: self.nominal_duration_blocks,
        }
    }

    pub fn signing_domain(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(self.domain.name.clone().into()),
            Some(self.domain.version.clone().into()),
            Some(U256::from(self.chain_id)),
            Some(self.contract),
            None,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTiming {
    pub block_interval: Duration,
    pub nominal_duration_blocks: u64,
}
