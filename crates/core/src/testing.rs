//! In-memory stand-ins for the wallet, contract and encryption service.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy::{
    primitives::{Address, B256, Signature, U256},
    signers::{SignerSync, local::PrivateKeySigner},
    sol_types::{Eip712Domain, SolStruct},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use sealbid_abi::PublicKey;
use tokio::sync::{Notify, broadcast};

use crate::{
    config::NetworkConfig,
    encryption::{
        Encoded, EncryptedInput, EncryptedOutput, EncryptionBackend, EncryptionService,
        InstanceConfig,
    },
    error::{EncryptionError, LedgerError, WalletError, WriteError},
    ledger::{BidderFacts, LedgerCall, LedgerReader, LedgerWriter},
    types::{
        bid::BidPayload,
        primitives::{BlockNumber, Round, Wei},
        snapshot::{AdminInfo, AuctionFacts},
    },
    wallet::{Session, SessionManager, Wallet, WalletEvent},
};

pub async fn session_with(wallet: Arc<MockWallet>, config: &NetworkConfig) -> Session {
    SessionManager::new(Some(wallet), Arc::new(config.clone()))
        .connect()
        .await
        .expect("mock session connects")
}

/// Polls `condition` until it holds, failing the test after two seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition reached in time");
}

fn unavailable(what: &str) -> LedgerError {
    LedgerError::Unavailable(format!("{what} unavailable"))
}

pub struct MockReader {
    facts: Mutex<AuctionFacts>,
    block: AtomicU64,
    round_bidders: Mutex<Vec<Address>>,
    fail_core: AtomicBool,
    fail_aux: AtomicBool,
    fail_bidder: AtomicBool,
    fail_admin: AtomicBool,
    core_calls: AtomicUsize,
    bidder_calls: AtomicUsize,
}

impl Default for MockReader {
    fn default() -> Self {
        Self {
            facts: Mutex::new(Self::facts()),
            block: AtomicU64::new(940),
            round_bidders: Mutex::new(Vec::new()),
            fail_core: AtomicBool::new(false),
            fail_aux: AtomicBool::new(false),
            fail_bidder: AtomicBool::new(false),
            fail_admin: AtomicBool::new(false),
            core_calls: AtomicUsize::new(0),
            bidder_calls: AtomicUsize::new(0),
        }
    }
}

impl MockReader {
    pub const MIN_DEPOSIT: Wei = Wei::new(U256::from_limbs([50_000_000, 0, 0, 0]));

    /// Active round 1 ending at block 1000.
    pub fn facts() -> AuctionFacts {
        AuctionFacts {
            round: Round::new(1),
            end_block: BlockNumber::new(1_000),
            phase_ordinal: 0,
            max_deposit: Wei::ZERO,
            leading_bidder: None,
            valid_bidders: 0,
        }
    }

    pub fn set_block(&self, block: u64) {
        self.block.store(block, Ordering::SeqCst);
    }

    pub fn set_round_bidders(&self, bidders: Vec<Address>) {
        *self.round_bidders.lock() = bidders;
    }

    pub fn set_fail_core(&self, fail: bool) {
        self.fail_core.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_aux(&self, fail: bool) {
        self.fail_aux.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_bidder(&self, fail: bool) {
        self.fail_bidder.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_admin(&self, fail: bool) {
        self.fail_admin.store(fail, Ordering::SeqCst);
    }

    pub fn core_calls(&self) -> usize {
        self.core_calls.load(Ordering::SeqCst)
    }

    pub fn bidder_calls(&self) -> usize {
        self.bidder_calls.load(Ordering::SeqCst)
    }

    fn failing(flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerReader for MockReader {
    async fn auction_facts(&self) -> Result<AuctionFacts, LedgerError> {
        self.core_calls.fetch_add(1, Ordering::SeqCst);
        if Self::failing(&self.fail_core) {
            return Err(unavailable("auction info"));
        }
        Ok(self.facts.lock().clone())
    }

    async fn block_number(&self) -> Result<BlockNumber, LedgerError> {
        if Self::failing(&self.fail_core) {
            return Err(unavailable("block number"));
        }
        Ok(BlockNumber::new(self.block.load(Ordering::SeqCst)))
    }

    async fn estimated_end_time(&self) -> Result<Option<u64>, LedgerError> {
        if Self::failing(&self.fail_aux) {
            return Err(unavailable("estimated end"));
        }
        Ok(Some(1_700_000_000))
    }

    async fn min_bid_deposit(&self) -> Result<Wei, LedgerError> {
        if Self::failing(&self.fail_aux) {
            return Err(unavailable("min deposit"));
        }
        Ok(Self::MIN_DEPOSIT)
    }

    async fn bidder_facts(&self, _account: Address) -> Result<BidderFacts, LedgerError> {
        self.bidder_calls.fetch_add(1, Ordering::SeqCst);
        if Self::failing(&self.fail_bidder) {
            return Err(unavailable("bidder info"));
        }
        Ok(BidderFacts {
            deposit: Self::MIN_DEPOSIT,
            has_bid: true,
            cancelled: false,
        })
    }

    async fn pending_refund(&self, _account: Address) -> Result<Wei, LedgerError> {
        self.bidder_calls.fetch_add(1, Ordering::SeqCst);
        if Self::failing(&self.fail_bidder) {
            return Err(unavailable("pending refund"));
        }
        Ok(Wei::ZERO)
    }

    async fn round_bidders(&self) -> Result<Vec<Address>, LedgerError> {
        self.bidder_calls.fetch_add(1, Ordering::SeqCst);
        if Self::failing(&self.fail_bidder) {
            return Err(unavailable("round bidders"));
        }
        Ok(self.round_bidders.lock().clone())
    }

    async fn admin_info(&self) -> Result<AdminInfo, LedgerError> {
        if Self::failing(&self.fail_admin) {
            return Err(unavailable("admin info"));
        }
        Ok(AdminInfo {
            paused: false,
            owner: Address::repeat_byte(0x0f),
            beneficiary: Address::repeat_byte(0x0f),
            fee_collector: Address::repeat_byte(0x0f),
            collected_fees: Wei::ZERO,
        })
    }
}

#[derive(Default)]
pub struct MockWriter {
    calls: Mutex<Vec<String>>,
    bid: Mutex<Option<(BidPayload, Wei)>>,
    rejection: Mutex<Option<String>>,
    revert: AtomicBool,
    confirms: AtomicUsize,
}

impl MockWriter {
    pub const TX_HASH: B256 = B256::repeat_byte(0xee);

    pub fn reject_with(&self, reason: &str) {
        *self.rejection.lock() = Some(reason.to_string());
    }

    pub fn revert_on_confirm(&self) {
        self.revert.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn send_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn confirm_count(&self) -> usize {
        self.confirms.load(Ordering::SeqCst)
    }

    pub fn take_bid(&self) -> Option<(BidPayload, Wei)> {
        self.bid.lock().take()
    }
}

#[async_trait]
impl LedgerWriter for MockWriter {
    async fn send(&self, call: LedgerCall) -> Result<B256, WriteError> {
        self.calls.lock().push(call.to_string());
        if let Some(reason) = self.rejection.lock().clone() {
            return Err(WriteError::Rejected { reason });
        }
        if let LedgerCall::SubmitBid { payload, value } = call {
            *self.bid.lock() = Some((payload, value));
        }
        Ok(Self::TX_HASH)
    }

    async fn confirm(&self, tx_hash: B256) -> Result<(), WriteError> {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        if self.revert.load(Ordering::SeqCst) {
            return Err(WriteError::Reverted { tx_hash });
        }
        Ok(())
    }
}

pub struct MockWallet {
    signer: PrivateKeySigner,
    chain_id: AtomicU64,
    reject_switch: bool,
    decline_signatures: bool,
    switch_requests: AtomicUsize,
    signature_requests: AtomicUsize,
    events: broadcast::Sender<WalletEvent>,
    writer: Arc<MockWriter>,
}

impl MockWallet {
    pub fn new(chain_id: u64) -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            signer: PrivateKeySigner::random(),
            chain_id: AtomicU64::new(chain_id),
            reject_switch: false,
            decline_signatures: false,
            switch_requests: AtomicUsize::new(0),
            signature_requests: AtomicUsize::new(0),
            events,
            writer: Arc::new(MockWriter::default()),
        }
    }

    pub fn rejecting_switch(mut self) -> Self {
        self.reject_switch = true;
        self
    }

    pub fn declining_signatures(mut self) -> Self {
        self.decline_signatures = true;
        self
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn writer(&self) -> Arc<MockWriter> {
        self.writer.clone()
    }

    pub fn switch_requests(&self) -> usize {
        self.switch_requests.load(Ordering::SeqCst)
    }

    pub fn signature_requests(&self) -> usize {
        self.signature_requests.load(Ordering::SeqCst)
    }

    pub fn emit(&self, event: WalletEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.signer.address()])
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.switch_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_switch {
            return Err(WalletError::Rejected("user rejected the request".into()));
        }
        self.chain_id.store(chain_id, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_typed_data(
        &self,
        _account: Address,
        domain: &Eip712Domain,
        binding: &PublicKey,
    ) -> Result<Signature, WalletError> {
        self.signature_requests.fetch_add(1, Ordering::SeqCst);
        if self.decline_signatures {
            return Err(WalletError::Rejected("user denied signature".into()));
        }
        let hash = binding.eip712_signing_hash(domain);
        Ok(self.signer.sign_hash_sync(&hash)?)
    }

    fn ledger_writer(&self, _account: Address, _config: &NetworkConfig) -> Arc<dyn LedgerWriter> {
        self.writer.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

struct EncryptionState {
    public_key: Encoded,
    proof: Encoded,
    failing: bool,
    gate: Option<Arc<Notify>>,
    added: Vec<u64>,
    inputs: Vec<(Address, Address)>,
}

pub struct MockEncryption {
    state: Arc<Mutex<EncryptionState>>,
    public_key_requests: AtomicUsize,
}

impl Default for MockEncryption {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(EncryptionState {
                public_key: Encoded::Hex("0x".to_string() + &"ab".repeat(32)),
                proof: Encoded::Bytes(vec![0x01, 0x02, 0x03]),
                failing: false,
                gate: None,
                added: Vec::new(),
                inputs: Vec::new(),
            })),
            public_key_requests: AtomicUsize::new(0),
        }
    }
}

impl MockEncryption {
    pub const HANDLE: B256 = B256::repeat_byte(0xc1);

    pub fn with_hex_proof(self, proof: &str) -> Self {
        self.state.lock().proof = Encoded::Hex(proof.to_string());
        self
    }

    pub fn with_public_key(self, key: Encoded) -> Self {
        self.state.lock().public_key = key;
        self
    }

    pub fn failing(self) -> Self {
        self.state.lock().failing = true;
        self
    }

    /// Encryption waits for one `notify_one` on `gate` before completing.
    pub fn gated(self, gate: Arc<Notify>) -> Self {
        self.state.lock().gate = Some(gate);
        self
    }

    pub fn added_values(&self) -> Vec<u64> {
        self.state.lock().added.clone()
    }

    /// `(contract, account)` per created input.
    pub fn inputs_for(&self) -> Vec<(Address, Address)> {
        self.state.lock().inputs.clone()
    }

    pub fn input_count(&self) -> usize {
        self.state.lock().inputs.len()
    }

    pub fn public_key_requests(&self) -> usize {
        self.public_key_requests.load(Ordering::SeqCst)
    }
}

struct MockInput {
    state: Arc<Mutex<EncryptionState>>,
}

#[async_trait]
impl EncryptedInput for MockInput {
    fn add_u64(&mut self, value: u64) {
        self.state.lock().added.push(value);
    }

    async fn encrypt(self: Box<Self>) -> Result<EncryptedOutput, EncryptionError> {
        let gate = self.state.lock().gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let state = self.state.lock();
        if state.failing {
            return Err(EncryptionError::Service("relayer unreachable".into()));
        }
        Ok(EncryptedOutput {
            handles: vec![MockEncryption::HANDLE],
            proof: state.proof.clone(),
        })
    }
}

#[async_trait]
impl EncryptionService for MockEncryption {
    fn create_input(
        &self,
        contract: Address,
        account: Address,
    ) -> Result<Box<dyn EncryptedInput>, EncryptionError> {
        self.state.lock().inputs.push((contract, account));
        Ok(Box::new(MockInput {
            state: self.state.clone(),
        }))
    }

    async fn public_key(&self) -> Result<Encoded, EncryptionError> {
        self.public_key_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().public_key.clone())
    }
}

pub struct MockBackend {
    service: Arc<MockEncryption>,
    init_delay: Option<Duration>,
    fail_load: bool,
    instances: Mutex<Vec<InstanceConfig>>,
}

impl MockBackend {
    pub fn new(service: Arc<MockEncryption>) -> Self {
        Self {
            service,
            init_delay: None,
            fail_load: false,
            instances: Mutex::new(Vec::new()),
        }
    }

    pub fn hanging_init(mut self, delay: Duration) -> Self {
        self.init_delay = Some(delay);
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn instance_configs(&self) -> Vec<InstanceConfig> {
        self.instances.lock().clone()
    }
}

#[async_trait]
impl EncryptionBackend for MockBackend {
    async fn load(&self) -> Result<(), EncryptionError> {
        if self.fail_load {
            return Err(EncryptionError::Service("sdk bundle missing".into()));
        }
        Ok(())
    }

    async fn init(&self) -> Result<(), EncryptionError> {
        if let Some(delay) = self.init_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn create_instance(
        &self,
        config: &InstanceConfig,
    ) -> Result<Arc<dyn EncryptionService>, EncryptionError> {
        self.instances.lock().push(config.clone());
        Ok(self.service.clone())
    }
}
