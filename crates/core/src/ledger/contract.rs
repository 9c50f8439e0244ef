use alloy::{
    consensus::TxReceipt,
    primitives::{Address, B256},
    providers::{PendingTransactionBuilder, Provider},
};
use async_trait::async_trait;
use sealbid_abi::ISealedBidAuction;

use crate::{
    error::{LedgerError, WriteError},
    types::{
        primitives::{BlockNumber, Round, Wei},
        snapshot::{AdminInfo, AuctionFacts, non_zero, non_zero_timestamp},
    },
};

use super::{BidderFacts, LedgerCall, LedgerReader, LedgerWriter};

#[derive(Clone)]
pub struct ContractReader<P>
where
    P: Provider + Clone,
{
    provider: P,
    contract: Address,
}

impl<P> ContractReader<P>
where
    P: Provider + Clone,
{
    pub fn new(provider: P, contract: Address) -> Self {
        Self { provider, contract }
    }

    pub fn address(&self) -> Address {
        self.contract
    }
}

#[async_trait]
impl<P> LedgerReader for ContractReader<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    async fn auction_facts(&self) -> Result<AuctionFacts, LedgerError> {
        let auction = ISealedBidAuction::new(self.contract, &self.provider);
        let info = auction.getAuctionInfo().call().await?;

        Ok(AuctionFacts {
            round: Round::new(info.round.saturating_to()),
            end_block: BlockNumber::new(info.endBlock.saturating_to()),
            phase_ordinal: u64::from(info.state),
            max_deposit: Wei::new(info.maxDeposit),
            leading_bidder: non_zero(info.leadBidder),
            valid_bidders: info.validBidders.saturating_to(),
        })
    }

    async fn block_number(&self) -> Result<BlockNumber, LedgerError> {
        Ok(BlockNumber::new(self.provider.get_block_number().await?))
    }

    async fn estimated_end_time(&self) -> Result<Option<u64>, LedgerError> {
        let auction = ISealedBidAuction::new(self.contract, &self.provider);
        let end = auction.getEstimatedEndTime().call().await?;
        Ok(non_zero_timestamp(end))
    }

    async fn min_bid_deposit(&self) -> Result<Wei, LedgerError> {
        let auction = ISealedBidAuction::new(self.contract, &self.provider);
        Ok(Wei::new(auction.minBidDeposit().call().await?))
    }

    async fn bidder_facts(&self, account: Address) -> Result<BidderFacts, LedgerError> {
        let auction = ISealedBidAuction::new(self.contract, &self.provider);
        let info = auction.getBidderInfo(account).call().await?;

        Ok(BidderFacts {
            deposit: Wei::new(info.deposit),
            has_bid: info.hasBidded,
            cancelled: info.cancelled,
        })
    }

    async fn pending_refund(&self, account: Address) -> Result<Wei, LedgerError> {
        let auction = ISealedBidAuction::new(self.contract, &self.provider);
        Ok(Wei::new(auction.pendingRefunds(account).call().await?))
    }

    async fn round_bidders(&self) -> Result<Vec<Address>, LedgerError> {
        let auction = ISealedBidAuction::new(self.contract, &self.provider);
        Ok(auction.getRoundBidders().call().await?)
    }

    async fn admin_info(&self) -> Result<AdminInfo, LedgerError> {
        let auction = ISealedBidAuction::new(self.contract, &self.provider);

        let paused = auction.paused();
        let owner = auction.owner();
        let beneficiary = auction.beneficiary();
        let fee_collector = auction.feeCollector();
        let fees = auction.totalCollectedFees();

        let (paused, owner, beneficiary, fee_collector, fees) = futures::try_join!(
            async { paused.call().await },
            async { owner.call().await },
            async { beneficiary.call().await },
            async { fee_collector.call().await },
            async { fees.call().await },
        )?;

        Ok(AdminInfo {
            paused,
            owner,
            beneficiary,
            fee_collector,
            collected_fees: Wei::new(fees),
        })
    }
}

#[derive(Clone)]
pub struct ContractWriter<P>
where
    P: Provider + Clone,
{
    provider: P,
    contract: Address,
    bid_gas_limit: Option<u64>,
    finalize_gas_limit: Option<u64>,
    confirmations: u64,
}

impl<P> ContractWriter<P>
where
    P: Provider + Clone,
{
    pub fn new(provider: P, contract: Address) -> Self {
        Self {
            provider,
            contract,
            bid_gas_limit: None,
            finalize_gas_limit: None,
            confirmations: 1,
        }
    }

    pub fn with_gas_limits(mut self, bid: Option<u64>, finalize: Option<u64>) -> Self {
        self.bid_gas_limit = bid;
        self.finalize_gas_limit = finalize;
        self
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }
}

#[async_trait]
impl<P> LedgerWriter for ContractWriter<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    async fn send(&self, call: LedgerCall) -> Result<B256, WriteError> {
        let auction = ISealedBidAuction::new(self.contract, &self.provider);

        let pending = match call {
            LedgerCall::SubmitBid { payload, value } => {
                let mut builder = auction
                    .bid(
                        payload.handle.as_b256(),
                        payload.proof,
                        payload.commitment,
                        payload.signature,
                    )
                    .value(value.as_u256());
                if let Some(gas) = self.bid_gas_limit {
                    builder = builder.gas(gas);
                }
                builder.send().await?
            }
            LedgerCall::CancelBid => auction.cancelBid().send().await?,
            LedgerCall::ClaimRefund => auction.claimRefund().send().await?,
            LedgerCall::RequestFinalize => {
                let mut builder = auction.requestFinalize();
                if let Some(gas) = self.finalize_gas_limit {
                    builder = builder.gas(gas);
                }
                builder.send().await?
            }
            LedgerCall::Pause => auction.pauseAuction().send().await?,
            LedgerCall::Unpause => auction.unpauseAuction().send().await?,
            LedgerCall::UpdateBeneficiary(to) => auction.updateBeneficiary(to).send().await?,
            LedgerCall::UpdateFeeCollector(to) => auction.updateFeeCollector(to).send().await?,
            LedgerCall::TransferOwnership(to) => auction.transferOwnership(to).send().await?,
            LedgerCall::WithdrawFees => auction.withdrawPlatformFees().send().await?,
        };

        Ok(*pending.tx_hash())
    }

    async fn confirm(&self, tx_hash: B256) -> Result<(), WriteError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await?;

        let Some(body) = receipt.inner.as_receipt() else {
            return Err(WriteError::MissingReceipt);
        };
        if !body.status() {
            return Err(WriteError::Reverted {
                tx_hash: receipt.transaction_hash,
            });
        }

        Ok(())
    }
}
