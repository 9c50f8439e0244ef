use alloy::sol;

sol! {
    /// EIP-712 payload signed by the bidder. `key` holds the commitment
    /// `keccak256(ciphertextHandle ++ normalizedPublicKey)`, not the raw key.
    struct PublicKey {
        bytes32 key;
    }

    #[sol(rpc)]
    interface ISealedBidAuction {
        error AuctionNotActive();
        error AlreadyBid();
        error InsufficientDeposit();
        error InvalidSignature();
        error NotOwner();

        event BidPlaced(address indexed bidder, uint256 indexed round, uint256 deposit);
        event BidCancelled(address indexed bidder, uint256 indexed round);
        event RefundClaimed(address indexed bidder, uint256 amount);
        event FinalizeRequested(uint256 indexed round);

        // ---------- reads ----------

        function getAuctionInfo()
            external
            view
            returns (
                uint256 round,
                uint256 endBlock,
                uint8 state,
                uint256 maxDeposit,
                address leadBidder,
                uint256 validBidders
            );

        function getEstimatedEndTime() external view returns (uint256);
        function getBidderInfo(address bidder)
            external
            view
            returns (uint256 deposit, bool hasBidded, bool cancelled);
        function getRoundBidders() external view returns (address[] memory);
        function minBidDeposit() external view returns (uint256);
        function pendingRefunds(address bidder) external view returns (uint256);

        function paused() external view returns (bool);
        function owner() external view returns (address);
        function beneficiary() external view returns (address);
        function feeCollector() external view returns (address);
        function totalCollectedFees() external view returns (uint256);

        // ---------- writes ----------

        function bid(
            bytes32 encryptedBid,
            bytes calldata inputProof,
            bytes32 publicKey,
            bytes calldata signature
        ) external payable;

        function cancelBid() external;
        function claimRefund() external;
        function requestFinalize() external;

        function pauseAuction() external;
        function unpauseAuction() external;
        function updateBeneficiary(address newBeneficiary) external;
        function updateFeeCollector(address newFeeCollector) external;
        function transferOwnership(address newOwner) external;
        function withdrawPlatformFees() external;
    }
}
