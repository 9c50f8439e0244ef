//! Pure mapping from raw auction facts to what an observer displays.
//!
//! Remaining time is an estimate: it multiplies the remaining block count by a
//! configured average block interval. Actual block production can be faster or
//! slower, so the countdown is never a guarantee of when the auction ends.

use std::{fmt, time::Duration};

use crate::{
    config::BlockTiming,
    types::{primitives::BlockNumber, snapshot::AuctionSnapshot},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuctionPhase {
    Active,
    Ended,
    Finalizing,
    Finalized,
    Emergency,
    Unknown,
}

impl AuctionPhase {
    pub fn from_ordinal(ordinal: u64) -> Self {
        match ordinal {
            0 => Self::Active,
            1 => Self::Ended,
            2 => Self::Finalizing,
            3 => Self::Finalized,
            4 => Self::Emergency,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Ended => "ENDED",
            Self::Finalizing => "FINALIZING",
            Self::Finalized => "FINALIZED",
            Self::Emergency => "EMERGENCY",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for AuctionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecryptionStatus {
    Idle,
    Processing,
    Completed,
}

impl From<AuctionPhase> for DecryptionStatus {
    fn from(phase: AuctionPhase) -> Self {
        match phase {
            AuctionPhase::Finalizing => Self::Processing,
            AuctionPhase::Finalized => Self::Completed,
            _ => Self::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseView {
    pub phase: AuctionPhase,
    pub blocks_remaining: u64,
    pub time_remaining: Duration,
    pub countdown: String,
    pub progress: f64,
    pub decryption: DecryptionStatus,
}

impl PhaseView {
    pub fn derive(snapshot: &AuctionSnapshot, timing: BlockTiming) -> Self {
        let blocks_remaining = blocks_remaining(snapshot.end_block, snapshot.current_block);
        let time_remaining = estimated_time_remaining(blocks_remaining, timing.block_interval);
        let nominal = timing.nominal_duration_blocks;

        Self {
            phase: snapshot.phase,
            blocks_remaining,
            time_remaining,
            countdown: format_countdown(time_remaining),
            progress: progress_percent(nominal, i128::from(blocks_remaining)),
            decryption: DecryptionStatus::from(snapshot.phase),
        }
    }
}

pub fn blocks_remaining(end_block: BlockNumber, current_block: BlockNumber) -> u64 {
    current_block.blocks_until(end_block)
}

pub fn estimated_time_remaining(blocks_remaining: u64, block_interval: Duration) -> Duration {
    Duration::from_secs(blocks_remaining.saturating_mul(block_interval.as_secs()))
}

/// `HH:MM:SS`, hours are not wrapped at 24.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    let (hours, minutes, seconds) = (secs / 3_600, secs % 3_600 / 60, secs % 60);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Share of the nominal duration already elapsed, clamped to `[0, 100]`.
pub fn progress_percent(nominal_duration_blocks: u64, blocks_remaining: i128) -> f64 {
    if nominal_duration_blocks == 0 {
        return 100.0;
    }
    let nominal = nominal_duration_blocks as f64;
    let elapsed = nominal - blocks_remaining as f64;
    (elapsed / nominal * 100.0).clamp(0.0, 100.0)
}
