use std::{collections::VecDeque, sync::Arc, time::SystemTime};

use alloy::primitives::B256;
use parking_lot::Mutex;
use tracing::{error, info};

pub const ACTIVITY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineEvent {
    pub at: SystemTime,
    pub level: EventLevel,
    pub message: String,
    pub tx_hash: Option<B256>,
}

/// Bounded FIFO of user-visible events, oldest dropped first.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Arc<Mutex<VecDeque<PipelineEvent>>>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(ACTIVITY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, level: EventLevel, message: impl Into<String>, tx_hash: Option<B256>) {
        let message = message.into();
        match level {
            EventLevel::Error => error!(tx = ?tx_hash, "{message}"),
            EventLevel::Pending => info!(tx = ?tx_hash, pending = true, "{message}"),
            EventLevel::Info | EventLevel::Success => info!(tx = ?tx_hash, "{message}"),
        }

        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(PipelineEvent {
            at: SystemTime::now(),
            level,
            message,
            tx_hash,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.record(EventLevel::Info, message, None);
    }

    pub fn pending(&self, message: impl Into<String>, tx_hash: Option<B256>) {
        self.record(EventLevel::Pending, message, tx_hash);
    }

    pub fn success(&self, message: impl Into<String>, tx_hash: Option<B256>) {
        self.record(EventLevel::Success, message, tx_hash);
    }

    pub fn error(&self, message: impl Into<String>, tx_hash: Option<B256>) {
        self.record(EventLevel::Error, message, tx_hash);
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<PipelineEvent> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn count(&self, level: EventLevel) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .count()
    }
}
