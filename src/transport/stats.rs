// Lock-free transport statistics using atomic operations

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportStatsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub transport_errors: u64,
    pub timeouts: u64,
    pub downgrades: u64,
    pub bytes_sent: u64,
    pub average_response_time: Duration,
}

#[derive(Debug, Default)]
pub struct TransportStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    transport_errors: AtomicU64,
    timeouts: AtomicU64,
    downgrades: AtomicU64,
    bytes_sent: AtomicU64,
    total_response_time: AtomicU64,
}

impl TransportStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request that got an HTTP status back
    pub fn record_response(&self, success: bool, bytes: usize, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
        self.total_response_time
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a request that never got a status
    pub fn record_transport_error(&self, timeout: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
        if timeout {
            self.timeouts.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_downgrade(&self) {
        self.downgrades.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TransportStatsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let transport_errors = self.transport_errors.load(Ordering::Relaxed);
        let answered = total_requests.saturating_sub(transport_errors);
        let total_response_time = self.total_response_time.load(Ordering::Relaxed);

        let average_response_time = if answered > 0 {
            Duration::from_millis(total_response_time / answered)
        } else {
            Duration::ZERO
        };

        TransportStatsSnapshot {
            total_requests,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            transport_errors,
            timeouts: self.timeouts.load(Ordering::Relaxed),
            downgrades: self.downgrades.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            average_response_time,
        }
    }
}
