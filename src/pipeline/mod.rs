use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

pub mod error;
pub mod orchestrator;
pub mod worker;

pub use orchestrator::Pipeline;

use crate::bungie::BungieClient;
use crate::catalog::Catalogs;
use crate::notify::dispatcher::DispatchResult;
use crate::notify::dispatcher::Dispatcher;
use crate::pipeline::worker::UserOutcome;

/// Everything a worker needs for one run, owned for the run's lifetime and
/// shared read-only (the counters are the one write surface).
pub struct WorkerContext {
    pub bungie: Arc<BungieClient>,
    pub catalogs: Arc<Catalogs>,
    pub dispatcher: Arc<Dispatcher>,
    pub counters: Arc<RunCounters>,
}

/// Run-level counters incremented by many workers. `processed` counts every
/// terminal outcome (success, skip, or reported failure), so at run end it
/// equals the roster size unless a run-level error aborted the scan.
#[derive(Default)]
pub struct RunCounters {
    total: AtomicU64,
    processed: AtomicU64,
    succeeded: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    notified: AtomicU64,
}

impl RunCounters {
    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
    }

    pub fn record(&self, outcome: &UserOutcome) {
        self.processed.fetch_add(1, Ordering::SeqCst);
        match outcome {
            UserOutcome::Processed { dispatch, .. } => {
                self.succeeded.fetch_add(1, Ordering::SeqCst);
                if *dispatch == DispatchResult::Sent {
                    self.notified.fetch_add(1, Ordering::SeqCst);
                }
            }
            UserOutcome::Skipped => {
                self.skipped.fetch_add(1, Ordering::SeqCst);
            }
            UserOutcome::Failed { .. } => {
                self.failed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn notified(&self) -> u64 {
        self.notified.load(Ordering::SeqCst)
    }
}
