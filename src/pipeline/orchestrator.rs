//! Run orchestration: bounded fan-out over the roster with run telemetry.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use log::debug;
use log::error;
use log::info;
use log::warn;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::model::RunTelemetry;
use crate::model::User;
use crate::pipeline::WorkerContext;
use crate::pipeline::error::PipelineError;
use crate::pipeline::worker;
use crate::store::RosterStore;
use crate::store::TelemetryStore;

/// Phases of one run, in order. `Completed` is terminal; the telemetry
/// flush happens exactly once on the final exit path, whether or not the
/// phases before it succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Starting,
    Scanning,
    Dispatching,
    Draining,
    Completed,
}

/// Final numbers for one run, mirrored into the telemetry store.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub total_users: u64,
    pub processed_users: u64,
    pub skipped_users: u64,
    pub failed_users: u64,
    pub notified_users: u64,
    pub execution_time: f64,
}

pub struct Pipeline {
    worker_count: usize,
    run_deadline: Duration,
    roster: Arc<dyn RosterStore>,
    telemetry: Arc<dyn TelemetryStore>,
    ctx: Arc<WorkerContext>,
}

impl Pipeline {
    pub fn new(
        worker_count: usize,
        run_deadline: Duration,
        roster: Arc<dyn RosterStore>,
        telemetry: Arc<dyn TelemetryStore>,
        ctx: Arc<WorkerContext>,
    ) -> Self {
        Self {
            worker_count: worker_count.max(1),
            run_deadline,
            roster,
            telemetry,
            ctx,
        }
    }

    /// Drives the whole run to completion. Every roster user is handed to
    /// exactly one worker, and the call does not return until the queue is
    /// drained, the deadline expires, or the scan fails. Telemetry is
    /// written at start (partial) and once at the end (complete) on every
    /// exit path.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4().to_string();
        let clock = Instant::now();
        self.enter(RunPhase::Starting, &run_id);
        info!(
            "starting run {} with {} workers",
            run_id, self.worker_count
        );

        let partial = RunTelemetry::started(run_id.clone(), Utc::now(), self.worker_count as u32);
        if let Err(e) = self.telemetry.insert_run(&partial).await {
            warn!("error creating run telemetry record: {}", e);
        }

        let outcome = self.execute(&run_id).await;

        self.enter(RunPhase::Completed, &run_id);
        let report = self.build_report(&run_id, clock);
        self.log_summary(&report);
        let completed = RunTelemetry::completed(
            run_id.clone(),
            report.total_users,
            report.processed_users,
            report.execution_time,
        );
        if let Err(e) = self.telemetry.update_run(&completed).await {
            warn!("error updating run telemetry: {}", e);
        }

        outcome.map(|()| report)
    }

    async fn execute(&self, run_id: &str) -> Result<(), PipelineError> {
        self.enter(RunPhase::Scanning, run_id);
        let users = self.roster.all_users().await?;
        self.ctx.counters.set_total(users.len() as u64);

        // Queue capacity equals the roster size, so the whole scan is
        // enqueued before any worker starts and the sender can be dropped
        // (closing the queue) with no items outstanding.
        let (tx, rx) = mpsc::channel::<User>(users.len().max(1));
        for user in users {
            if tx.send(user).await.is_err() {
                break;
            }
        }
        drop(tx);

        self.enter(RunPhase::Dispatching, run_id);
        let queue = Arc::new(Mutex::new(rx));
        let mut handles = Vec::with_capacity(self.worker_count);
        for worker_id in 1..=self.worker_count {
            handles.push(tokio::spawn(worker::run_worker(
                self.ctx.clone(),
                queue.clone(),
                worker_id,
            )));
        }

        self.enter(RunPhase::Draining, run_id);
        match tokio::time::timeout(self.run_deadline, join_all(handles.iter_mut())).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        error!("worker task aborted: {}", e);
                    }
                }
                Ok(())
            }
            Err(_) => {
                // Workers past the deadline are cancelled outright; whatever
                // they processed so far is already in the counters.
                for handle in &handles {
                    handle.abort();
                }
                Err(PipelineError::DeadlineExceeded(self.run_deadline))
            }
        }
    }

    fn enter(&self, phase: RunPhase, run_id: &str) {
        debug!("run {} entering {:?} phase", run_id, phase);
    }

    fn build_report(&self, run_id: &str, clock: Instant) -> RunReport {
        let counters = &self.ctx.counters;
        RunReport {
            run_id: run_id.to_string(),
            total_users: counters.total(),
            processed_users: counters.processed(),
            skipped_users: counters.skipped(),
            failed_users: counters.failed(),
            notified_users: counters.notified(),
            execution_time: clock.elapsed().as_secs_f64(),
        }
    }

    fn log_summary(&self, report: &RunReport) {
        let rate = if report.processed_users > 0 {
            report.execution_time / report.processed_users as f64
        } else {
            0.0
        };
        info!(
            "\n========\nExecution time: {:.2}s\nTotal users: {}\nProcessed users: {}\nSkipped: {} Failed: {} Notified: {}\nProcessing rate: {:.2}s per user\n========",
            report.execution_time,
            report.total_users,
            report.processed_users,
            report.skipped_users,
            report.failed_users,
            report.notified_users,
            rate
        );
    }
}
