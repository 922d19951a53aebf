//! Per-user processing: resolve membership, fetch profile, diff, dispatch.
//!
//! Steps for one user are strictly sequential; isolation is per user. A
//! failure here is logged under the attempt's correlation id and recorded as
//! a terminal outcome — it never takes down sibling workers.

use std::sync::Arc;
use std::time::Instant;

use log::debug;
use log::error;
use log::info;
use tokio::sync::Mutex;
use tokio::sync::mpsc::Receiver;
use uuid::Uuid;

use crate::bungie::error::BungieError;
use crate::catalog::diff;
use crate::model::User;
use crate::notify::dispatcher::DispatchResult;
use crate::pipeline::WorkerContext;

/// Terminal outcome of one user's processing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOutcome {
    Processed {
        missing_count: usize,
        dispatch: DispatchResult,
    },
    /// No linked membership: zero external calls, no notification.
    Skipped,
    Failed {
        reason: String,
    },
}

/// Worker loop: drain the shared queue until it is closed and empty.
pub async fn run_worker(
    ctx: Arc<WorkerContext>,
    queue: Arc<Mutex<Receiver<User>>>,
    worker_id: usize,
) {
    debug!("worker {} started", worker_id);
    loop {
        let user = { queue.lock().await.recv().await };
        let Some(user) = user else {
            break;
        };
        let outcome = process_user(&ctx, &user).await;
        ctx.counters.record(&outcome);
    }
    debug!("worker {} drained", worker_id);
}

pub async fn process_user(ctx: &WorkerContext, user: &User) -> UserOutcome {
    let request_id = Uuid::new_v4();
    let start = Instant::now();

    let Some(membership_key) = user.membership_key() else {
        info!(
            "(Request ID: {}) User has not linked Bungie account, skipping user: {}",
            request_id, user.discord_id
        );
        return UserOutcome::Skipped;
    };

    let missing_items = match lookup_missing_items(ctx, membership_key, &request_id).await {
        Ok(items) => items,
        Err(e) => {
            error!(
                "(Request ID: {}) Error processing user {}: {}",
                request_id, user.discord_id, e
            );
            return UserOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    if missing_items.is_empty() {
        info!(
            "(Request ID: {}) User has no missing shaders available from Ada-1",
            request_id
        );
    } else {
        info!(
            "(Request ID: {}) User has missing shaders available from Ada-1: {}",
            request_id,
            missing_items.join(", ")
        );
    }

    let dispatch = ctx.dispatcher.dispatch(user, &missing_items, &request_id).await;

    info!(
        "(Request ID: {}) Finished in {:.0?}",
        request_id,
        start.elapsed()
    );
    UserOutcome::Processed {
        missing_count: missing_items.len(),
        dispatch,
    }
}

async fn lookup_missing_items(
    ctx: &WorkerContext,
    membership_key: u64,
    request_id: &Uuid,
) -> Result<Vec<String>, BungieError> {
    let step = Instant::now();
    let (destiny_membership_id, membership_type) =
        ctx.bungie.resolve_membership(membership_key).await?;
    debug!(
        "(Request ID: {}) Getting Bungie membership data took {:.0?}",
        request_id,
        step.elapsed()
    );

    let step = Instant::now();
    let profile = ctx
        .bungie
        .fetch_profile(&destiny_membership_id, membership_type)
        .await?;
    debug!(
        "(Request ID: {}) Getting Bungie profile took {:.0?}",
        request_id,
        step.elapsed()
    );

    let step = Instant::now();
    let missing_ids = diff::missing_collectibles(&profile, &ctx.catalogs.master);
    let missing_items = diff::missing_vendor_items(&missing_ids, &ctx.catalogs.vendor);
    debug!(
        "(Request ID: {}) Checking missing shaders took {:.0?}",
        request_id,
        step.elapsed()
    );

    Ok(missing_items)
}
