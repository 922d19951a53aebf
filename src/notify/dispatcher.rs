//! Per-user dispatch glue: builds the message, honors the global kill
//! switch, and keeps delivery failures non-fatal for the run.

use std::sync::Arc;

use log::error;
use log::info;
use uuid::Uuid;

use crate::model::User;
use crate::notify::Notifier;
use crate::notify::message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    Sent,
    /// The kill switch is off; nothing was sent.
    Suppressed,
    /// Delivery failed; already logged, never aborts the run.
    Failed,
}

pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    send_messages: bool,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, send_messages: bool) -> Self {
        Self {
            notifier,
            send_messages,
        }
    }

    pub async fn dispatch(
        &self,
        user: &User,
        missing_items: &[String],
        request_id: &Uuid,
    ) -> DispatchResult {
        let body = message::build_message(missing_items);

        if !self.send_messages {
            info!(
                "(Request ID: {}) Messaging disabled, skipped sending message to user {}",
                request_id, user.discord_id
            );
            return DispatchResult::Suppressed;
        }

        match self.notifier.send(user, &body).await {
            Ok(()) => {
                info!(
                    "(Request ID: {}) Successfully sent message to user {}",
                    request_id, user.discord_id
                );
                DispatchResult::Sent
            }
            Err(e) => {
                error!("(Request ID: {}) {}", request_id, e);
                DispatchResult::Failed
            }
        }
    }
}
