pub mod discord;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod push;

use async_trait::async_trait;

use crate::model::User;
use crate::notify::error::NotifyError;

/// One message per user through whichever transport is configured.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, user: &User, body: &str) -> Result<(), NotifyError>;
}
