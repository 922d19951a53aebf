//! Multicast push transport keyed by a user's device tokens.

use async_trait::async_trait;
use log::info;
use serde_json::json;

use crate::model::User;
use crate::notify::Notifier;
use crate::notify::error::NotifyError;

const NOTIFICATION_TITLE: &str = "DestinyModsNotifier";

pub struct PushNotifier {
    client: reqwest::Client,
    pub gateway_url: String,
    server_key: String,
}

impl PushNotifier {
    pub fn new(gateway_url: String, server_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
            server_key,
        }
    }
}

#[async_trait]
impl Notifier for PushNotifier {
    async fn send(&self, user: &User, body: &str) -> Result<(), NotifyError> {
        if user.fcm_tokens.is_empty() {
            info!("user {} has no push tokens, ignoring user", user.discord_id);
            return Ok(());
        }

        let payload = json!({
            "registration_ids": user.fcm_tokens,
            "notification": {
                "title": NOTIFICATION_TITLE,
                "body": body,
            },
        });

        let resp = self
            .client
            .post(&self.gateway_url)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::DeliveryFailed {
                user_id: user.discord_id,
                msg: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(NotifyError::DeliveryFailed {
                user_id: user.discord_id,
                msg: format!("status {}", resp.status()),
            });
        }

        Ok(())
    }
}
