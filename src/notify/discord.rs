//! Direct-message transport over the Discord REST API.

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::json;

use crate::model::User;
use crate::notify::Notifier;
use crate::notify::error::NotifyError;

#[derive(Debug, Deserialize)]
struct DmChannel {
    id: String,
}

pub struct DiscordDmNotifier {
    client: reqwest::Client,
    pub api_url: String,
    bot_token: String,
}

impl DiscordDmNotifier {
    pub fn new(api_url: String, bot_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            bot_token,
        }
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    /// Opens (or reuses, server-side) the DM channel for a recipient.
    async fn open_dm_channel(&self, user: &User) -> Result<DmChannel, NotifyError> {
        let resp = self
            .client
            .post(format!("{}/users/@me/channels", self.api_url))
            .header("Authorization", self.auth_header())
            .json(&json!({ "recipient_id": user.discord_id.to_string() }))
            .send()
            .await
            .map_err(|e| NotifyError::ChannelUnavailable {
                user_id: user.discord_id,
                msg: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(NotifyError::ChannelUnavailable {
                user_id: user.discord_id,
                msg: format!("status {}", resp.status()),
            });
        }

        resp.json::<DmChannel>()
            .await
            .map_err(|e| NotifyError::ChannelUnavailable {
                user_id: user.discord_id,
                msg: e.to_string(),
            })
    }
}

#[async_trait]
impl Notifier for DiscordDmNotifier {
    async fn send(&self, user: &User, body: &str) -> Result<(), NotifyError> {
        let channel = self.open_dm_channel(user).await?;
        debug!(
            "sending DM to user {} via channel {}",
            user.discord_id, channel.id
        );

        let resp = self
            .client
            .post(format!("{}/channels/{}/messages", self.api_url, channel.id))
            .header("Authorization", self.auth_header())
            .json(&json!({ "content": body }))
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
