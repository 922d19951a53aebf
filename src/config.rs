//! Run configuration resolved from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Notification transport selected for this run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotifyChannel {
    #[default]
    Discord,
    Push,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Number of concurrent consumer workers (min 1).
    pub worker_count: usize,
    /// Shared request budget against the Bungie API, in requests per second.
    pub rate_limit_per_sec: u32,
    /// Hard ceiling on the whole run, so a stuck upstream cannot hang the job.
    pub run_deadline: Duration,
    /// Global kill switch. When false the dispatcher logs and skips every send.
    pub send_messages: bool,
    pub notify_channel: NotifyChannel,
    pub bungie_api_url: String,
    pub bungie_api_key: String,
    pub discord_api_url: String,
    pub discord_bot_token: String,
    pub push_gateway_url: String,
    pub push_server_key: String,
    pub storage_base_url: String,
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub logs_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let notify_channel = match std::env::var("NOTIFY_CHANNEL")
            .unwrap_or("discord".to_string())
            .to_lowercase()
            .as_str()
        {
            "discord" => NotifyChannel::Discord,
            "push" => NotifyChannel::Push,
            other => {
                return Err(AppError::InvalidConfig {
                    key: "NOTIFY_CHANNEL".to_string(),
                    value: other.to_string(),
                });
            }
        };

        let config = Self {
            worker_count: parse_or("WORKER_COUNT", 4)?.max(1),
            rate_limit_per_sec: parse_or("RATE_LIMIT_PER_SEC", 25)?.max(1),
            run_deadline: Duration::from_secs(parse_or("RUN_DEADLINE_SECS", 900)?),
            send_messages: std::env::var("SEND_MESSAGES").unwrap_or_default() == "true",
            notify_channel,
            bungie_api_url: std::env::var("BUNGIE_API_URL")
                .unwrap_or("https://www.bungie.net/Platform".to_string()),
            bungie_api_key: required("BUNGIE_API_KEY")?,
            discord_api_url: std::env::var("DISCORD_API_URL")
                .unwrap_or("https://discord.com/api/v10".to_string()),
            discord_bot_token: std::env::var("DISCORD_BOT_TOKEN").unwrap_or_default(),
            push_gateway_url: std::env::var("PUSH_GATEWAY_URL").unwrap_or_default(),
            push_server_key: std::env::var("PUSH_SERVER_KEY").unwrap_or_default(),
            storage_base_url: required("STORAGE_BASE_URL")?,
            supabase_url: required("SUPABASE_URL")?,
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            logs_path: PathBuf::from(std::env::var("LOGS_PATH").unwrap_or("logs".to_string())),
        };

        config.validate_channel()?;
        Ok(config)
    }

    /// The selected transport must have its credentials present when the
    /// kill switch is on. With sending disabled the run can go without them.
    fn validate_channel(&self) -> Result<(), AppError> {
        if !self.send_messages {
            return Ok(());
        }
        match self.notify_channel {
            NotifyChannel::Discord if self.discord_bot_token.is_empty() => {
                Err(AppError::MissingConfig {
                    key: "DISCORD_BOT_TOKEN".to_string(),
                })
            }
            NotifyChannel::Push if self.push_gateway_url.is_empty() => {
                Err(AppError::MissingConfig {
                    key: "PUSH_GATEWAY_URL".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

fn required(key: &str) -> Result<String, AppError> {
    std::env::var(key).map_err(|_| AppError::MissingConfig {
        key: key.to_string(),
    })
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|_| AppError::InvalidConfig {
            key: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_KEYS: &[&str] = &[
        "WORKER_COUNT",
        "RATE_LIMIT_PER_SEC",
        "RUN_DEADLINE_SECS",
        "SEND_MESSAGES",
        "NOTIFY_CHANNEL",
        "BUNGIE_API_URL",
        "BUNGIE_API_KEY",
        "DISCORD_API_URL",
        "DISCORD_BOT_TOKEN",
        "PUSH_GATEWAY_URL",
        "PUSH_SERVER_KEY",
        "STORAGE_BASE_URL",
        "SUPABASE_URL",
        "SUPABASE_SERVICE_ROLE_KEY",
        "LOGS_PATH",
    ];

    fn reset_env() {
        unsafe {
            for key in ALL_KEYS {
                std::env::remove_var(key);
            }
            std::env::set_var("BUNGIE_API_KEY", "test-key");
            std::env::set_var("STORAGE_BASE_URL", "http://storage.local");
            std::env::set_var("SUPABASE_URL", "http://supabase.local");
            std::env::set_var("SUPABASE_SERVICE_ROLE_KEY", "service-role");
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        reset_env();
        let config = Config::load().expect("load failed");
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.rate_limit_per_sec, 25);
        assert_eq!(config.run_deadline, Duration::from_secs(900));
        assert!(!config.send_messages);
        assert_eq!(config.notify_channel, NotifyChannel::Discord);
        assert_eq!(config.bungie_api_url, "https://www.bungie.net/Platform");
    }

    #[test]
    #[serial]
    fn test_missing_required_key_fails() {
        reset_env();
        unsafe {
            std::env::remove_var("BUNGIE_API_KEY");
        }
        let err = Config::load().unwrap_err();
        assert!(matches!(
            err,
            AppError::MissingConfig { key } if key == "BUNGIE_API_KEY"
        ));
    }

    #[test]
    #[serial]
    fn test_enabled_sending_requires_transport_credentials() {
        reset_env();
        unsafe {
            std::env::set_var("SEND_MESSAGES", "true");
        }
        let err = Config::load().unwrap_err();
        assert!(matches!(
            err,
            AppError::MissingConfig { key } if key == "DISCORD_BOT_TOKEN"
        ));

        unsafe {
            std::env::set_var("DISCORD_BOT_TOKEN", "bot-token");
        }
        assert!(Config::load().is_ok());
    }

    #[test]
    #[serial]
    fn test_invalid_numeric_value_fails() {
        reset_env();
        unsafe {
            std::env::set_var("WORKER_COUNT", "many");
        }
        let err = Config::load().unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidConfig { key, .. } if key == "WORKER_COUNT"
        ));
    }

    #[test]
    #[serial]
    fn test_unknown_notify_channel_fails() {
        reset_env();
        unsafe {
            std::env::set_var("NOTIFY_CHANNEL", "smoke-signal");
        }
        let err = Config::load().unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { .. }));
    }
}
