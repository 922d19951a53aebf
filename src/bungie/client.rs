//! Rate-limited client for the Bungie profile API.
//!
//! Every worker shares one client; the token bucket is the pipeline's
//! backpressure against the foreign rate limit, so it gates every request
//! regardless of how many workers are in flight.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::Quota;
use governor::RateLimiter;
use governor::clock::QuantaClock;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;
use log::debug;
use log::info;
use log::warn;
use serde::de::DeserializeOwned;

use crate::bungie::error::BungieError;
use crate::bungie::model::ApiResponse;
use crate::bungie::model::MembershipData;
use crate::bungie::model::ProfileSnapshot;

pub type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Profile components requested alongside a profile read: base profile data
/// and profile-level collectibles.
const PROFILE_COMPONENTS: &str = "100,800";

/// Bounded retry envelope for transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_wait: Duration::from_secs(5),
            max_wait: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry `attempt` (0-based): base doubling per attempt,
    /// capped at `max_wait`.
    fn wait_before(&self, attempt: u32) -> Duration {
        let wait = self.base_wait.saturating_mul(1 << attempt.min(16));
        wait.min(self.max_wait)
    }
}

pub struct BungieClient {
    client: reqwest::Client,
    limiter: Arc<DirectLimiter>,
    api_key: String,
    pub api_url: String,
    pub retry: RetryPolicy,
}

impl BungieClient {
    pub fn new(api_url: String, api_key: String, requests_per_sec: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_sec.max(1)).expect("non-zero rate limit"),
        );
        Self {
            client: reqwest::Client::new(),
            limiter: Arc::new(RateLimiter::direct(quota)),
            api_key,
            api_url,
            retry: RetryPolicy::default(),
        }
    }

    /// Resolves a linked membership key into the first Destiny membership's
    /// (membership id, membership type).
    pub async fn resolve_membership(
        &self,
        membership_key: u64,
    ) -> Result<(String, i32), BungieError> {
        let url = format!("{}/User/GetMembershipsById/{}/-1", self.api_url, membership_key);
        let data: ApiResponse<MembershipData> = self.get_json(&url, &[]).await?;

        let membership = data.response.destiny_memberships.first().ok_or_else(|| {
            BungieError::MalformedResponse {
                msg: format!("no destiny memberships for key {membership_key}"),
            }
        })?;

        Ok((membership.membership_id.clone(), membership.membership_type))
    }

    /// Fetches one user's profile snapshot with the collectibles component.
    pub async fn fetch_profile(
        &self,
        destiny_membership_id: &str,
        membership_type: i32,
    ) -> Result<ProfileSnapshot, BungieError> {
        let url = format!(
            "{}/Destiny2/{}/Profile/{}/",
            self.api_url, membership_type, destiny_membership_id
        );
        let data: ApiResponse<ProfileSnapshot> = self
            .get_json(&url, &[("components", PROFILE_COMPONENTS)])
            .await?;
        Ok(data.response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BungieError> {
        let body = self.send_with_retry(url, query).await?;
        serde_json::from_str(&body).map_err(|e| BungieError::MalformedResponse {
            msg: e.to_string(),
        })
    }

    /// Issues the request under the shared limiter, retrying transient
    /// failures within the policy's backoff envelope.
    async fn send_with_retry(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, BungieError> {
        let mut attempt = 0;
        loop {
            match self.send_once(url, query).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let wait = self.retry.wait_before(attempt);
                    warn!(
                        "transient error calling {} (attempt {}/{}), retrying in {:?}: {}",
                        url,
                        attempt + 1,
                        self.retry.max_retries,
                        wait,
                        e
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, url: &str, query: &[(&str, &str)]) -> Result<String, BungieError> {
        if self.limiter.check().is_err() {
            info!("Bungie request budget exhausted, waiting for a token...");
        }
        self.limiter.until_ready().await;

        debug!("Making request to: {}", url);
        let resp = self
            .client
            .get(url)
            .header("X-API-Key", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status.is_server_error() {
            return Err(BungieError::UpstreamUnavailable {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(BungieError::MalformedResponse {
                msg: format!("unexpected status {status} from {url}"),
            });
        }

        Ok(resp.text().await?)
    }

    /// The shared admission gate, exposed so the pipeline can hand the same
    /// bucket to anything else that talks to the API.
    pub fn limiter(&self) -> Arc<DirectLimiter> {
        self.limiter.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_to_ceiling() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.wait_before(0), Duration::from_secs(5));
        assert_eq!(retry.wait_before(1), Duration::from_secs(10));
        assert_eq!(retry.wait_before(2), Duration::from_secs(20));
        // Past the ceiling the wait stays clamped.
        assert_eq!(retry.wait_before(3), Duration::from_secs(20));
    }

    #[test]
    fn test_limiter_admits_at_most_budget_per_window() {
        let client = BungieClient::new(
            "https://example.invalid".to_string(),
            "key".to_string(),
            5,
        );
        let limiter = client.limiter();

        // A fresh bucket holds exactly the per-second budget: the first five
        // checks pass, the sixth is rejected until time passes.
        let admitted = (0..6).filter(|_| limiter.check().is_ok()).count();
        assert_eq!(admitted, 5);
    }
}
