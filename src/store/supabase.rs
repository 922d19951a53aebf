//! Supabase-backed roster and telemetry stores.
//!
//! Both go through the PostgREST endpoint: one bulk select on `users`, and
//! an insert plus an update on `telemetry` keyed by the run id.

use async_trait::async_trait;
use log::info;

use crate::model::RunTelemetry;
use crate::model::User;
use crate::store::RosterStore;
use crate::store::TelemetryStore;
use crate::store::error::StoreError;

pub struct SupabaseStore {
    client: reqwest::Client,
    pub base_url: String,
    service_role_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: String, service_role_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            service_role_key,
        }
    }

    fn rest_url(&self, resource: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, resource)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", &self.service_role_key))
    }

    fn check_status(resource: &str, status: reqwest::StatusCode) -> Result<(), StoreError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::UnexpectedStatus {
                resource: resource.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl RosterStore for SupabaseStore {
    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        info!("scanning users table...");

        let resp = self
            .authed(self.client.get(self.rest_url("users")))
            .query(&[("select", "*")])
            .send()
            .await?;
        Self::check_status("users", resp.status())?;

        let body = resp.text().await?;
        let users: Vec<User> =
            serde_json::from_str(&body).map_err(|source| StoreError::MalformedRow {
                resource: "users".to_string(),
                source,
            })?;

        info!("user count: {}", users.len());
        Ok(users)
    }
}

#[async_trait]
impl TelemetryStore for SupabaseStore {
    async fn insert_run(&self, telemetry: &RunTelemetry) -> Result<(), StoreError> {
        let resp = self
            .authed(self.client.post(self.rest_url("telemetry")))
            .json(telemetry)
            .send()
            .await?;
        Self::check_status("telemetry", resp.status())
    }

    async fn update_run(&self, telemetry: &RunTelemetry) -> Result<(), StoreError> {
        let resp = self
            .authed(self.client.patch(self.rest_url("telemetry")))
            .query(&[("id", format!("eq.{}", telemetry.id))])
            .json(telemetry)
            .send()
            .await?;
        Self::check_status("telemetry", resp.status())
    }
}
