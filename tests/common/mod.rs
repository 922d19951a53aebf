use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dmn_worker::bungie::BungieClient;
use dmn_worker::bungie::RetryPolicy;
use dmn_worker::catalog::Catalogs;
use dmn_worker::model::RunTelemetry;
use dmn_worker::model::User;
use dmn_worker::notify::Notifier;
use dmn_worker::notify::dispatcher::Dispatcher;
use dmn_worker::notify::error::NotifyError;
use dmn_worker::pipeline::RunCounters;
use dmn_worker::pipeline::WorkerContext;
use dmn_worker::store::RosterStore;
use dmn_worker::store::TelemetryStore;
use dmn_worker::store::error::StoreError;

#[allow(dead_code)]
pub fn user(discord_id: u64, bungie_membership_id: Option<u64>) -> User {
    User {
        discord_id,
        bungie_membership_id,
        ada_1: true,
        ..User::default()
    }
}

#[allow(dead_code)]
pub fn catalogs(master: &[(&str, &str)], vendor: &[(&str, &str)]) -> Catalogs {
    let to_map = |pairs: &[(&str, &str)]| -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    };
    Catalogs {
        master: to_map(master),
        vendor: to_map(vendor),
    }
}

/// Bungie client pointed at a mock server, with backoff shrunk so retry
/// tests finish in milliseconds.
#[allow(dead_code)]
pub fn bungie_client(api_url: String) -> BungieClient {
    let mut client = BungieClient::new(api_url, "test-api-key".to_string(), 25);
    client.retry = RetryPolicy {
        max_retries: 2,
        base_wait: Duration::from_millis(5),
        max_wait: Duration::from_millis(10),
    };
    client
}

#[allow(dead_code)]
pub fn worker_context(
    bungie: BungieClient,
    catalogs: Catalogs,
    notifier: Arc<dyn Notifier>,
    send_messages: bool,
) -> Arc<WorkerContext> {
    Arc::new(WorkerContext {
        bungie: Arc::new(bungie),
        catalogs: Arc::new(catalogs),
        dispatcher: Arc::new(Dispatcher::new(notifier, send_messages)),
        counters: Arc::new(RunCounters::default()),
    })
}

// IN-MEMORY STORES

#[allow(dead_code)]
pub struct InMemoryRoster {
    pub users: Vec<User>,
    pub fail: bool,
}

#[allow(dead_code)]
impl InMemoryRoster {
    pub fn new(users: Vec<User>) -> Self {
        Self { users, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            users: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl RosterStore for InMemoryRoster {
    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        if self.fail {
            return Err(StoreError::UnexpectedStatus {
                resource: "users".to_string(),
                status: 500,
            });
        }
        Ok(self.users.clone())
    }
}

#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingTelemetry {
    pub inserts: Mutex<Vec<RunTelemetry>>,
    pub updates: Mutex<Vec<RunTelemetry>>,
}

#[async_trait]
impl TelemetryStore for RecordingTelemetry {
    async fn insert_run(&self, telemetry: &RunTelemetry) -> Result<(), StoreError> {
        self.inserts.lock().unwrap().push(telemetry.clone());
        Ok(())
    }

    async fn update_run(&self, telemetry: &RunTelemetry) -> Result<(), StoreError> {
        self.updates.lock().unwrap().push(telemetry.clone());
        Ok(())
    }
}

#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(u64, String)>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, user: &User, body: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::DeliveryFailed {
                user_id: user.discord_id,
                msg: "transport rejected".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((user.discord_id, body.to_string()));
        Ok(())
    }
}
