//! Application entry point for dmn-worker.
//!
//! Resolves configuration, loads the reference catalogs, wires the stores
//! and clients into the pipeline, and drives one run to completion.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use anyhow::Result;
use chrono::Utc;
use dotenv::dotenv;
use log::debug;
use log::info;

use dmn_worker::bungie::BungieClient;
use dmn_worker::catalog::Catalogs;
use dmn_worker::catalog::store::CatalogStore;
use dmn_worker::catalog::store::HttpCatalogStore;
use dmn_worker::config::Config;
use dmn_worker::config::NotifyChannel;
use dmn_worker::logging::setup_logging;
use dmn_worker::notify::Notifier;
use dmn_worker::notify::discord::DiscordDmNotifier;
use dmn_worker::notify::dispatcher::Dispatcher;
use dmn_worker::notify::push::PushNotifier;
use dmn_worker::pipeline::Pipeline;
use dmn_worker::pipeline::RunCounters;
use dmn_worker::pipeline::WorkerContext;
use dmn_worker::store::supabase::SupabaseStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let config = Config::load()?;
    setup_logging(&config)?;
    info!("Starting dmn-worker...");

    let catalogs = load_catalogs(&config, init_start).await?;
    let pipeline = setup_pipeline(&config, catalogs)?;

    let report = pipeline.run().await?;
    info!(
        "run {} complete: {}/{} users processed",
        report.run_id, report.processed_users, report.total_users
    );
    Ok(())
}

async fn load_catalogs(config: &Config, init_start: Instant) -> Result<Arc<Catalogs>> {
    debug!("Loading reference catalogs...");
    let store = HttpCatalogStore::new(config.storage_base_url.clone());
    let catalogs = store
        .load(Utc::now())
        .await
        .context("failed to load reference catalogs")?;
    info!(
        "Catalog setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );
    Ok(Arc::new(catalogs))
}

fn setup_pipeline(config: &Config, catalogs: Arc<Catalogs>) -> Result<Pipeline> {
    debug!("Setting up pipeline...");

    let supabase = Arc::new(SupabaseStore::new(
        config.supabase_url.clone(),
        config.supabase_service_role_key.clone(),
    ));

    let bungie = Arc::new(BungieClient::new(
        config.bungie_api_url.clone(),
        config.bungie_api_key.clone(),
        config.rate_limit_per_sec,
    ));

    let notifier: Arc<dyn Notifier> = match config.notify_channel {
        NotifyChannel::Discord => Arc::new(DiscordDmNotifier::new(
            config.discord_api_url.clone(),
            config.discord_bot_token.clone(),
        )),
        NotifyChannel::Push => Arc::new(PushNotifier::new(
            config.push_gateway_url.clone(),
            config.push_server_key.clone(),
        )),
    };
    let dispatcher = Arc::new(Dispatcher::new(notifier, config.send_messages));

    let ctx = Arc::new(WorkerContext {
        bungie,
        catalogs,
        dispatcher,
        counters: Arc::new(RunCounters::default()),
    });

    Ok(Pipeline::new(
        config.worker_count,
        config.run_deadline,
        supabase.clone(),
        supabase,
        ctx,
    ))
}
