use std::sync::Arc;

use apply_funnel::attribution::HttpIpLookup;
use apply_funnel::cli;
use apply_funnel::config::FunnelConfig;
use apply_funnel::store::{FileStore, KeyValueStore, MemoryStore, SnapshotStore};
use apply_funnel::submission::Submitter;
use apply_funnel::wizard::{Collaborators, TracingEvents, WizardController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = FunnelConfig::from_env();
    config.validate()?;
    let config = Arc::new(config);

    // ── Storage ─────────────────────────────────────────────────────────
    let data_path =
        std::env::var("FUNNEL_DATA_PATH").unwrap_or_else(|_| "./data/funnel.json".to_string());
    let local: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&data_path));
    let session: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let snapshots = SnapshotStore::new(local);

    eprintln!("Apply Funnel v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Saved answers: {}", data_path);
    eprintln!(
        "   API: {}",
        if config.api_url.is_empty() { "not configured" } else { config.api_url.as_str() }
    );
    eprintln!(
        "   Webhook: {}",
        if config.webhook_url.is_empty() { "not configured" } else { config.webhook_url.as_str() }
    );
    eprintln!("   Type /help for commands. /quit to exit.");

    // ── Wizard ──────────────────────────────────────────────────────────
    let submitter = Submitter::from_config(Arc::clone(&config), snapshots.clone());
    let mut deps = Collaborators::new(Arc::clone(&config), snapshots, submitter)
        .with_session(session)
        .with_events(Arc::new(TracingEvents));
    if let Some(url) = &config.ip_lookup_url {
        deps = deps.with_ip_lookup(Arc::new(HttpIpLookup::new(url.clone())));
    }

    let ctx = cli::landing_context_from_env(&config);
    let wizard = WizardController::mount(deps, &ctx).await;

    match cli::run(wizard).await? {
        Some(url) => println!("{url}"),
        None => eprintln!("Answers saved. Run again to pick up where you left off."),
    }

    Ok(())
}
