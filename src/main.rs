use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use charityone_backend::config::AppConfig;
use charityone_backend::services::aggregator::CauseAggregator;
use charityone_backend::services::events::{EventWatcher, RegistryEventKind};
use charityone_backend::services::registry::{CauseWriter, RegistryClient};
use charityone_backend::{build_router, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,charityone_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // A missing endpoint or registry address is a configuration error, not
    // something to retry.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            std::process::exit(1);
        }
    };

    // Connect to the registry chain
    let registry = match RegistryClient::connect(&config).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to the cause registry");
            std::process::exit(1);
        }
    };

    let has_signer = config.signer_private_key.is_some();
    let aggregator = Arc::new(CauseAggregator::new(
        registry.clone(),
        config.snapshot_ttl_secs,
    ));

    // Refresh the snapshot when the registry changes on chain
    match EventWatcher::connect(&config) {
        Ok(watcher) => {
            for kind in [
                RegistryEventKind::CauseAdded,
                RegistryEventKind::CauseUpdated,
                RegistryEventKind::DonationMade,
            ] {
                let mut subscription = watcher.subscribe(kind);
                let aggregator = aggregator.clone();
                tokio::spawn(async move {
                    while let Some(event) = subscription.recv().await {
                        tracing::info!(
                            kind = %event.kind,
                            cause_id = event.cause_id,
                            block = event.block_number,
                            "Registry changed, invalidating snapshot"
                        );
                        aggregator.invalidate().await;
                    }
                });
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to start event watcher");
            std::process::exit(1);
        }
    }

    let state = AppState {
        aggregator,
        writer: has_signer.then(|| registry.clone() as Arc<dyn CauseWriter>),
        admin_api_key: config.admin_api_key.clone(),
    };

    // Build router
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind HTTP listener");

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
