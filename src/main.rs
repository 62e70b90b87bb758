//! Dossier HTTP server entrypoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use dossier::config::Config;
use dossier::dictionary::SeverityDictionary;
use dossier::gateway::{HandlerState, create_router_with_state};
use dossier::pipeline::ScoringPipeline;
use dossier::retrieval::{
    EntityProvider, HttpEntityProvider, RetrievalService, StoreEntityProvider,
};
use dossier::store::{EntityStore, MemoryEntityStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const BACKING_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
██████╗  ██████╗ ███████╗███████╗██╗███████╗██████╗
██╔══██╗██╔═══██╗██╔════╝██╔════╝██║██╔════╝██╔══██╗
██║  ██║██║   ██║███████╗███████╗██║█████╗  ██████╔╝
██║  ██║██║   ██║╚════██║╚════██║██║██╔══╝  ██╔══██╗
██████╔╝╚██████╔╝███████║███████║██║███████╗██║  ██║
╚═════╝  ╚═════╝ ╚══════╝╚══════╝╚═╝╚══════╝╚═╝  ╚═╝

        SCAN. SCORE. SERVE.
                                        AGPL-3.0
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        backing = config.backing_url.as_deref().unwrap_or("local store"),
        "Dossier starting"
    );

    let store: Arc<MemoryEntityStore> = Arc::new(MemoryEntityStore::new());

    match config.backing_url.clone() {
        Some(url) => {
            let provider = HttpEntityProvider::new(&url, BACKING_TIMEOUT)
                .map_err(|e| anyhow::anyhow!("backing client: {e}"))?;
            serve(config, store, provider).await
        }
        None => {
            tracing::info!("no DOSSIER_BACKING_URL configured, serving from the local store");
            let provider = StoreEntityProvider::new(store.clone() as Arc<dyn EntityStore>);
            serve(config, store, provider).await
        }
    }
}

async fn serve<P>(
    config: Config,
    store: Arc<MemoryEntityStore>,
    provider: P,
) -> anyhow::Result<()>
where
    P: EntityProvider + 'static,
{
    let addr: SocketAddr = config.socket_addr().parse()?;

    let dictionary = match &config.dictionary_path {
        Some(path) => {
            let dict = SeverityDictionary::from_path(path)?;
            tracing::info!(path = %path.display(), keywords = dict.keyword_count(), "custom dictionary loaded");
            Arc::new(dict)
        }
        None => Arc::new(SeverityDictionary::default()),
    };

    let service = Arc::new(RetrievalService::new(config.retrieval_config(), provider));
    service.start().await;

    let store: Arc<dyn EntityStore> = store;
    let pipeline = Arc::new(ScoringPipeline::new(
        Arc::clone(&store),
        dictionary,
        config.scoring_workers,
    ));

    let state = HandlerState::new(Arc::clone(&service), Arc::clone(&store), pipeline);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(
            service,
            store,
            config.snapshot_path.clone(),
        ))
        .await?;

    tracing::info!("Dossier shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("DOSSIER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal<P>(
    service: Arc<RetrievalService<P>>,
    store: Arc<dyn EntityStore>,
    snapshot_path: Option<PathBuf>,
) where
    P: EntityProvider + 'static,
{
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    if let Some(path) = snapshot_path {
        export_snapshot(&store, &path).await;
    }
    service.stop();
}

/// Writes the store's entity rows to the snapshot file so the next boot
/// has a fallback dataset.
async fn export_snapshot(store: &Arc<dyn EntityStore>, path: &PathBuf) {
    let entities = match store.fetch_entities().await {
        Ok(entities) => entities,
        Err(e) => {
            tracing::warn!(error = %e, "snapshot export skipped: store read failed");
            return;
        }
    };

    let bytes = match serde_json::to_vec(&entities) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "snapshot export skipped: serialization failed");
            return;
        }
    };

    if let Some(parent) = path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            tracing::warn!(error = %e, "snapshot export skipped: directory creation failed");
            return;
        }
    }

    match tokio::fs::write(path, bytes).await {
        Ok(()) => {
            tracing::info!(path = %path.display(), entities = entities.len(), "snapshot exported")
        }
        Err(e) => tracing::warn!(error = %e, "snapshot export failed"),
    }
}
