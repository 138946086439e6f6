use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use budget_alerts::api::{self, AppState};
use budget_alerts::config::{Config, DismissalBackendKind};
use budget_alerts::dismissal::{
    DismissalBackend, DismissalStore, JsonFileDismissalBackend, MemoryDismissalBackend,
    SqliteDismissalBackend,
};
use budget_alerts::engine::{self, AlertEngine};
use budget_alerts::source::{BudgetSource, HttpBudgetSource};

/// Open the configured backend, falling back to memory if it cannot be opened.
fn open_dismissal_backend(config: &Config) -> Arc<dyn DismissalBackend> {
    match config.dismissal_backend {
        DismissalBackendKind::Sqlite => match SqliteDismissalBackend::open(&config.sqlite_path()) {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                tracing::warn!("Cannot open dismissal database, dismissals will not persist: {}", e);
                Arc::new(MemoryDismissalBackend::new())
            }
        },
        DismissalBackendKind::File => {
            let backend = JsonFileDismissalBackend::new(config.dismissal_file_path());
            info!(path = %backend.path().display(), "Using JSON file for dismissals");
            Arc::new(backend)
        }
        DismissalBackendKind::Memory => Arc::new(MemoryDismissalBackend::new()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    budget_alerts::logging::init();

    let config = Config::from_env()?;
    info!(
        backend = ?config.dismissal_backend,
        data_dir = %config.data_dir.display(),
        "Starting budget alert service"
    );

    let store = Arc::new(DismissalStore::new(open_dismissal_backend(&config)));
    store.load().await;
    let engine = Arc::new(AlertEngine::new(store));

    let source: Option<Arc<dyn BudgetSource>> = match &config.status_source {
        Some(status) => {
            let source = HttpBudgetSource::new(&status.base_url, &status.user_id)?;
            info!(url = %source.status_url(), "Fetching budgets from Budget Status service");
            Some(Arc::new(source))
        }
        None => {
            info!("No BUDGET_STATUS_URL set; snapshots must be pushed to /api/budgets/snapshot");
            None
        }
    };

    let shutdown = CancellationToken::new();

    if let (Some(source), Some(interval)) = (&source, config.refresh_interval) {
        info!(interval_secs = interval.as_secs(), "Scheduling budget refresh");
        engine::spawn_refresh_loop(
            Arc::clone(&engine),
            Arc::clone(source),
            interval,
            shutdown.child_token(),
        );
    }

    {
        let shutdown = shutdown.clone();
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
            }
            engine.shutdown();
            shutdown.cancel();
        });
    }

    let state = Arc::new(AppState { engine, source });
    api::serve(&config, state, shutdown).await
}
