use std::sync::Arc;

use anyhow::Context;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use nessfix_backend::config::{self, DEFAULT_CONFIG_PATH};
use nessfix_backend::logging::init_logging;
use nessfix_backend::module::league::{page_source, LeagueUpdater};
use nessfix_backend::module::scheduled::{ScheduledTaskConfig, ScheduledTaskManager};

mod routes;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = config::read_config(&config_path)?;

    let _logging_guard = init_logging(&config.log_dir, "nessfix-server", &config.log_level, true)?;
    info!("NessFix server starting...");
    if let Some(notice) = config::missing_config_notice(&config_path) {
        warn!("{}", notice);
    }

    let updater = Arc::new(LeagueUpdater::new(config));
    let source = page_source(&config.source).context("Failed to set up the page fetcher")?;

    let mut task_manager = ScheduledTaskManager::new(
        ScheduledTaskConfig {
            rebuild_interval_minutes: config.server.rebuild_interval_minutes,
            layout: config.card.layout,
            perform_initial_rebuild: true,
        },
        updater.clone(),
    );
    task_manager.start_all();

    let state = AppState {
        updater,
        source: Arc::from(source),
        use_snapshot: config.server.use_snapshot,
    };

    let cors = if config.server.enable_cors {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let app = routes::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr = config.server_address();
    info!("Serving {:?} and the API on http://{}", config.output.dir, addr);
    info!("Team of interest: {}, source: {}", config.source.team, config.source.url);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    task_manager.shutdown().await;
    Ok(())
}
