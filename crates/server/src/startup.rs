use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use crate::shutdown::ShutdownHandle;
use service::{
    file::profile_store::JsonProfileStore,
    profile::switcher::GitConfigSwitcher,
    runtime,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the profile store, git switcher, shutdown handle and task tracker into a router.
pub fn build_app(cfg: &AppConfig, shutdown: ShutdownHandle, tasks: TaskTracker) -> Router {
    let state = AppState {
        profiles: JsonProfileStore::new(&cfg.storage.profiles_path),
        switcher: Arc::new(GitConfigSwitcher::new(&cfg.switch.program, &cfg.switch.scope)),
        shutdown,
        tasks,
    };
    routes::build_router(state, &cfg.web.dir, build_cors())
}

/// Serve until `shutdown` fires, then drain in-flight requests.
pub async fn serve(listener: TcpListener, app: Router, shutdown: ShutdownHandle) -> anyhow::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.wait())
        .await?;
    info!("listener stopped");
    Ok(())
}

/// Stop accepting background work and wait for what is already running.
pub async fn drain_background(tasks: &TaskTracker) {
    tasks.close();
    if !tasks.is_empty() {
        info!(pending = tasks.len(), "waiting for background switch tasks");
    }
    tasks.wait().await;
}

/// Public entry: validate config, bind, and run the HTTP server until shut down.
pub async fn run(mut cfg: AppConfig, shutdown: ShutdownHandle) -> anyhow::Result<()> {
    cfg.normalize_and_validate()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    runtime::ensure_env(&cfg.web.dir, &cfg.storage.profiles_path).await?;

    let tasks = TaskTracker::new();
    let app = build_app(&cfg, shutdown.clone(), tasks.clone());

    let addr: SocketAddr = cfg
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad listen address {}: {e}", cfg.bind_addr())))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    info!(%addr, profiles = %cfg.storage.profiles_path, web_dir = %cfg.web.dir, "starting profile switcher");
    info!(url = %format!("http://{}/web/index.html", addr), "web ui available");

    let served = serve(listener, app, shutdown).await;
    drain_background(&tasks).await;
    served
}
