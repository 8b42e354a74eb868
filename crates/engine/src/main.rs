//! HTTP server for the Happy Vertical People Transporter game.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sirius_engine::api::http::routes;
use sirius_engine::infrastructure::clock::{SystemClock, SystemRandom};
use sirius_engine::infrastructure::pollinations::PollinationsClient;
use sirius_engine::{App, AppConfig};

const DEFAULT_LOG_FILTER: &str = "sirius_engine=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_files();
    init_tracing();

    let config = AppConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let cors = config.server.cors_allowed_origins.as_deref().and_then(cors_layer);
    let prune_every = Duration::from_secs(config.sessions.prune_interval_secs.max(1));

    tracing::info!(
        endpoint = %config.llm.endpoint,
        model = %config.llm.model,
        timeout_secs = config.llm.timeout_secs,
        "Talking to Pollinations"
    );
    let llm = PollinationsClient::with_timeout(
        &config.llm.endpoint,
        &config.llm.model,
        config.llm.timeout_secs,
    );

    let app = Arc::new(App::new(
        config,
        Arc::new(llm),
        Arc::new(SystemClock),
        Arc::new(SystemRandom),
    ));
    spawn_session_pruner(Arc::clone(&app), prune_every);

    let mut router: Router = routes().with_state(app).layer(TraceLayer::new_for_http());
    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Sirius engine listening");
    axum::serve(listener, router).await?;

    Ok(())
}

/// `.env.local` wins over `.env`; both are looked up at the workspace root so
/// the binary behaves the same when started from `crates/engine`.
fn load_env_files() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    for name in [".env.local", ".env"] {
        let path = root.join(name);
        if path.is_file() {
            if let Err(error) = dotenvy::from_path(&path) {
                eprintln!("ignoring {}: {error}", path.display());
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn spawn_session_pruner(app: Arc<App>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            app.prune_idle_sessions();
        }
    });
}

/// `*` allows any origin; otherwise a comma-separated allow list. Returns
/// `None` when nothing usable is configured.
fn cors_layer(origins: &str) -> Option<CorsLayer> {
    let allow = if origins.trim() == "*" {
        AllowOrigin::any()
    } else {
        let list: Vec<HeaderValue> = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();
        if list.is_empty() {
            return None;
        }
        AllowOrigin::list(list)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
    )
}
