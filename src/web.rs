use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, middleware, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{require_api_auth, require_page_auth};
use crate::config::AppConfig;
use crate::location_resolver::LocationResolver;
use crate::places::PlacesLookup;
use crate::store::UserStore;
use crate::upstream::build_client;
use crate::weather::WeatherLookup;
use crate::{AppError, api, auth::SessionStore, pages};

/// Everything a request handler needs, cloned into each request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserStore,
    pub sessions: SessionStore,
    pub resolver: LocationResolver,
    pub weather: WeatherLookup,
    pub places: PlacesLookup,
}

impl AppState {
    /// Open the user store and build the upstream clients; all of them share one HTTP client
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let client = build_client(&config.upstream)?;
        let upstream = Arc::new(config.upstream.clone());
        let users = UserStore::open(&config.storage.data_dir)?;

        Ok(Self {
            users,
            sessions: SessionStore::new(config.session.ttl_hours),
            resolver: LocationResolver::new(client.clone(), upstream.clone()),
            weather: WeatherLookup::new(client.clone(), upstream.clone()),
            places: PlacesLookup::new(client, upstream, config.places.max_results),
            config: Arc::new(config),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let protected_pages = Router::new()
        .route("/", get(pages::home))
        .route("/logout", get(pages::logout))
        .route("/weather", get(pages::weather))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_page_auth,
        ));

    let api = api::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_api_auth,
    ));

    Router::new()
        .route("/login", get(pages::login_page).post(pages::login))
        .route("/sign-up", get(pages::sign_up_page).post(pages::sign_up))
        .merge(protected_pages)
        .nest("/api", api)
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(state: AppState) -> Result<()> {
    let server = state.config.server.clone();
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", server.host, server.port))?;
    let app = router(state);

    if let (Some(cert), Some(key)) = (&server.tls_cert_path, &server.tls_key_path) {
        return serve_tls(app, addr, cert, key).await;
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")
}

#[cfg(feature = "tls")]
async fn serve_tls(
    app: Router,
    addr: SocketAddr,
    cert: &std::path::Path,
    key: &std::path::Path,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .context("Failed to load TLS certificate or key")?;

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
    });

    tracing::info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(
    _app: Router,
    _addr: SocketAddr,
    _cert: &std::path::Path,
    _key: &std::path::Path,
) -> Result<()> {
    anyhow::bail!("TLS certificate configured but this build lacks the `tls` feature")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
