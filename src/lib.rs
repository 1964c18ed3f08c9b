//! # guestbook: Event Guestbook Service
//!
//! `guestbook` is a small HTTP service for collecting congratulatory notes at
//! an event. Guests submit short text notes or recorded voice notes
//! anonymously (no accounts, no sessions); the event operator reads them back
//! through a pair of gated review surfaces.
//!
//! ## Overview
//!
//! The public surface is two submission endpoints: `POST /notes` accepts a
//! text note as JSON or a form post, and `POST /voice-notes` accepts a
//! multipart upload carrying the audio blob, its duration, and the guest's
//! name. Every submission is validated before storage - character limits on
//! text, byte and duration ceilings on audio, and MIME resolution for blobs
//! whose recorder didn't declare a content type.
//!
//! The operator surface sits behind an HTTP Basic gate ([`auth::AdminGate`])
//! and exposes the same data two ways: a flat JSON feed (`GET /admin/notes`,
//! `GET /admin/voice-notes`) for simple dashboards, and a typed GraphQL
//! endpoint (`POST /graphql`) for anything richer. Voice audio itself is
//! streamed separately (`GET /voice-notes/{id}/audio`) with byte-range
//! support so browser audio elements can seek.
//!
//! All persistence is PostgreSQL; audio is stored inline as `BYTEA`, which
//! keeps a single backup artifact and is comfortably within range for
//! 2 MiB-capped clips at event scale. Migrations run automatically at
//! startup.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use guestbook::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = guestbook::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     guestbook::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod submissions;
pub mod telemetry;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

use crate::api::handlers::graphql::{GuestbookSchema, build_schema};
use crate::auth::AdminGate;
use crate::submissions::Submissions;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use config::CorsOrigin;
pub use config::Config;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub submissions: Submissions,
    pub gate: AdminGate,
    pub schema: GuestbookSchema,
}

/// Get the guestbook database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect the pool and bring the schema up to date
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.pool.max_connections)
        .min_connections(config.pool.min_connections)
        .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;

    migrator().run(&pool).await?;
    Ok(pool)
}

/// Create CORS layer from configuration.
///
/// A wildcard anywhere in the allow-list means "allow all"; explicit origins
/// only matter when no wildcard is configured. `AllowOrigin::list` refuses a
/// literal `*` entry, so the wildcard case must take the `any()` path.
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let has_wildcard = config
        .cors
        .allowed_origins
        .iter()
        .any(|origin| matches!(origin, CorsOrigin::Wildcard));

    let allow_origin = if has_wildcard {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST, axum::http::Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION]))
}

/// Build the application router.
///
/// Public submission routes carry per-route body limits sized to what they
/// accept; everything operator-facing is wrapped in the admin gate
/// middleware before path dispatch.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let limits = &state.config.limits;

    let public_routes = Router::new()
        .route(
            "/notes",
            post(api::handlers::submissions::submit_text_note).layer(DefaultBodyLimit::max(limits.max_text_body_bytes)),
        )
        .route(
            "/voice-notes",
            post(api::handlers::submissions::submit_voice_note)
                .layer(DefaultBodyLimit::max(limits.max_audio_bytes + limits.multipart_overhead_bytes)),
        );

    let operator_routes = Router::new()
        .route("/admin/notes", get(api::handlers::feed::list_text_notes))
        .route("/admin/voice-notes", get(api::handlers::feed::list_voice_notes))
        .route("/voice-notes/{id}/audio", get(api::handlers::audio::get_voice_audio))
        .route("/graphql", post(api::handlers::graphql::graphql_handler))
        .layer(from_fn_with_state(state.clone(), auth::require_admin));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(public_routes)
        .merge(operator_routes)
        .with_state(state)
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects the pool, runs migrations,
///    and builds the router
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
/// 3. **Shutdown**: on the shutdown signal, drains in-flight requests and
///    closes the pool
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = setup_database(&config).await?;
        Self::new_with_pool(config, pool)
    }

    /// Create an application over an existing pool. Migrations are assumed to
    /// have already run (tests get a migrated pool from the harness).
    pub fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let submissions = Submissions::new(pool.clone(), &config);
        let gate = AdminGate::from_config(&config.admin);
        gate.warn_if_open();

        let schema = build_schema(submissions.clone(), config.limits.clone());

        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
            submissions,
            gate,
            schema,
        };

        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Guestbook listening on http://{}", bind_addr);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
