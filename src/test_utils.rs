//! Test utilities for integration testing.

use crate::config::{AdminAuthConfig, Config};
use axum_test::TestServer;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sqlx::PgPool;

pub fn create_test_config(admin: AdminAuthConfig) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin,
        ..Default::default()
    }
}

/// Build a test server over a migrated pool (as handed out by `#[sqlx::test]`)
pub async fn create_test_app(pool: PgPool, admin: AdminAuthConfig) -> TestServer {
    create_test_app_with_config(pool, create_test_config(admin)).await
}

pub async fn create_test_app_with_config(pool: PgPool, config: Config) -> TestServer {
    crate::Application::new_with_pool(config, pool)
        .expect("Failed to create application")
        .into_test_server()
}

/// The credential pair used by gated-route tests
pub fn operator_credentials() -> AdminAuthConfig {
    AdminAuthConfig {
        username: Some("operator".to_string()),
        password: Some("hunter2".to_string()),
    }
}

/// Encode an `Authorization` header value for HTTP Basic
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}
