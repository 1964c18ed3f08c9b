//! Operator access gate.
//!
//! A single stateless predicate reused by every operator-only route: no
//! sessions, no tokens, no expiry. When no credential pair is configured the
//! gate is deliberately open - an operational choice for small events - and
//! that state is warned about loudly at startup rather than inferred from a
//! null check.

use crate::errors::Error;
use crate::{AppState, config::AdminAuthConfig};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

/// Gate configuration state. Tests and callers can assert on both branches
/// explicitly instead of probing for empty strings.
#[derive(Debug, Clone)]
pub enum AdminGate {
    /// No credential configured; every gated route is open
    Open,
    /// HTTP Basic challenge-response with an exact-match credential pair
    Protected { username: String, password: String },
}

impl AdminGate {
    pub fn from_config(config: &AdminAuthConfig) -> Self {
        match (&config.username, &config.password) {
            (Some(username), Some(password)) => AdminGate::Protected {
                username: username.clone(),
                password: password.clone(),
            },
            _ => AdminGate::Open,
        }
    }

    /// Log the fail-open state once at startup so it is never a surprise
    pub fn warn_if_open(&self) {
        if matches!(self, AdminGate::Open) {
            tracing::warn!("admin credentials not configured - operator routes are unprotected");
        }
    }

    /// Check an `Authorization` header value against the gate
    pub fn allows(&self, authorization: Option<&str>) -> bool {
        match self {
            AdminGate::Open => true,
            AdminGate::Protected { username, password } => {
                let Some((supplied_user, supplied_pass)) = authorization.and_then(decode_basic) else {
                    return false;
                };
                supplied_user == *username && supplied_pass == *password
            }
        }
    }
}

/// Decode an `Authorization: Basic <base64(user:pass)>` header value
fn decode_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Middleware for operator-only routes. Authentication is evaluated before
/// the handler sees the request; failure carries the realm challenge.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, Error> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !state.gate.allows(authorization) {
        return Err(Error::Unauthenticated);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protected() -> AdminGate {
        AdminGate::Protected {
            username: "operator".to_string(),
            password: "hunter2".to_string(),
        }
    }

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", BASE64.encode(format!("{user}:{pass}")))
    }

    #[test]
    fn open_gate_allows_everything() {
        let gate = AdminGate::Open;
        assert!(gate.allows(None));
        assert!(gate.allows(Some("Basic garbage")));
    }

    #[test]
    fn protected_gate_requires_exact_match() {
        let gate = protected();
        assert!(gate.allows(Some(&basic("operator", "hunter2"))));
        assert!(!gate.allows(None));
        assert!(!gate.allows(Some(&basic("operator", "wrong"))));
        assert!(!gate.allows(Some(&basic("wrong", "hunter2"))));
        assert!(!gate.allows(Some("Bearer sometoken")));
        assert!(!gate.allows(Some("Basic not-base64!!!")));
    }

    #[test]
    fn gate_built_from_config_states() {
        let open = AdminGate::from_config(&AdminAuthConfig::default());
        assert!(matches!(open, AdminGate::Open));

        let protected = AdminGate::from_config(&AdminAuthConfig {
            username: Some("operator".to_string()),
            password: Some("hunter2".to_string()),
        });
        assert!(matches!(protected, AdminGate::Protected { .. }));
    }

    #[test]
    fn passwords_may_contain_colons() {
        let gate = AdminGate::Protected {
            username: "operator".to_string(),
            password: "a:b:c".to_string(),
        };
        assert!(gate.allows(Some(&basic("operator", "a:b:c"))));
    }
}
