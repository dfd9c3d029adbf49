//! Session layer standing in for the external authentication provider.
//! Logging in issues an opaque bearer token; every API operation requires
//! one, and the dashboard redirects to the login page without it.

use crate::errors::AppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<Uuid, Uuid>>>,
}

impl Sessions {
    pub async fn issue(&self, user_id: Uuid) -> Uuid {
        let token = Uuid::new_v4();
        self.inner.lock().await.insert(token, user_id);
        token
    }

    pub async fn resolve(&self, token: Uuid) -> Option<Uuid> {
        self.inner.lock().await.get(&token).copied()
    }
}

/// Token from `Authorization: Bearer …` or the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Uuid::parse_str(token.trim()).ok();
        }
    }
    let cookies = headers.get(COOKIE).and_then(|v| v.to_str().ok())?;
    cookies.split(';').find_map(|pair| {
        let token = pair.trim().strip_prefix(&format!("{SESSION_COOKIE}="))?;
        Uuid::parse_str(token).ok()
    })
}

pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Option<Uuid> {
    let token = token_from_headers(headers)?;
    state.sessions.resolve(token).await
}

/// Authenticated user identity; rejection is a 401 with no state touched.
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match current_user(state, &parts.headers).await {
            Some(user_id) => Ok(AuthUser(user_id)),
            None => Err(AppError::unauthorized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_bearer_token() {
        let token = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(token_from_headers(&headers), Some(token));
    }

    #[test]
    fn reads_session_cookie() {
        let token = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; session={token}")).unwrap(),
        );
        assert_eq!(token_from_headers(&headers), Some(token));
    }

    #[test]
    fn malformed_token_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert_eq!(token_from_headers(&headers), None);
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }
}
