use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use chirp_core::Error as ChirpError;
use chirp_feed::session::viewer_for_token;
use chirp_util::{parse_bearer_token, parse_cookie_str};

use crate::{error::ServerError, state::AppState};

pub const SESSION_COOKIE: &str = "session_token";

/// The user behind a request, `None` for anonymous visitors.
///
/// Read from the `session_token` cookie, or from an `Authorization: Bearer` header.
/// Unknown and expired tokens are treated as anonymous, never as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer(pub Option<String>);

impl Viewer {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// The viewer id, or `NotLoggedIn` for anonymous visitors.
    pub fn require(&self, action: &str) -> chirp_core::Result<&str> {
        self.id()
            .ok_or_else(|| ChirpError::NotLoggedIn(format!("{} needs a signed-in user", action)))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Viewer(None));
        };
        let db = &mut state.pool.get()?;
        let viewer = viewer_for_token(db, &token)?;
        if viewer.is_none() {
            tracing::debug!("Session token is unknown or expired");
        }
        Ok(Viewer(viewer))
    }
}

/// Find the session token of a request. The cookie wins over the authorization header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|s| parse_cookie_str(s).ok())
        .find_map(|mut cookies| cookies.remove(SESSION_COOKIE))
        .filter(|token| !token.is_empty());
    if from_cookie.is_some() {
        return from_cookie;
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| parse_bearer_token(s).ok())
}
