//! Extractors for the authenticated caller.
//!
//! [`CurrentUser`] reads the JWT session cookie; [`RequiresAdmin`] is the
//! admin authorization gate. Both turn ambient request state into an explicit
//! identity value at the HTTP boundary - nothing below the handlers reads
//! cookies or headers, which keeps the invite lifecycle pure with respect to
//! its inputs.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
    types::{Operation, Permission, Resource},
};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but unreadable
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.native.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    Err(_) => {
                        // Invalid/expired token. Expected for stale cookies,
                        // so keep scanning rather than propagating.
                        continue;
                    }
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found JWT session authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("JWT session authentication failed: {:?}", e);
                Err(e)
            }
            None => Err(Error::Unauthenticated { message: None }),
        }
    }
}

/// The admin authorization gate.
///
/// Wraps [`CurrentUser`] and rejects non-administrators before the handler
/// body runs. Handlers that create or list invites, manage talent, notes, or
/// photos take this extractor; everything past it can trust its caller.
#[derive(Debug, Clone)]
pub struct RequiresAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequiresAdmin {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            return Err(Error::InsufficientPermissions {
                required: Permission::Allow(Resource::Users, Operation::ReadAll),
                action: Operation::ReadAll,
                resource: "admin resource".to_string(),
            });
        }

        Ok(RequiresAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::Request;
    use uuid::Uuid;

    fn config_with_secret() -> Config {
        Config {
            secret_key: Some("extractor-test-secret".to_string()),
            ..Default::default()
        }
    }

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = Request::builder().uri("/").header("cookie", cookie).body(()).unwrap();
        request.into_parts().0
    }

    #[test]
    fn test_session_cookie_round_trip() {
        let config = config_with_secret();
        let user = CurrentUser {
            id: Uuid::new_v4(),
            email: "cookie@example.com".to_string(),
            is_admin: true,
        };
        let token = session::create_session_token(&user, &config).unwrap();

        let parts = parts_with_cookie(&format!("other=1; session={token}"));
        let extracted = try_jwt_session_auth(&parts, &config).unwrap().unwrap();
        assert_eq!(extracted.id, user.id);
        assert!(extracted.is_admin);
    }

    #[test]
    fn test_garbage_cookie_is_ignored() {
        let config = config_with_secret();
        let parts = parts_with_cookie("session=not-a-jwt");
        assert!(try_jwt_session_auth(&parts, &config).is_none());
    }

    #[test]
    fn test_missing_cookie_header() {
        let config = config_with_secret();
        let request = Request::builder().uri("/").body(()).unwrap();
        let parts = request.into_parts().0;
        assert!(try_jwt_session_auth(&parts, &config).is_none());
    }
}
