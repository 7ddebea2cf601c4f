use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::auth::SESSION_COOKIE;
use crate::error::AppError;
use crate::helpers::{found, login_url};
use crate::models::user::User;
use crate::AppState;

/// The logged-in user, if any.
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(user_id) = jar
            .get(SESSION_COOKIE)
            .and_then(|c| state.sessions.user_id(c.value()))
        else {
            return Ok(CurrentUser(None));
        };
        let user = state.services.users.get_user(user_id).await?;
        Ok(CurrentUser(user))
    }
}

/// A logged-in user. Anonymous requests are redirected to the login page
/// with `next` pointing back at the requested URL.
pub struct RequireUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        match user {
            Some(user) => Ok(RequireUser(user)),
            None => {
                tracing::debug!(path = %parts.uri.path(), "anonymous request to protected route");
                Err(found(login_url(&parts.uri)))
            }
        }
    }
}
