use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::read_cookie;
use crate::error::{ApiError, PageError};
use crate::web::AppState;
use crate::AppError;

/// The account behind the request's session, inserted into request extensions
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub email: String,
    pub first_name: String,
    pub session_token: String,
}

/// Resolve the session cookie to a user, if there is a live session
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<CurrentUser>, AppError> {
    let Some(token) = read_cookie(headers, &state.config.session.cookie_name) else {
        return Ok(None);
    };
    let Some(session) = state.sessions.get(&token).await else {
        return Ok(None);
    };

    match state.users.find_by_email(&session.email).await? {
        Some(user) => Ok(Some(CurrentUser {
            email: user.email,
            first_name: user.first_name,
            session_token: token,
        })),
        None => {
            tracing::warn!(email = %session.email, "Session refers to a missing account");
            state.sessions.remove(&token).await;
            Ok(None)
        }
    }
}

/// Protected pages: anonymous visitors are sent to the login form
pub async fn require_page_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => Redirect::to("/login").into_response(),
        Err(err) => PageError(err).into_response(),
    }
}

/// Protected API routes: anonymous callers get a JSON 401
pub async fn require_api_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => ApiError::from(AppError::unauthorized("Authentication required")).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}
