//! Browser-facing pages: login, sign-up, logout, home and local weather.
//!
//! Every page is an askama template extending `base.html`; failures render
//! `error.html` through [`PageError`].

pub mod flash;

use askama::Template;
use axum::{
    Extension, Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{info, warn};

use crate::auth::session::{append_cookie, removal_cookie, session_cookie};
use crate::auth::{
    CurrentUser, LoginForm, SignUpForm, authenticate, hash_password, validate_sign_up,
    verify_password,
};
use crate::error::PageError;
use crate::models::{Coordinate, NewUser, WeatherSummary};
use crate::web::AppState;
use crate::AppError;

use flash::{FLASH_COOKIE, Flash, pending_flash};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    logged_in: bool,
    flashes: Vec<Flash>,
    email: String,
}

#[derive(Template)]
#[template(path = "sign_up.html")]
struct SignUpTemplate {
    logged_in: bool,
    flashes: Vec<Flash>,
    email: String,
    first_name: String,
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    logged_in: bool,
    flashes: Vec<Flash>,
    first_name: String,
}

#[derive(Template)]
#[template(path = "weather.html")]
struct WeatherTemplate {
    logged_in: bool,
    flashes: Vec<Flash>,
    place: String,
    coordinates: String,
    rows: Vec<WeatherRow>,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    logged_in: bool,
    flashes: Vec<Flash>,
    status: u16,
    reason: String,
    message: String,
}

struct WeatherRow {
    label: &'static str,
    value: String,
}

/// Render a template; when a pending flash was shown, tell the browser to drop it
fn respond<T: Template>(template: &T, clear_flash: bool) -> Result<Response, PageError> {
    let body = template.render().map_err(AppError::from)?;
    let mut response = Html(body).into_response();
    if clear_flash {
        append_cookie(&mut response, &removal_cookie(FLASH_COOKIE));
    }
    Ok(response)
}

fn redirect_with_flash(to: &str, flash: &Flash) -> Response {
    let mut response = Redirect::to(to).into_response();
    append_cookie(&mut response, &flash.to_cookie());
    response
}

/// HTML body for an error status; falls back to plain text if the template fails
pub fn render_error_page(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    let template = ErrorTemplate {
        logged_in: false,
        flashes: Vec::new(),
        status: status.as_u16(),
        reason: reason.to_string(),
        message: message.to_string(),
    };
    template
        .render()
        .unwrap_or_else(|_| format!("{} {}: {}", status.as_u16(), reason, message))
}

pub async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let pending = pending_flash(&headers);
    let logged_in = authenticate(&state, &headers).await?.is_some();

    respond(
        &LoginTemplate {
            logged_in,
            flashes: pending.iter().cloned().collect(),
            email: String::new(),
        },
        pending.is_some(),
    )
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let email = form.email.trim();

    let failure = match state.users.find_by_email(email).await? {
        Some(user) if verify_password(&user.password_hash, &form.password) => {
            let token = state.sessions.create(&user.email).await;
            info!(email = %user.email, "User logged in");

            let mut response =
                redirect_with_flash("/", &Flash::success("Logged in successfully!"));
            append_cookie(&mut response, &session_cookie(&state.config.session, &token));
            return Ok(response);
        }
        Some(_) => "Incorrect password, try again.",
        None => "Email does not exist.",
    };

    warn!(email = %email, "Login rejected: {}", failure);
    let logged_in = authenticate(&state, &headers).await?.is_some();
    respond(
        &LoginTemplate {
            logged_in,
            flashes: vec![Flash::error(failure)],
            email: email.to_string(),
        },
        false,
    )
}

pub async fn sign_up_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let pending = pending_flash(&headers);
    let logged_in = authenticate(&state, &headers).await?.is_some();

    respond(
        &SignUpTemplate {
            logged_in,
            flashes: pending.iter().cloned().collect(),
            email: String::new(),
            first_name: String::new(),
        },
        pending.is_some(),
    )
}

pub async fn sign_up(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SignUpForm>,
) -> Result<Response, PageError> {
    let email = form.email.trim().to_string();
    let email_taken = state.users.find_by_email(&email).await?.is_some();

    let outcome = match validate_sign_up(&form, email_taken) {
        Ok(()) => {
            let new_user = NewUser {
                email: email.clone(),
                first_name: form.first_name.trim().to_string(),
                password_hash: hash_password(&form.password1),
            };
            state.users.insert(new_user).await
        }
        Err(err) => Err(err),
    };

    match outcome {
        Ok(user) => {
            info!(email = %user.email, "Account created");
            Ok(redirect_with_flash("/", &Flash::success("Account created!")))
        }
        Err(AppError::Validation { message }) => {
            warn!(email = %email, "Sign-up rejected: {}", message);
            let logged_in = authenticate(&state, &headers).await?.is_some();
            respond(
                &SignUpTemplate {
                    logged_in,
                    flashes: vec![Flash::error(message)],
                    email,
                    first_name: form.first_name,
                },
                false,
            )
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    state.sessions.remove(&user.session_token).await;
    info!(email = %user.email, "User logged out");

    let mut response = Redirect::to("/login").into_response();
    append_cookie(
        &mut response,
        &removal_cookie(&state.config.session.cookie_name),
    );
    response
}

pub async fn home(
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let pending = pending_flash(&headers);
    respond(
        &HomeTemplate {
            logged_in: true,
            flashes: pending.iter().cloned().collect(),
            first_name: user.first_name,
        },
        pending.is_some(),
    )
}

/// Current weather at the caller's IP location
pub async fn weather(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let coord = state.resolver.resolve(None).await?;
    let report = state.weather.fetch(&coord).await?;
    let pending = pending_flash(&headers);

    respond(
        &weather_template(&coord, report.summary(), pending.iter().cloned().collect()),
        pending.is_some(),
    )
}

fn weather_template(coord: &Coordinate, summary: WeatherSummary, flashes: Vec<Flash>) -> WeatherTemplate {
    let rows = [
        ("Conditions", summary.description),
        ("Temperature", summary.temperature),
        ("Feels like", summary.feels_like),
        ("Humidity", summary.humidity),
        ("Pressure", summary.pressure),
        ("Wind", summary.wind),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|value| WeatherRow { label, value }))
    .collect();

    WeatherTemplate {
        logged_in: true,
        flashes,
        place: summary
            .place
            .unwrap_or_else(|| "your location".to_string()),
        coordinates: coord.format_coordinates(),
        rows,
    }
}
