use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::SESSION_COOKIE;
use crate::error::AppError;
use crate::helpers::{found, safe_next};
use crate::middleware::auth::CurrentUser;
use crate::models::user::NewUser;
use crate::templates::render;
use crate::AppState;

use super::forms::{add_error, form_errors, FormErrors, LoginForm, SignupForm};
use super::posts::base_context;

async fn signup_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    let mut ctx = base_context(&user);
    ctx.insert("form", &SignupForm::default());
    ctx.insert("errors", &FormErrors::new());
    Ok(render(&state.tera, "users/signup.html", &ctx).await?.into_response())
}

#[tracing::instrument(skip_all, fields(username = %form.username))]
async fn signup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let mut errors = form_errors(form.validate());
    if !errors.contains_key("username")
        && state
            .services
            .users
            .find_by_username(&form.username)
            .await?
            .is_some()
    {
        add_error(&mut errors, "username", "A user with that username already exists.");
    }
    if !errors.is_empty() {
        let mut ctx = base_context(&user);
        ctx.insert("form", &form);
        ctx.insert("errors", &errors);
        return Ok(render(&state.tera, "users/signup.html", &ctx).await?.into_response());
    }

    let password = form.password1.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
    let created = state
        .services
        .users
        .create_user(&NewUser {
            username: form.username,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            password_hash,
        })
        .await?;
    info!(user_id = created.id, "user signed up");

    Ok(found("/"))
}

#[derive(Debug, Default, Deserialize)]
struct NextQuery {
    next: Option<String>,
}

async fn login_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NextQuery>,
) -> Result<Response, AppError> {
    let mut ctx = base_context(&user);
    ctx.insert(
        "form",
        &LoginForm {
            next: query.next,
            ..Default::default()
        },
    );
    ctx.insert("errors", &FormErrors::new());
    Ok(render(&state.tera, "users/login.html", &ctx).await?.into_response())
}

#[tracing::instrument(skip_all, fields(username = %form.username))]
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let candidate = state.services.users.find_by_username(&form.username).await?;
    let verified = match candidate {
        Some(user) => {
            let password = form.password.clone();
            let hash = user.password_hash.clone();
            let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;
            ok.then_some(user)
        }
        None => None,
    };

    let Some(user) = verified else {
        warn!("failed login");
        let mut errors = FormErrors::new();
        add_error(
            &mut errors,
            "__all__",
            "Please enter a correct username and password. Note that both fields may be case-sensitive.",
        );
        let mut ctx = base_context(&None);
        ctx.insert("form", &form);
        ctx.insert("errors", &errors);
        return Ok(render(&state.tera, "users/login.html", &ctx).await?.into_response());
    };

    if let Some(old) = jar.get(SESSION_COOKIE) {
        state.sessions.logout(old.value());
    }
    let sid = state.sessions.login(user.id);
    info!(user_id = user.id, "logged in");
    let jar = jar.add(state.sessions.cookie(sid));
    Ok((jar, found(safe_next(form.next.as_deref()))).into_response())
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    if let Some(sid) = jar.get(SESSION_COOKIE) {
        state.sessions.logout(sid.value());
        info!("logged out");
    }
    let jar = jar.remove(state.sessions.removal_cookie());
    let html = render(&state.tera, "users/logged_out.html", &base_context(&None)).await?;
    Ok((jar, html).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/", get(signup_form).post(signup))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", get(logout).post(logout))
}
