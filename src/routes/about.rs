use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::middleware::auth::CurrentUser;
use crate::templates::render;
use crate::AppState;

use super::posts::base_context;

async fn author(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, AppError> {
    render(&state.tera, "about/author.html", &base_context(&user)).await
}

async fn tech(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, AppError> {
    render(&state.tera, "about/tech.html", &base_context(&user)).await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/author/", get(author))
        .route("/tech/", get(tech))
}
