use axum::extract::{Multipart, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use tera::Context;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::helpers::{found, post_detail_url, profile_url};
use crate::middleware::auth::{CurrentUser, RequireUser};
use crate::models::comment::NewComment;
use crate::models::post::{NewPost, PostChanges, PostFilter, PostView};
use crate::models::user::User;
use crate::pagination::{Page, PageQuery};
use crate::templates::render;
use crate::AppState;

use super::forms::{add_error, form_errors, CommentForm, FormErrors, PostForm, PostFormView};

pub fn base_context(user: &Option<User>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("user", user);
    ctx
}

/// Ids in URLs that are not numbers name no post at all.
fn parse_post_id(raw: &str) -> Result<i32, AppError> {
    raw.parse().map_err(|_| AppError::not_found("post"))
}

async fn load_post(state: &AppState, raw_id: &str) -> Result<PostView, AppError> {
    let id = parse_post_id(raw_id)?;
    state
        .services
        .posts
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::not_found("post"))
}

async fn load_author(state: &AppState, username: &str) -> Result<User, AppError> {
    state
        .services
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found("profile"))
}

/// Count, window, fetch: one page of `filter`.
pub async fn listing(
    state: &AppState,
    filter: PostFilter,
    query: &PageQuery,
) -> Result<Page<PostView>, AppError> {
    let count = state.services.posts.count_posts(filter).await?;
    let window = state.paginator.window(count, query.page.as_deref());
    let items = state
        .services
        .posts
        .list_posts(filter, window.offset, window.limit)
        .await?;
    Ok(Page::new(items, window))
}

#[tracing::instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = listing(&state, PostFilter::All, &query).await?;
    let mut ctx = base_context(&user);
    ctx.insert("page_obj", &page);
    ctx.insert("index", &true);
    Ok(render(&state.tera, "posts/index.html", &ctx).await?.into_response())
}

#[tracing::instrument(skip_all, fields(slug = %slug))]
async fn group_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let group = state
        .services
        .groups
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::not_found("group"))?;
    let page = listing(&state, PostFilter::Group(group.id), &query).await?;

    let mut ctx = base_context(&user);
    ctx.insert("group", &group);
    ctx.insert("page_obj", &page);
    Ok(render(&state.tera, "posts/group_list.html", &ctx).await?.into_response())
}

#[tracing::instrument(skip_all, fields(username = %username))]
async fn profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let author = load_author(&state, &username).await?;
    let page = listing(&state, PostFilter::Author(author.id), &query).await?;
    let following = match &user {
        Some(u) if u.id != author.id => state.services.follows.is_following(u.id, author.id).await?,
        _ => false,
    };

    let mut ctx = base_context(&user);
    ctx.insert("author", &author);
    ctx.insert("posts_count", &page.count);
    ctx.insert("following", &following);
    ctx.insert("page_obj", &page);
    Ok(render(&state.tera, "posts/profile.html", &ctx).await?.into_response())
}

#[tracing::instrument(skip_all, fields(post_id = %post_id))]
async fn post_detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let post = load_post(&state, &post_id).await?;
    let comments = state.services.comments.list_for_post(post.post.id).await?;
    let author_posts = state
        .services
        .posts
        .count_posts(PostFilter::Author(post.author.id))
        .await?;
    let is_author = user.as_ref().is_some_and(|u| u.id == post.author.id);

    let mut ctx = base_context(&user);
    ctx.insert("post", &post);
    ctx.insert("comments", &comments);
    ctx.insert("author_posts_count", &author_posts);
    ctx.insert("is_author", &is_author);
    ctx.insert("form", &CommentForm::default());
    Ok(render(&state.tera, "posts/post_detail.html", &ctx).await?.into_response())
}

async fn render_post_form(
    state: &AppState,
    user: &User,
    form: &PostFormView,
    errors: &FormErrors,
    editing: Option<&PostView>,
) -> Result<Response, AppError> {
    let groups = state.services.groups.list_groups().await?;
    let mut ctx = base_context(&Some(user.clone()));
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    ctx.insert("groups", &groups);
    ctx.insert("is_edit", &editing.is_some());
    ctx.insert("post", &editing);
    Ok(render(&state.tera, "posts/create_post.html", &ctx).await?.into_response())
}

/// Run field validation plus the checks that need storage. Returns the group id
/// to store when the form is clean.
async fn clean_post_form(state: &AppState, form: &PostForm) -> Result<(Option<i32>, FormErrors), AppError> {
    let mut errors = form_errors(form.validate());
    let group_id = match form.group_id() {
        Ok(Some(id)) => {
            if state.services.groups.get_group(id).await?.is_none() {
                add_error(&mut errors, "group", "Select a valid choice.");
            }
            Some(id)
        }
        Ok(None) => None,
        Err(msg) => {
            add_error(&mut errors, "group", msg);
            None
        }
    };
    if form.image.as_ref().is_some_and(|img| !img.is_image()) {
        add_error(
            &mut errors,
            "image",
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
        );
    }
    Ok((group_id, errors))
}

async fn create_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Response, AppError> {
    render_post_form(&state, &user, &PostFormView::default(), &FormErrors::new(), None).await
}

#[tracing::instrument(skip_all, fields(user = %user.username))]
async fn post_create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = PostForm::from_multipart(multipart).await?;
    let (group_id, errors) = clean_post_form(&state, &form).await?;
    if !errors.is_empty() {
        return render_post_form(&state, &user, &form.view(), &errors, None).await;
    }

    let image = match &form.image {
        Some(upload) => Some(state.media.save_post_image(upload).await?),
        None => None,
    };
    let post = state
        .services
        .posts
        .create_post(&NewPost {
            text: form.text,
            author_id: user.id,
            group_id,
            image,
        })
        .await?;
    info!(post_id = post.id, "post created");

    Ok(found(profile_url(&user.username)))
}

/// The post, if `user` wrote it. Anyone else is sent back to the post page.
async fn authored_post(state: &AppState, user: &User, raw_id: &str) -> Result<PostView, Response> {
    let post = load_post(state, raw_id)
        .await
        .map_err(IntoResponse::into_response)?;
    if post.author.id != user.id {
        info!(post_id = post.post.id, user = %user.username, "non-author edit attempt");
        return Err(found(post_detail_url(post.post.id)));
    }
    Ok(post)
}

async fn edit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let post = match authored_post(&state, &user, &post_id).await {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };
    let form = PostFormView {
        text: post.post.text.clone(),
        group: post.post.group_id,
    };
    render_post_form(&state, &user, &form, &FormErrors::new(), Some(&post)).await
}

#[tracing::instrument(skip_all, fields(post_id = %post_id, user = %user.username))]
async fn post_edit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let post = match authored_post(&state, &user, &post_id).await {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };
    let form = PostForm::from_multipart(multipart).await?;
    let (group_id, errors) = clean_post_form(&state, &form).await?;
    if !errors.is_empty() {
        return render_post_form(&state, &user, &form.view(), &errors, Some(&post)).await;
    }

    let image = match &form.image {
        Some(upload) => Some(state.media.save_post_image(upload).await?),
        None => None,
    };
    state
        .services
        .posts
        .update_post(
            post.post.id,
            &PostChanges {
                text: form.text,
                group_id: Some(group_id),
                image,
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;
    info!("post updated");

    Ok(found(post_detail_url(post.post.id)))
}

#[tracing::instrument(skip_all, fields(post_id = %post_id, user = %user.username))]
async fn post_delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let post = match authored_post(&state, &user, &post_id).await {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };
    state.services.posts.delete_post(post.post.id).await?;
    info!("post deleted");
    Ok(found(profile_url(&user.username)))
}

/// Comments are only accepted by POST; a GET just goes back to the post.
async fn comment_redirect(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let post = load_post(&state, &post_id).await?;
    Ok(found(post_detail_url(post.post.id)))
}

#[tracing::instrument(skip_all, fields(post_id = %post_id, user = %user.username))]
async fn add_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    let post = load_post(&state, &post_id).await?;
    if form.validate().is_ok() {
        let comment = state
            .services
            .comments
            .create_comment(&NewComment {
                text: form.text,
                author_id: user.id,
                post_id: post.post.id,
            })
            .await?;
        info!(comment_id = comment.id, "comment added");
    }
    Ok(found(post_detail_url(post.post.id)))
}

#[tracing::instrument(skip_all, fields(user = %user.username))]
async fn follow_index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = listing(&state, PostFilter::FollowedBy(user.id), &query).await?;
    let mut ctx = base_context(&Some(user));
    ctx.insert("page_obj", &page);
    ctx.insert("follow", &true);
    Ok(render(&state.tera, "posts/follow.html", &ctx).await?.into_response())
}

#[tracing::instrument(skip_all, fields(user = %user.username, author = %username))]
async fn profile_follow(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let author = load_author(&state, &username).await?;
    if author.id != user.id && state.services.follows.follow(user.id, author.id).await? {
        info!("followed");
    }
    Ok(found(profile_url(&author.username)))
}

#[tracing::instrument(skip_all, fields(user = %user.username, author = %username))]
async fn profile_unfollow(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let author = load_author(&state, &username).await?;
    if state.services.follows.unfollow(user.id, author.id).await? {
        info!("unfollowed");
    }
    Ok(found(profile_url(&author.username)))
}

/// Every post route except the index, which is mounted with its cache layer.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group/:slug/", get(group_posts))
        .route("/profile/:username/", get(profile))
        .route("/profile/:username/follow/", get(profile_follow))
        .route("/profile/:username/unfollow/", get(profile_unfollow))
        .route("/posts/:post_id/", get(post_detail))
        .route("/posts/:post_id/edit/", get(edit_form).post(post_edit))
        .route("/posts/:post_id/delete/", post(post_delete))
        .route(
            "/posts/:post_id/comment/",
            get(comment_redirect).post(add_comment),
        )
        .route("/create/", get(create_form).post(post_create))
        .route("/follow/", get(follow_index))
}
