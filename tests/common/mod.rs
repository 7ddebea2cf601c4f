#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use yatube::auth::SESSION_COOKIE;
use yatube::config::{AppCfg, StorageBackend};
use yatube::models::group::{Group, NewGroup};
use yatube::models::post::{NewPost, Post};
use yatube::models::user::{NewUser, User};
use yatube::services::{GroupService, MemoryStore, PostService, Services, UserService};
use yatube::{routes, templates, AppState};

pub const BOUNDARY: &str = "yatube-test-boundary";

pub const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\
\xFF\xFF\xFF\x21\xF9\x04\x00\x00\x00\x00\x00\x2C\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0C\
\x0A\x00\x3B";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: MemoryStore,
    pub media: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let media = tempfile::tempdir().expect("temp media dir");
        let cfg = AppCfg {
            storage: StorageBackend::Memory,
            media_root: media.path().to_path_buf(),
            ..AppCfg::default()
        };
        let store = MemoryStore::new();
        let tera = templates::load(concat!(env!("CARGO_MANIFEST_DIR"), "/src/templates/**/*"))
            .expect("templates should load");
        let state = AppState::new(&cfg, Services::memory(store.clone()), tera);
        let app = routes::router(state.clone());
        Self {
            app,
            state,
            store,
            media,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.store
            .create_user(&NewUser {
                username: username.into(),
                first_name: format!("{username}-first"),
                last_name: format!("{username}-last"),
                email: format!("{username}@example.com"),
                password_hash: String::new(),
            })
            .await
            .expect("user")
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.store
            .create_group(&NewGroup {
                title: format!("Group {slug}"),
                slug: slug.into(),
                description: format!("About {slug}"),
            })
            .await
            .expect("group")
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.store
            .create_post(&NewPost {
                text: text.into(),
                author_id: author.id,
                group_id: group.map(|g| g.id),
                image: None,
            })
            .await
            .expect("post")
    }

    /// Start a session for `user` and return the matching `Cookie` header value.
    pub fn login(&self, user: &User) -> String {
        let sid = self.state.sessions.login(user.id);
        format!("{SESSION_COOKIE}={sid}")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, body: &str) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        cookie: Option<&str>,
        parts: &[Part<'_>],
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        self.send(builder.body(Body::from(multipart_body(parts))).unwrap())
            .await
    }

    pub async fn post_count(&self) -> usize {
        self.store
            .count_posts(yatube::models::post::PostFilter::All)
            .await
            .unwrap()
    }
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Number of post cards on a listing page.
pub fn cards(html: &str) -> usize {
    html.matches("<article class=\"post\"").count()
}
