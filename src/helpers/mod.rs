use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use url::Url;

pub const LOGIN_URL: &str = "/auth/login/";

/// `302 Found` to `location`.
pub fn found(location: impl AsRef<str>) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.as_ref().to_string())],
    )
        .into_response()
}

/// Login page URL that sends the user back to `uri` afterwards.
///
/// Slashes stay readable: `/auth/login/?next=/posts/1/edit/`.
pub fn login_url(uri: &Uri) -> String {
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{LOGIN_URL}?next={}", encoded.replace("%2F", "/"))
}

const REDIRECT_BASE: &str = "http://yatube.invalid/";

/// Only same-site absolute paths are followed after login.
///
/// Browsers drop tabs and newlines and read a backslash as a slash, so any of those make
/// the target unsafe. What is left must resolve to the site's own host.
pub fn safe_next(next: Option<&str>) -> &str {
    let Some(n) = next else {
        return "/";
    };
    let plain = n.starts_with('/')
        && !n
            .chars()
            .any(|c| c.is_ascii_control() || c.is_whitespace() || c == '\\');
    let same_host = || {
        Url::parse(REDIRECT_BASE)
            .and_then(|base| base.join(n))
            .is_ok_and(|target| target.host_str() == Some("yatube.invalid"))
    };
    if plain && same_host() {
        n
    } else {
        "/"
    }
}

pub fn post_detail_url(post_id: i32) -> String {
    format!("/posts/{post_id}/")
}

pub fn profile_url(username: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(username.as_bytes()).collect();
    format!("/profile/{encoded}/")
}
