use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use moka::sync::Cache;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "sessionid";

/// Upper bound on live sessions; past it the least useful ones are evicted.
const MAX_SESSIONS: u64 = 100_000;

/// Server-side sessions: opaque cookie value to user id.
///
/// Sessions live in process memory and are lost on restart. A session not
/// seen for the idle timeout is dropped.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<Uuid, i32>,
    secure_cookie: bool,
}

impl SessionStore {
    pub fn new(secure_cookie: bool, idle_timeout: Duration) -> Self {
        Self::with_capacity(secure_cookie, idle_timeout, MAX_SESSIONS)
    }

    fn with_capacity(secure_cookie: bool, idle_timeout: Duration, capacity: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(idle_timeout)
                .build(),
            secure_cookie,
        }
    }

    /// Start a session for `user_id` and return its id.
    pub fn login(&self, user_id: i32) -> Uuid {
        let id = Uuid::now_v7();
        self.sessions.insert(id, user_id);
        id
    }

    pub fn logout(&self, session_id: &str) {
        if let Ok(id) = Uuid::parse_str(session_id) {
            self.sessions.invalidate(&id);
        }
    }

    /// Looking a session up counts as activity and restarts its idle timer.
    pub fn user_id(&self, session_id: &str) -> Option<i32> {
        let id = Uuid::parse_str(session_id).ok()?;
        self.sessions.get(&id)
    }

    pub fn cookie(&self, session_id: Uuid) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, session_id.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(SameSite::Lax)
            .build()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, "")).path("/").build()
    }
}
