//! Storage services.
//!
//! Each entity gets a service trait with a PostgreSQL implementation
//! (`*ServiceDb`, diesel-async over a deadpool pool). [`memory::MemoryStore`]
//! implements every trait in process for tests and `storage = "memory"`.

pub mod comments;
pub mod follows;
pub mod groups;
pub mod memory;
pub mod posts;
pub mod users;

use std::sync::Arc;

use diesel_async::AsyncPgConnection;

pub use comments::{CommentService, CommentServiceDb};
pub use follows::{FollowService, FollowServiceDb};
pub use groups::{GroupService, GroupServiceDb};
pub use memory::MemoryStore;
pub use posts::{PostService, PostServiceDb};
pub use users::{UserService, UserServiceDb};

pub type Pool = diesel_async::pooled_connection::deadpool::Pool<AsyncPgConnection>;

/// Marker every storage service carries so it can live behind an `Arc` in router state.
pub trait Svc: Send + Sync + 'static {}

/// Every service the handlers need, bundled for the router state.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<dyn UserService>,
    pub groups: Arc<dyn GroupService>,
    pub posts: Arc<dyn PostService>,
    pub comments: Arc<dyn CommentService>,
    pub follows: Arc<dyn FollowService>,
}

impl Services {
    pub fn postgres(db: Pool) -> Self {
        Self {
            users: Arc::new(UserServiceDb::new(db.clone())),
            groups: Arc::new(GroupServiceDb::new(db.clone())),
            posts: Arc::new(PostServiceDb::new(db.clone())),
            comments: Arc::new(CommentServiceDb::new(db.clone())),
            follows: Arc::new(FollowServiceDb::new(db)),
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            groups: Arc::new(store.clone()),
            posts: Arc::new(store.clone()),
            comments: Arc::new(store.clone()),
            follows: Arc::new(store),
        }
    }
}
