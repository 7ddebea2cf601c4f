use axum::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::models::follow::NewFollow;
use crate::schema::follows;

use super::{Pool, Svc};

#[async_trait]
pub trait FollowService<E = anyhow::Error>: Svc {
    async fn is_following(&self, user_id: i32, author_id: i32) -> Result<bool, E>;
    /// Returns `false` when the pair already exists.
    async fn follow(&self, user_id: i32, author_id: i32) -> Result<bool, E>;
    /// Returns `false` when there was nothing to remove.
    async fn unfollow(&self, user_id: i32, author_id: i32) -> Result<bool, E>;
}

#[derive(Clone)]
pub struct FollowServiceDb {
    db: Pool,
}

impl Svc for FollowServiceDb {}

#[async_trait]
impl FollowService<anyhow::Error> for FollowServiceDb {
    async fn is_following(&self, user: i32, author: i32) -> anyhow::Result<bool> {
        let mut conn = self.db.get().await?;
        let found = diesel::select(diesel::dsl::exists(
            follows::table
                .filter(follows::user_id.eq(user))
                .filter(follows::author_id.eq(author)),
        ))
        .get_result(&mut conn)
        .await?;
        Ok(found)
    }

    async fn follow(&self, user: i32, author: i32) -> anyhow::Result<bool> {
        let mut conn = self.db.get().await?;
        let n = diesel::insert_into(follows::table)
            .values(NewFollow {
                user_id: user,
                author_id: author,
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;
        Ok(n > 0)
    }

    async fn unfollow(&self, user: i32, author: i32) -> anyhow::Result<bool> {
        let mut conn = self.db.get().await?;
        let n = diesel::delete(
            follows::table
                .filter(follows::user_id.eq(user))
                .filter(follows::author_id.eq(author)),
        )
        .execute(&mut conn)
        .await?;
        Ok(n > 0)
    }
}

impl FollowServiceDb {
    pub fn new(db: Pool) -> Self {
        Self { db }
    }
}
