use axum::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::models::comment::*;
use crate::models::user::User;
use crate::schema::{comments, users};

use super::{Pool, Svc};

#[async_trait]
pub trait CommentService<E = anyhow::Error>: Svc {
    /// Oldest first.
    async fn list_for_post(&self, post_id: i32) -> Result<Vec<CommentView>, E>;
    /// Fails when the post or the author does not exist.
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, E>;
}

#[derive(Clone)]
pub struct CommentServiceDb {
    db: Pool,
}

impl Svc for CommentServiceDb {}

#[async_trait]
impl CommentService<anyhow::Error> for CommentServiceDb {
    async fn list_for_post(&self, pid: i32) -> anyhow::Result<Vec<CommentView>> {
        let mut conn = self.db.get().await?;
        let rows: Vec<(Comment, User)> = comments::table
            .inner_join(users::table)
            .filter(comments::post_id.eq(pid))
            .order((comments::created.asc(), comments::id.asc()))
            .select((Comment::as_select(), User::as_select()))
            .load(&mut conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentView { comment, author })
            .collect())
    }

    async fn create_comment(&self, c: &NewComment) -> anyhow::Result<Comment> {
        let mut conn = self.db.get().await?;
        let comment = diesel::insert_into(comments::table)
            .values(c)
            .returning(Comment::as_returning())
            .get_result(&mut conn)
            .await?;
        Ok(comment)
    }
}

impl CommentServiceDb {
    pub fn new(db: Pool) -> Self {
        Self { db }
    }
}
