use axum::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::models::group::Group;
use crate::models::post::*;
use crate::models::user::User;
use crate::schema::{follows, groups, posts, users};

use super::{Pool, Svc};

#[async_trait]
pub trait PostService<E = anyhow::Error>: Svc {
    async fn count_posts(&self, filter: PostFilter) -> Result<usize, E>;
    /// Newest first, `limit` rows starting at `offset`.
    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PostView>, E>;
    async fn get_post(&self, id: i32) -> Result<Option<PostView>, E>;
    async fn create_post(&self, post: &NewPost) -> Result<Post, E>;
    /// `None` when no post has this id.
    async fn update_post(&self, id: i32, changes: &PostChanges) -> Result<Option<Post>, E>;
    /// Returns whether a row was removed. Comments go with the post.
    async fn delete_post(&self, id: i32) -> Result<bool, E>;
}

#[derive(Clone)]
pub struct PostServiceDb {
    db: Pool,
}

impl Svc for PostServiceDb {}

// Narrows a boxed posts query. Works on both the bare table and the author/group join.
macro_rules! filter_posts {
    ($query:expr, $filter:expr) => {{
        let query = $query;
        match $filter {
            PostFilter::All => query,
            PostFilter::Group(group_id) => query.filter(posts::group_id.eq(group_id)),
            PostFilter::Author(author_id) => query.filter(posts::author_id.eq(author_id)),
            PostFilter::FollowedBy(user_id) => query.filter(
                posts::author_id.eq_any(
                    follows::table
                        .filter(follows::user_id.eq(user_id))
                        .select(follows::author_id),
                ),
            ),
        }
    }};
}

type PostRow = (Post, User, Option<Group>);

fn into_view((post, author, group): PostRow) -> PostView {
    PostView {
        post,
        author,
        group,
    }
}

#[async_trait]
impl PostService<anyhow::Error> for PostServiceDb {
    async fn count_posts(&self, filter: PostFilter) -> anyhow::Result<usize> {
        let mut conn = self.db.get().await?;
        let n: i64 = filter_posts!(posts::table.into_boxed(), filter)
            .count()
            .get_result(&mut conn)
            .await?;
        Ok(usize::try_from(n)?)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<Vec<PostView>> {
        let mut conn = self.db.get().await?;
        let joined = posts::table
            .inner_join(users::table)
            .left_join(groups::table)
            .select((
                Post::as_select(),
                User::as_select(),
                Option::<Group>::as_select(),
            ))
            .into_boxed();
        let rows: Vec<PostRow> = filter_posts!(joined, filter)
            .order((posts::created.desc(), posts::id.desc()))
            .offset(i64::try_from(offset)?)
            .limit(i64::try_from(limit)?)
            .load(&mut conn)
            .await?;
        Ok(rows.into_iter().map(into_view).collect())
    }

    async fn get_post(&self, post_id: i32) -> anyhow::Result<Option<PostView>> {
        let mut conn = self.db.get().await?;
        let row: Option<PostRow> = posts::table
            .inner_join(users::table)
            .left_join(groups::table)
            .filter(posts::id.eq(post_id))
            .select((
                Post::as_select(),
                User::as_select(),
                Option::<Group>::as_select(),
            ))
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row.map(into_view))
    }

    async fn create_post(&self, p: &NewPost) -> anyhow::Result<Post> {
        let mut conn = self.db.get().await?;
        let post = diesel::insert_into(posts::table)
            .values(p)
            .returning(Post::as_returning())
            .get_result(&mut conn)
            .await?;
        Ok(post)
    }

    async fn update_post(&self, post_id: i32, changes: &PostChanges) -> anyhow::Result<Option<Post>> {
        let mut conn = self.db.get().await?;
        let post = diesel::update(posts::table.find(post_id))
            .set(changes)
            .returning(Post::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;
        Ok(post)
    }

    async fn delete_post(&self, post_id: i32) -> anyhow::Result<bool> {
        let mut conn = self.db.get().await?;
        let n = diesel::delete(posts::table.find(post_id))
            .execute(&mut conn)
            .await?;
        Ok(n > 0)
    }
}

impl PostServiceDb {
    pub fn new(db: Pool) -> Self {
        Self { db }
    }
}
