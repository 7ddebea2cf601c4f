use std::sync::Arc;

use anyhow::{bail, ensure};
use axum::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::comment::*;
use crate::models::follow::*;
use crate::models::group::*;
use crate::models::post::*;
use crate::models::user::*;

use super::{CommentService, FollowService, GroupService, PostService, Svc, UserService};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }

    fn view(&self, post: &Post) -> Option<PostView> {
        let author = self.users.iter().find(|u| u.id == post.author_id)?;
        let group = post
            .group_id
            .and_then(|gid| self.groups.iter().find(|g| g.id == gid));
        Some(PostView {
            post: post.clone(),
            author: author.clone(),
            group: group.cloned(),
        })
    }
}

/// All tables in process memory, behind one lock. Cloning shares the tables.
///
/// Enforces the same uniqueness and reference rules as the SQL schema.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Svc for MemoryStore {}

#[async_trait]
impl UserService<anyhow::Error> for MemoryStore {
    async fn get_user(&self, id: i32) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, u: &NewUser) -> anyhow::Result<User> {
        let mut t = self.tables.write().await;
        ensure!(
            !t.users.iter().any(|x| x.username == u.username),
            "username {:?} is taken",
            u.username
        );
        let user = User {
            id: t.next_id(),
            username: u.username.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            password_hash: u.password_hash.clone(),
        };
        t.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl GroupService<anyhow::Error> for MemoryStore {
    async fn get_group(&self, id: i32) -> anyhow::Result<Option<Group>> {
        let t = self.tables.read().await;
        Ok(t.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> anyhow::Result<Option<Group>> {
        let t = self.tables.read().await;
        Ok(t.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list_groups(&self) -> anyhow::Result<Vec<Group>> {
        let t = self.tables.read().await;
        let mut gs = t.groups.clone();
        gs.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(gs)
    }

    async fn create_group(&self, g: &NewGroup) -> anyhow::Result<Group> {
        let mut t = self.tables.write().await;
        ensure!(
            !t.groups.iter().any(|x| x.slug == g.slug),
            "group slug {:?} is taken",
            g.slug
        );
        let group = Group {
            id: t.next_id(),
            title: g.title.clone(),
            slug: g.slug.clone(),
            description: g.description.clone(),
        };
        t.groups.push(group.clone());
        Ok(group)
    }
}

#[async_trait]
impl PostService<anyhow::Error> for MemoryStore {
    async fn count_posts(&self, filter: PostFilter) -> anyhow::Result<usize> {
        let t = self.tables.read().await;
        Ok(t.posts.iter().filter(|p| t.matches(p, filter)).count())
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<Vec<PostView>> {
        let t = self.tables.read().await;
        let mut ps: Vec<&Post> = t.posts.iter().filter(|p| t.matches(p, filter)).collect();
        ps.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(ps
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|p| t.view(p))
            .collect())
    }

    async fn get_post(&self, id: i32) -> anyhow::Result<Option<PostView>> {
        let t = self.tables.read().await;
        Ok(t.posts.iter().find(|p| p.id == id).and_then(|p| t.view(p)))
    }

    async fn create_post(&self, p: &NewPost) -> anyhow::Result<Post> {
        let mut t = self.tables.write().await;
        ensure!(
            t.users.iter().any(|u| u.id == p.author_id),
            "author {} does not exist",
            p.author_id
        );
        if let Some(gid) = p.group_id {
            ensure!(
                t.groups.iter().any(|g| g.id == gid),
                "group {gid} does not exist"
            );
        }
        let post = Post {
            id: t.next_id(),
            text: p.text.clone(),
            created: Utc::now(),
            author_id: p.author_id,
            group_id: p.group_id,
            image: p.image.clone(),
        };
        t.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: i32, changes: &PostChanges) -> anyhow::Result<Option<Post>> {
        let mut t = self.tables.write().await;
        if let Some(Some(gid)) = changes.group_id {
            ensure!(
                t.groups.iter().any(|g| g.id == gid),
                "group {gid} does not exist"
            );
        }
        let Some(post) = t.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.text = changes.text.clone();
        if let Some(group_id) = changes.group_id {
            post.group_id = group_id;
        }
        if let Some(image) = &changes.image {
            post.image = Some(image.clone());
        }
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i32) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.posts.len();
        t.posts.retain(|p| p.id != id);
        let removed = t.posts.len() != before;
        if removed {
            t.comments.retain(|c| c.post_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CommentService<anyhow::Error> for MemoryStore {
    async fn list_for_post(&self, post_id: i32) -> anyhow::Result<Vec<CommentView>> {
        let t = self.tables.read().await;
        let mut cs: Vec<CommentView> = t
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                let author = t.users.iter().find(|u| u.id == c.author_id)?;
                Some(CommentView {
                    comment: c.clone(),
                    author: author.clone(),
                })
            })
            .collect();
        cs.sort_by(|a, b| {
            a.comment
                .created
                .cmp(&b.comment.created)
                .then(a.comment.id.cmp(&b.comment.id))
        });
        Ok(cs)
    }

    async fn create_comment(&self, c: &NewComment) -> anyhow::Result<Comment> {
        let mut t = self.tables.write().await;
        if !t.posts.iter().any(|p| p.id == c.post_id) {
            bail!("post {} does not exist", c.post_id);
        }
        if !t.users.iter().any(|u| u.id == c.author_id) {
            bail!("author {} does not exist", c.author_id);
        }
        let comment = Comment {
            id: t.next_id(),
            text: c.text.clone(),
            created: Utc::now(),
            author_id: c.author_id,
            post_id: c.post_id,
        };
        t.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl FollowService<anyhow::Error> for MemoryStore {
    async fn is_following(&self, user_id: i32, author_id: i32) -> anyhow::Result<bool> {
        let t = self.tables.read().await;
        Ok(t
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn follow(&self, user_id: i32, author_id: i32) -> anyhow::Result<bool> {
        ensure!(user_id != author_id, "users cannot follow themselves");
        let mut t = self.tables.write().await;
        if t
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }
        let id = t.next_id();
        t.follows.push(Follow {
            id,
            user_id,
            author_id,
        });
        Ok(true)
    }

    async fn unfollow(&self, user_id: i32, author_id: i32) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.follows.len();
        t.follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(t.follows.len() != before)
    }
}
