use std::fmt;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use super::group::Group;
use super::user::User;

/// Number of characters a post shows when displayed on its own.
pub const POST_LABEL_LEN: usize = 15;

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPost {
    pub text: String,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

/// Fields an edit replaces. An outer `None` leaves the column untouched,
/// so `image: None` keeps the stored image while `group_id: Some(None)` clears the group.
#[derive(AsChangeset, Clone, Debug)]
#[diesel(table_name = crate::schema::posts)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<Option<i32>>,
    pub image: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub text: String,
    pub created: DateTime<Utc>,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: String = self.text.chars().take(POST_LABEL_LEN).collect();
        f.write_str(&label)
    }
}

/// A post joined with its author and group, the shape every listing renders.
#[derive(Serialize, Debug, Clone)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author: User,
    pub group: Option<Group>,
}

/// Which posts a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i32),
    Author(i32),
    /// Posts by every author the given user follows.
    FollowedBy(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_first_fifteen_chars() {
        let post = Post {
            id: 1,
            text: "Съешь же ещё этих мягких французских булок".into(),
            created: Utc::now(),
            author_id: 1,
            group_id: None,
            image: None,
        };
        assert_eq!(post.to_string(), "Съешь же ещё эт");
    }
}
