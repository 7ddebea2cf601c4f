use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use super::user::User;

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewComment {
    pub text: String,
    pub author_id: i32,
    pub post_id: i32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: i32,
    pub text: String,
    pub created: DateTime<Utc>,
    pub author_id: i32,
    pub post_id: i32,
}

#[derive(Serialize, Debug, Clone)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: User,
}
