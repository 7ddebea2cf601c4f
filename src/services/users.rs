use axum::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::models::user::*;
use crate::schema;

use super::{Pool, Svc};

#[async_trait]
pub trait UserService<E = anyhow::Error>: Svc {
    async fn get_user(&self, id: i32) -> Result<Option<User>, E>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, E>;
    async fn create_user(&self, user: &NewUser) -> Result<User, E>;
}

#[derive(Clone)]
pub struct UserServiceDb {
    db: Pool,
}

impl Svc for UserServiceDb {}

#[async_trait]
impl UserService<anyhow::Error> for UserServiceDb {
    async fn get_user(&self, user_id: i32) -> anyhow::Result<Option<User>> {
        use schema::users::dsl::*;

        let mut conn = self.db.get().await?;
        let user = users
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn find_by_username(&self, name: &str) -> anyhow::Result<Option<User>> {
        use schema::users::dsl::*;

        let mut conn = self.db.get().await?;
        let user = users
            .filter(username.eq(name))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn create_user(&self, u: &NewUser) -> anyhow::Result<User> {
        use schema::users::dsl::*;

        let mut conn = self.db.get().await?;

        let user = diesel::insert_into(users)
            .values(u)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await?;

        Ok(user)
    }
}

impl UserServiceDb {
    pub fn new(db: Pool) -> Self {
        Self { db }
    }
}
