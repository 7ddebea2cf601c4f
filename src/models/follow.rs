use diesel::prelude::*;

#[derive(Insertable, Clone, Copy, Debug)]
#[diesel(table_name = crate::schema::follows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFollow {
    pub user_id: i32,
    pub author_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::follows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Follow {
    pub id: i32,
    pub user_id: i32,
    pub author_id: i32,
}
