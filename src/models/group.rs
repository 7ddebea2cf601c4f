use std::fmt;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Group {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_title() {
        let group = Group {
            id: 3,
            title: "Rustaceans".into(),
            slug: "rust".into(),
            description: "crabs".into(),
        };
        assert_eq!(group.to_string(), "Rustaceans");
    }
}
