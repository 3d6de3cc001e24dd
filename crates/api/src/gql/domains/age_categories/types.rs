use async_graphql::{InputObject, SimpleObject, ID};

#[derive(SimpleObject, Clone)]
pub struct AgeCategory {
    pub id: ID,
    pub name: String,
    pub minimum_age: i32,
    pub maximum_age: i32,
}

impl From<infra::models::AgeCategoryRow> for AgeCategory {
    fn from(row: infra::models::AgeCategoryRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            minimum_age: row.minimum_age,
            maximum_age: row.maximum_age,
        }
    }
}

#[derive(InputObject)]
pub struct CreateAgeCategoryInput {
    pub name: String,
    pub minimum_age: i32,
    pub maximum_age: i32,
}
