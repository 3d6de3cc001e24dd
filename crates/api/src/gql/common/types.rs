use async_graphql::{Enum, InputObject, OutputType, SimpleObject};

use crate::gql::domains::competitions::types::Competition;
use crate::gql::domains::persons::types::Person;
use infra::pagination::LimitOffset;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "admin" => Role::Admin,
            _ => Role::User, // Unknown roles get the least privileges
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum Gender {
    Male,
    Female,
}

impl From<infra::models::Gender> for Gender {
    fn from(gender: infra::models::Gender) -> Self {
        match gender {
            infra::models::Gender::Male => Gender::Male,
            infra::models::Gender::Female => Gender::Female,
        }
    }
}

impl From<Gender> for infra::models::Gender {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => infra::models::Gender::Male,
            Gender::Female => infra::models::Gender::Female,
        }
    }
}

impl Gender {
    pub fn as_code(&self) -> &'static str {
        infra::models::Gender::from(*self).as_code()
    }

    /// Rows only ever hold `M` or `V`; anything else is read as male.
    pub fn from_code(code: &str) -> Self {
        code.parse::<infra::models::Gender>()
            .map(Gender::from)
            .unwrap_or(Gender::Male)
    }
}

#[derive(InputObject, Clone, Copy, Debug, Default)]
pub struct PaginationInput {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl PaginationInput {
    pub fn to_limit_offset(&self) -> LimitOffset {
        LimitOffset::new(
            self.limit.unwrap_or(50) as i64,
            self.offset.unwrap_or(0) as i64,
        )
    }
}

#[derive(SimpleObject)]
#[graphql(concrete(name = "PaginatedCompetitions", params(Competition)))]
#[graphql(concrete(name = "PaginatedPersons", params(Person)))]
pub struct PaginatedResponse<T: OutputType> {
    pub items: Vec<T>,
    pub total_count: i32,
    pub page_size: i32,
    pub offset: i32,
    pub has_next_page: bool,
}

impl<T: OutputType> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total_count: i64, page: LimitOffset) -> Self {
        let page_size = items.len() as i32;
        let offset = page.offset as i32;
        Self {
            has_next_page: (page.offset + items.len() as i64) < total_count,
            items,
            total_count: total_count as i32,
            page_size,
            offset,
        }
    }
}
