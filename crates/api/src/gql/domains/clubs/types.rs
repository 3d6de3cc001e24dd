use async_graphql::{InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::gql::domains::persons::types::Person;

#[derive(SimpleObject, Clone)]
pub struct Club {
    pub id: ID,
    pub name: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<infra::models::ClubRow> for Club {
    fn from(row: infra::models::ClubRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            logo: row.logo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct ClubWithMembers {
    pub club: Club,
    pub members: Vec<Person>,
}

#[derive(InputObject)]
pub struct CreateClubInput {
    pub name: String,
    /// Persons that become members of the new club.
    pub member_ids: Option<Vec<Uuid>>,
}

#[derive(InputObject)]
pub struct UpdateClubInput {
    pub name: Option<String>,
    /// When given, replaces the member list.
    pub member_ids: Option<Vec<Uuid>>,
}
