use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::Claims;
use crate::gql::common::types::{Gender, Role};
use crate::gql::domains::clubs::types::Club;
use crate::gql::loaders::{ClubLoader, ProfileLoader};
use async_graphql::dataloader::DataLoader;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Person {
    pub id: ID,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub club_id: Option<ID>,
    pub user_id: ID,
    pub is_email_confirmed: bool,
    pub created_at: DateTime<Utc>,
    #[graphql(skip)]
    pub person_id: Uuid,
    #[graphql(skip)]
    pub club_uuid: Option<Uuid>,
    #[graphql(skip)]
    pub private_email: Option<String>,
    #[graphql(skip)]
    pub private_iban: Option<String>,
}

impl From<infra::models::PersonRow> for Person {
    fn from(row: infra::models::PersonRow) -> Self {
        Self {
            id: row.id.into(),
            first_name: row.first_name,
            last_name: row.last_name,
            birth_date: row.birth_date,
            gender: Gender::from_code(&row.gender),
            club_id: row.club_id.map(Into::into),
            user_id: row.user_id.into(),
            is_email_confirmed: row.is_email_confirmed,
            created_at: row.created_at,
            person_id: row.id,
            club_uuid: row.club_id,
            private_email: row.email,
            private_iban: row.iban_number,
        }
    }
}

impl Person {
    /// Contact and bank details are only shown to the person themself and to admins.
    /// The admin role is read from the stored profile, not from the token.
    async fn can_see_private(&self, ctx: &Context<'_>) -> Result<bool> {
        let Some(claims) = ctx.data_opt::<Claims>() else {
            return Ok(false);
        };
        if claims.sub == self.person_id.to_string() {
            return Ok(true);
        }
        if Role::from(claims.role.clone()) != Role::Admin {
            return Ok(false);
        }
        let Ok(caller) = Uuid::parse_str(&claims.sub) else {
            return Ok(false);
        };
        let profile = ctx
            .data::<DataLoader<ProfileLoader>>()?
            .load_one(caller)
            .await?;
        Ok(profile.is_some_and(|p| Role::from(p.role) == Role::Admin))
    }
}

#[ComplexObject]
impl Person {
    async fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    async fn email(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        Ok(self
            .can_see_private(ctx)
            .await?
            .then(|| self.private_email.clone())
            .flatten())
    }

    async fn iban_number(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        Ok(self
            .can_see_private(ctx)
            .await?
            .then(|| self.private_iban.clone())
            .flatten())
    }

    async fn club(&self, ctx: &Context<'_>) -> Result<Option<Club>> {
        let Some(club_id) = self.club_uuid else {
            return Ok(None);
        };
        let loader = ctx.data::<DataLoader<ClubLoader>>()?;
        Ok(loader.load_one(club_id).await?.map(Club::from))
    }
}

#[derive(SimpleObject, Clone)]
pub struct Profile {
    pub id: ID,
    pub person_id: ID,
    pub role: Role,
}

impl From<infra::models::ProfileRow> for Profile {
    fn from(row: infra::models::ProfileRow) -> Self {
        Self {
            id: row.id.into(),
            person_id: row.person_id.into(),
            role: Role::from(row.role),
        }
    }
}

#[derive(InputObject)]
pub struct CreatePersonInput {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub email: Option<String>,
    pub iban_number: Option<String>,
    pub club_id: Option<Uuid>,
}

#[derive(InputObject, Default)]
pub struct UpdatePersonInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub email: Option<String>,
    pub iban_number: Option<String>,
    pub club_id: Option<Uuid>,
}
