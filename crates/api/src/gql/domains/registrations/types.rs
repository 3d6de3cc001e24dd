use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::gql::domains::competitions::types::{Competition, CompetitionPerCategory};
use crate::gql::domains::persons::types::Person;
use crate::gql::loaders::{CompetitionLoader, CompetitionPerCategoryLoader, PersonLoader};
use crate::gql::scalars::RunTime;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Registration {
    pub id: ID,
    pub person_id: ID,
    pub competition_id: ID,
    pub competition_per_category_id: ID,
    pub run_number: Option<i32>,
    pub run_time: Option<RunTime>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[graphql(skip)]
    pub person_uuid: Uuid,
    #[graphql(skip)]
    pub competition_uuid: Uuid,
    #[graphql(skip)]
    pub bucket_uuid: Uuid,
}

impl From<infra::models::RegistrationRow> for Registration {
    fn from(row: infra::models::RegistrationRow) -> Self {
        let run_time = row.run_time().map(RunTime::from);
        Self {
            id: row.id.into(),
            person_id: row.person_id.into(),
            competition_id: row.competition_id.into(),
            competition_per_category_id: row.competition_per_category_id.into(),
            run_number: row.run_number.map(i32::from),
            run_time,
            paid: row.paid,
            created_at: row.created_at,
            updated_at: row.updated_at,
            person_uuid: row.person_id,
            competition_uuid: row.competition_id,
            bucket_uuid: row.competition_per_category_id,
        }
    }
}

#[ComplexObject]
impl Registration {
    async fn person(&self, ctx: &Context<'_>) -> Result<Option<Person>> {
        let loader = ctx.data::<DataLoader<PersonLoader>>()?;
        Ok(loader.load_one(self.person_uuid).await?.map(Person::from))
    }

    async fn competition(&self, ctx: &Context<'_>) -> Result<Option<Competition>> {
        let loader = ctx.data::<DataLoader<CompetitionLoader>>()?;
        Ok(loader
            .load_one(self.competition_uuid)
            .await?
            .map(Competition::from))
    }

    /// The bucket (distance, age category and gender) this registration runs in.
    async fn competition_per_category(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Option<CompetitionPerCategory>> {
        let loader = ctx.data::<DataLoader<CompetitionPerCategoryLoader>>()?;
        Ok(loader
            .load_one(self.bucket_uuid)
            .await?
            .map(CompetitionPerCategory::from))
    }
}

#[derive(InputObject)]
pub struct SignInToContestInput {
    pub competition_id: Uuid,
    pub distance_name: String,
    /// Register someone else. Admin only; defaults to the caller.
    pub person_id: Option<Uuid>,
}

#[derive(InputObject, Default)]
pub struct RegistrationFilterInput {
    pub competition_id: Option<Uuid>,
    pub person_id: Option<Uuid>,
    /// Only registrations that already carry a run number.
    pub with_run_number: Option<bool>,
}

#[derive(InputObject, Default)]
pub struct UpdateRegistrationInput {
    /// New run number, or -1 to clear it.
    pub run_number: Option<i32>,
    pub paid: Option<bool>,
}
