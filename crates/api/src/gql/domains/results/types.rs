use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::service::RankedResult;
use crate::gql::common::types::Gender;
use crate::gql::domains::competitions::types::CompetitionPerCategory;
use crate::gql::domains::persons::types::Person;
use crate::gql::domains::registrations::types::Registration;
use crate::gql::loaders::{CompetitionPerCategoryLoader, PersonLoader, RegistrationLoader};
use crate::gql::scalars::RunTime;

/// A timed registration with its place overall and inside its bucket.
#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ResultEntry {
    pub registration_id: ID,
    pub competition_id: ID,
    pub competition_name: String,
    pub competition_date: DateTime<Utc>,
    pub person_id: ID,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub club_id: Option<ID>,
    pub competition_per_category_id: ID,
    pub distance_name: String,
    pub distance_in_km: f64,
    pub age_category_id: ID,
    pub age_category_name: String,
    pub run_number: i32,
    pub run_time: RunTime,
    /// Place among everyone who ran the same distance.
    pub overall_rank: i32,
    /// Place inside the distance, age category and gender bucket.
    pub category_rank: i32,
    #[graphql(skip)]
    pub registration_uuid: Uuid,
    #[graphql(skip)]
    pub person_uuid: Uuid,
    #[graphql(skip)]
    pub bucket_uuid: Uuid,
}

impl From<&RankedResult> for ResultEntry {
    fn from(result: &RankedResult) -> Self {
        let row = &result.row;
        Self {
            registration_id: row.registration_id.into(),
            competition_id: row.competition_id.into(),
            competition_name: row.competition_name.clone(),
            competition_date: row.competition_date,
            person_id: row.person_id.into(),
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            gender: Gender::from_code(&row.gender),
            club_id: row.club_id.map(Into::into),
            competition_per_category_id: row.competition_per_category_id.into(),
            distance_name: row.distance_name.clone(),
            distance_in_km: row.distance_in_km as f64,
            age_category_id: row.age_category_id.into(),
            age_category_name: row.age_category_name.clone(),
            run_number: i32::from(row.run_number),
            run_time: infra::run_time::RunTime::from_millis(row.run_time_ms).into(),
            overall_rank: result.overall_rank,
            category_rank: result.category_rank,
            registration_uuid: row.registration_id,
            person_uuid: row.person_id,
            bucket_uuid: row.competition_per_category_id,
        }
    }
}

#[ComplexObject]
impl ResultEntry {
    async fn registration(&self, ctx: &Context<'_>) -> Result<Option<Registration>> {
        let loader = ctx.data::<DataLoader<RegistrationLoader>>()?;
        Ok(loader
            .load_one(self.registration_uuid)
            .await?
            .map(Registration::from))
    }

    async fn person(&self, ctx: &Context<'_>) -> Result<Option<Person>> {
        let loader = ctx.data::<DataLoader<PersonLoader>>()?;
        Ok(loader.load_one(self.person_uuid).await?.map(Person::from))
    }

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
pub struct RunTimeEntryInput {
    pub run_number: i32,
    pub run_time: RunTime,
}

/// Sent to `resultRecorded` subscribers whenever a run time is set or cleared.
#[derive(SimpleObject, Clone, Debug)]
pub struct ResultRecordedEvent {
    pub competition_id: ID,
    pub registration_id: ID,
    pub run_number: Option<i32>,
    /// Absent when the run time was cleared.
    pub run_time: Option<RunTime>,
    pub recorded_at: DateTime<Utc>,
}
