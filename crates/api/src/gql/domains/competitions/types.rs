use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::gql::common::types::Gender;
use crate::gql::domains::age_categories::types::AgeCategory;
use crate::gql::error::GqlError;
use crate::gql::loaders::{AgeCategoryLoader, CompetitionLoader};
use crate::state::AppState;
use infra::repos::competition_per_categories;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Competition {
    pub id: ID,
    pub name: String,
    pub information: Option<String>,
    pub date: DateTime<Utc>,
    pub active: bool,
    pub ranking_active: bool,
    pub img_url: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[graphql(skip)]
    pub competition_id: Uuid,
}

impl From<infra::models::CompetitionRow> for Competition {
    fn from(row: infra::models::CompetitionRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            information: row.information,
            date: row.date,
            active: row.active,
            ranking_active: row.ranking_active,
            img_url: row.img_url,
            url: row.url,
            created_at: row.created_at,
            updated_at: row.updated_at,
            competition_id: row.id,
        }
    }
}

#[ComplexObject]
impl Competition {
    /// Result buckets of this competition.
    async fn categories(&self, ctx: &Context<'_>) -> Result<Vec<CompetitionPerCategory>> {
        let state = ctx.data::<AppState>()?;
        let rows = competition_per_categories::list_by_competition(&state.db, self.competition_id)
            .await
            .map_err(GqlError::from)?;
        Ok(rows.into_iter().map(CompetitionPerCategory::from).collect())
    }

    /// Distinct distances on offer, shortest first.
    async fn distances(&self, ctx: &Context<'_>) -> Result<Vec<Distance>> {
        let state = ctx.data::<AppState>()?;
        let rows = competition_per_categories::list_by_competition(&state.db, self.competition_id)
            .await
            .map_err(GqlError::from)?;

        let mut distances: Vec<Distance> = Vec::new();
        for row in rows {
            if !distances.iter().any(|d| d.name == row.distance_name) {
                distances.push(Distance {
                    name: row.distance_name,
                    km: row.distance_in_km as f64,
                });
            }
        }
        distances.sort_by(|a, b| a.km.total_cmp(&b.km));
        Ok(distances)
    }
}

#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct Distance {
    pub name: String,
    pub km: f64,
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct CompetitionPerCategory {
    pub id: ID,
    pub competition_id: ID,
    pub age_category_id: ID,
    pub distance_name: String,
    pub distance_in_km: f64,
    pub gender: Gender,
    pub gun_time: Option<DateTime<Utc>>,
    #[graphql(skip)]
    pub competition_uuid: Uuid,
    #[graphql(skip)]
    pub age_category_uuid: Uuid,
}

impl From<infra::models::CompetitionPerCategoryRow> for CompetitionPerCategory {
    fn from(row: infra::models::CompetitionPerCategoryRow) -> Self {
        Self {
            id: row.id.into(),
            competition_id: row.competition_id.into(),
            age_category_id: row.age_category_id.into(),
            distance_name: row.distance_name,
            distance_in_km: row.distance_in_km as f64,
            gender: Gender::from_code(&row.gender),
            gun_time: row.gun_time,
            competition_uuid: row.competition_id,
            age_category_uuid: row.age_category_id,
        }
    }
}

#[ComplexObject]
impl CompetitionPerCategory {
    async fn age_category(&self, ctx: &Context<'_>) -> Result<Option<AgeCategory>> {
        let loader = ctx.data::<DataLoader<AgeCategoryLoader>>()?;
        Ok(loader
            .load_one(self.age_category_uuid)
            .await?
            .map(AgeCategory::from))
    }

    async fn competition(&self, ctx: &Context<'_>) -> Result<Option<Competition>> {
        let loader = ctx.data::<DataLoader<CompetitionLoader>>()?;
        Ok(loader
            .load_one(self.competition_uuid)
            .await?
            .map(Competition::from))
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct DistanceInput {
    pub name: String,
    pub km: f64,
}

#[derive(InputObject, Default)]
pub struct CompetitionFilterInput {
    /// Case-insensitive part of the competition name.
    pub name: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub active_only: Option<bool>,
}

#[derive(InputObject)]
pub struct CreateCompetitionInput {
    pub name: String,
    pub information: Option<String>,
    pub date: DateTime<Utc>,
    pub active: Option<bool>,
    pub ranking_active: Option<bool>,
    pub img_url: Option<String>,
    pub url: Option<String>,
    pub distances: Vec<DistanceInput>,
}

#[derive(InputObject, Default)]
pub struct UpdateCompetitionInput {
    pub name: Option<String>,
    pub information: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub ranking_active: Option<bool>,
    pub img_url: Option<String>,
    pub url: Option<String>,
}
