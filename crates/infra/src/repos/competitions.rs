use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, QueryBuilder, Result as SqlxResult};
use uuid::Uuid;

use crate::{models::CompetitionRow, pagination::LimitOffset};

const COMPETITION_COLUMNS: &str =
    "id, name, information, date, active, ranking_active, img_url, url, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct CompetitionFilter {
    pub name: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub active_only: bool,
}

#[derive(Debug, Clone)]
pub struct CreateCompetitionData {
    pub name: String,
    pub information: Option<String>,
    pub date: DateTime<Utc>,
    pub active: bool,
    pub ranking_active: bool,
    pub img_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCompetitionData {
    pub name: Option<String>,
    pub information: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub ranking_active: Option<bool>,
    pub img_url: Option<String>,
    pub url: Option<String>,
}

fn push_filter(query: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &CompetitionFilter) {
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        query.push(" AND name ILIKE ");
        query.push_bind(format!("%{}%", name.trim()));
    }
    if let Some(from) = filter.from {
        query.push(" AND date >= ");
        query.push_bind(from);
    }
    if let Some(to) = filter.to {
        query.push(" AND date <= ");
        query.push_bind(to);
    }
    if filter.active_only {
        query.push(" AND active = TRUE");
    }
}

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    filter: &CompetitionFilter,
    page: Option<LimitOffset>,
) -> SqlxResult<Vec<CompetitionRow>> {
    let page = page.unwrap_or_default();

    let mut query =
        QueryBuilder::new(format!("SELECT {COMPETITION_COLUMNS} FROM competitions WHERE 1=1"));
    push_filter(&mut query, filter);
    query.push(" ORDER BY date ASC, id ASC");
    query.push(" LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset);

    query
        .build_query_as::<CompetitionRow>()
        .fetch_all(executor)
        .await
}

pub async fn count<'e>(
    executor: impl PgExecutor<'e>,
    filter: &CompetitionFilter,
) -> SqlxResult<i64> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM competitions WHERE 1=1");
    push_filter(&mut query, filter);
    query.build_query_scalar::<i64>().fetch_one(executor).await
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<CompetitionRow>> {
    let sql = format!("SELECT {COMPETITION_COLUMNS} FROM competitions WHERE id = $1");
    sqlx::query_as::<_, CompetitionRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn get_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<CompetitionRow>> {
    let sql = format!("SELECT {COMPETITION_COLUMNS} FROM competitions WHERE id = ANY($1::uuid[])");
    sqlx::query_as::<_, CompetitionRow>(&sql)
        .bind(ids)
        .fetch_all(executor)
        .await
}

/// Competitions that are both active and flagged for the season ranking.
pub async fn list_ranking<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<Vec<CompetitionRow>> {
    let sql = format!(
        "SELECT {COMPETITION_COLUMNS} FROM competitions \
         WHERE active = TRUE AND ranking_active = TRUE ORDER BY date ASC"
    );
    sqlx::query_as::<_, CompetitionRow>(&sql)
        .fetch_all(executor)
        .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: &CreateCompetitionData,
) -> SqlxResult<CompetitionRow> {
    let sql = format!(
        r#"
        INSERT INTO competitions (name, information, date, active, ranking_active, img_url, url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COMPETITION_COLUMNS}
        "#
    );
    sqlx::query_as::<_, CompetitionRow>(&sql)
        .bind(&data.name)
        .bind(&data.information)
        .bind(data.date)
        .bind(data.active)
        .bind(data.ranking_active)
        .bind(&data.img_url)
        .bind(&data.url)
        .fetch_one(executor)
        .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: &UpdateCompetitionData,
) -> SqlxResult<Option<CompetitionRow>> {
    let sql = format!(
        r#"
        UPDATE competitions
        SET name = COALESCE($2, name),
            information = COALESCE($3, information),
            date = COALESCE($4, date),
            active = COALESCE($5, active),
            ranking_active = COALESCE($6, ranking_active),
            img_url = COALESCE($7, img_url),
            url = COALESCE($8, url),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {COMPETITION_COLUMNS}
        "#
    );
    sqlx::query_as::<_, CompetitionRow>(&sql)
        .bind(id)
        .bind(&data.name)
        .bind(&data.information)
        .bind(data.date)
        .bind(data.active)
        .bind(data.ranking_active)
        .bind(&data.img_url)
        .bind(&data.url)
        .fetch_optional(executor)
        .await
}

/// Deletes a competition together with its buckets and registrations.
pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<u64> {
    let result = sqlx::query("DELETE FROM competitions WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
