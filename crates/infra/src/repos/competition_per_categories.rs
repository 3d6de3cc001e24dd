use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, QueryBuilder, Result as SqlxResult};
use uuid::Uuid;

use crate::categories::BucketPlan;
use crate::models::CompetitionPerCategoryRow;

const BUCKET_COLUMNS: &str =
    "id, competition_id, age_category_id, distance_name, distance_in_km, gender, gun_time";

pub async fn insert_plan<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    plan: &[BucketPlan],
) -> SqlxResult<Vec<CompetitionPerCategoryRow>> {
    if plan.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::new(
        "INSERT INTO competition_per_categories \
         (competition_id, age_category_id, distance_name, distance_in_km, gender) ",
    );
    query.push_values(plan, |mut row, bucket| {
        row.push_bind(competition_id)
            .push_bind(bucket.age_category_id)
            .push_bind(&bucket.distance_name)
            .push_bind(bucket.distance_in_km)
            .push_bind(bucket.gender.as_code());
    });
    query.push(format!(" RETURNING {BUCKET_COLUMNS}"));

    query
        .build_query_as::<CompetitionPerCategoryRow>()
        .fetch_all(executor)
        .await
}

pub async fn list_by_competition<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> SqlxResult<Vec<CompetitionPerCategoryRow>> {
    sqlx::query_as::<_, CompetitionPerCategoryRow>(
        r#"
        SELECT cpc.id, cpc.competition_id, cpc.age_category_id, cpc.distance_name,
               cpc.distance_in_km, cpc.gender, cpc.gun_time
        FROM competition_per_categories cpc
        JOIN age_categories ac ON ac.id = cpc.age_category_id
        WHERE cpc.competition_id = $1
        ORDER BY cpc.distance_in_km ASC, ac.minimum_age ASC, cpc.gender ASC
        "#,
    )
    .bind(competition_id)
    .fetch_all(executor)
    .await
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<CompetitionPerCategoryRow>> {
    let sql = format!("SELECT {BUCKET_COLUMNS} FROM competition_per_categories WHERE id = $1");
    sqlx::query_as::<_, CompetitionPerCategoryRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn get_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<CompetitionPerCategoryRow>> {
    let sql = format!(
        "SELECT {BUCKET_COLUMNS} FROM competition_per_categories WHERE id = ANY($1::uuid[])"
    );
    sqlx::query_as::<_, CompetitionPerCategoryRow>(&sql)
        .bind(ids)
        .fetch_all(executor)
        .await
}

pub async fn find_by_parameters<'e>(
    executor: impl PgExecutor<'e>,
    age_category_id: Uuid,
    distance_name: &str,
    gender: &str,
    competition_id: Uuid,
) -> SqlxResult<Option<CompetitionPerCategoryRow>> {
    let sql = format!(
        r#"
        SELECT {BUCKET_COLUMNS}
        FROM competition_per_categories
        WHERE age_category_id = $1
          AND LOWER(distance_name) = LOWER($2)
          AND gender = $3
          AND competition_id = $4
        "#
    );
    sqlx::query_as::<_, CompetitionPerCategoryRow>(&sql)
        .bind(age_category_id)
        .bind(distance_name)
        .bind(gender)
        .bind(competition_id)
        .fetch_optional(executor)
        .await
}

pub async fn update_distance_km<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    distance_name: &str,
    distance_in_km: f32,
) -> SqlxResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE competition_per_categories
        SET distance_in_km = $3
        WHERE competition_id = $1 AND LOWER(distance_name) = LOWER($2)
        "#,
    )
    .bind(competition_id)
    .bind(distance_name)
    .bind(distance_in_km)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Sets the gun time on every bucket of a competition, or only on one distance.
pub async fn set_gun_time<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    gun_time: DateTime<Utc>,
    distance_name: Option<&str>,
) -> SqlxResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE competition_per_categories
        SET gun_time = $2
        WHERE competition_id = $1 AND ($3::text IS NULL OR LOWER(distance_name) = LOWER($3))
        "#,
    )
    .bind(competition_id)
    .bind(gun_time)
    .bind(distance_name)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<u64> {
    let result = sqlx::query("DELETE FROM competition_per_categories WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
