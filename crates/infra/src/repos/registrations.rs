use sqlx::{PgExecutor, QueryBuilder, Result as SqlxResult};
use uuid::Uuid;

use crate::models::RegistrationRow;

const REGISTRATION_COLUMNS: &str = "id, person_id, competition_id, competition_per_category_id, \
     run_number, run_time_ms, paid, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    pub competition_id: Option<Uuid>,
    pub person_id: Option<Uuid>,
    pub with_run_number: bool,
}

#[derive(Debug, Clone)]
pub struct CreateRegistrationData {
    pub person_id: Uuid,
    pub competition_id: Uuid,
    pub competition_per_category_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunNumberChange {
    #[default]
    Keep,
    Clear,
    Set(i16),
}

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    filter: &RegistrationFilter,
) -> SqlxResult<Vec<RegistrationRow>> {
    let mut query =
        QueryBuilder::new(format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE 1=1"));

    if let Some(competition_id) = filter.competition_id {
        query.push(" AND competition_id = ");
        query.push_bind(competition_id);
    }
    if let Some(person_id) = filter.person_id {
        query.push(" AND person_id = ");
        query.push_bind(person_id);
    }
    if filter.with_run_number {
        query.push(" AND run_number IS NOT NULL");
    }
    query.push(" ORDER BY run_number ASC NULLS LAST, created_at ASC");

    query
        .build_query_as::<RegistrationRow>()
        .fetch_all(executor)
        .await
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<RegistrationRow>> {
    let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1");
    sqlx::query_as::<_, RegistrationRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn get_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<RegistrationRow>> {
    let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = ANY($1::uuid[])");
    sqlx::query_as::<_, RegistrationRow>(&sql)
        .bind(ids)
        .fetch_all(executor)
        .await
}

pub async fn exists_for_person<'e>(
    executor: impl PgExecutor<'e>,
    person_id: Uuid,
    competition_id: Uuid,
) -> SqlxResult<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM registrations WHERE person_id = $1 AND competition_id = $2
        )
        "#,
    )
    .bind(person_id)
    .bind(competition_id)
    .fetch_one(executor)
    .await
}

pub async fn run_number_taken<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    run_number: i16,
    excluding: Uuid,
) -> SqlxResult<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM registrations
            WHERE competition_id = $1 AND run_number = $2 AND id <> $3
        )
        "#,
    )
    .bind(competition_id)
    .bind(run_number)
    .bind(excluding)
    .fetch_one(executor)
    .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: &CreateRegistrationData,
) -> SqlxResult<RegistrationRow> {
    let sql = format!(
        r#"
        INSERT INTO registrations (person_id, competition_id, competition_per_category_id, paid)
        VALUES ($1, $2, $3, FALSE)
        RETURNING {REGISTRATION_COLUMNS}
        "#
    );
    sqlx::query_as::<_, RegistrationRow>(&sql)
        .bind(data.person_id)
        .bind(data.competition_id)
        .bind(data.competition_per_category_id)
        .fetch_one(executor)
        .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    run_number: RunNumberChange,
    paid: Option<bool>,
) -> SqlxResult<Option<RegistrationRow>> {
    let (change_run_number, new_run_number) = match run_number {
        RunNumberChange::Keep => (false, None),
        RunNumberChange::Clear => (true, None),
        RunNumberChange::Set(n) => (true, Some(n)),
    };

    let sql = format!(
        r#"
        UPDATE registrations
        SET run_number = CASE WHEN $2 THEN $3 ELSE run_number END,
            paid = COALESCE($4, paid),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {REGISTRATION_COLUMNS}
        "#
    );
    sqlx::query_as::<_, RegistrationRow>(&sql)
        .bind(id)
        .bind(change_run_number)
        .bind(new_run_number)
        .bind(paid)
        .fetch_optional(executor)
        .await
}

pub async fn set_bucket<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    competition_per_category_id: Uuid,
) -> SqlxResult<Option<RegistrationRow>> {
    let sql = format!(
        r#"
        UPDATE registrations
        SET competition_per_category_id = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {REGISTRATION_COLUMNS}
        "#
    );
    sqlx::query_as::<_, RegistrationRow>(&sql)
        .bind(id)
        .bind(competition_per_category_id)
        .fetch_optional(executor)
        .await
}

pub async fn set_run_time<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    run_time_ms: Option<i64>,
) -> SqlxResult<Option<RegistrationRow>> {
    let sql = format!(
        r#"
        UPDATE registrations
        SET run_time_ms = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {REGISTRATION_COLUMNS}
        "#
    );
    sqlx::query_as::<_, RegistrationRow>(&sql)
        .bind(id)
        .bind(run_time_ms)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_run_number<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    run_number: i16,
) -> SqlxResult<Option<RegistrationRow>> {
    let sql = format!(
        "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE competition_id = $1 AND run_number = $2"
    );
    sqlx::query_as::<_, RegistrationRow>(&sql)
        .bind(competition_id)
        .bind(run_number)
        .fetch_optional(executor)
        .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<u64> {
    let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
