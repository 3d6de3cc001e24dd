use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, QueryBuilder, Result as SqlxResult};
use uuid::Uuid;

use crate::models::{PersonCredentialsRow, PersonRow};
use crate::pagination::LimitOffset;

pub(crate) const PERSON_COLUMNS: &str = "id, first_name, last_name, birth_date, gender, email, \
     iban_number, club_id, user_id, is_email_confirmed, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct PersonFilter {
    pub search: Option<String>,
    pub club_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CreatePersonData {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub email: Option<String>,
    pub iban_number: Option<String>,
    pub club_id: Option<Uuid>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePersonData {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub iban_number: Option<String>,
    pub club_id: Option<Uuid>,
}

fn push_filter(query: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &PersonFilter) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim().to_lowercase());
        query.push(" AND (LOWER(first_name) LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR LOWER(last_name) LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR LOWER(COALESCE(email, '')) LIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    if let Some(club_id) = filter.club_id {
        query.push(" AND club_id = ");
        query.push_bind(club_id);
    }
}

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    filter: &PersonFilter,
    page: Option<LimitOffset>,
) -> SqlxResult<Vec<PersonRow>> {
    let page = page.unwrap_or_default();

    let mut query = QueryBuilder::new(format!("SELECT {PERSON_COLUMNS} FROM persons WHERE 1=1"));
    push_filter(&mut query, filter);
    query.push(" ORDER BY last_name ASC, first_name ASC, id ASC");
    query.push(" LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset);

    query.build_query_as::<PersonRow>().fetch_all(executor).await
}

pub async fn count<'e>(executor: impl PgExecutor<'e>, filter: &PersonFilter) -> SqlxResult<i64> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM persons WHERE 1=1");
    push_filter(&mut query, filter);
    query.build_query_scalar::<i64>().fetch_one(executor).await
}

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<PersonRow>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = $1");
    sqlx::query_as::<_, PersonRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn get_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<PersonRow>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ANY($1::uuid[])");
    sqlx::query_as::<_, PersonRow>(&sql)
        .bind(ids)
        .fetch_all(executor)
        .await
}

pub async fn get_by_email<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
) -> SqlxResult<Option<PersonRow>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE LOWER(email) = LOWER($1)");
    sqlx::query_as::<_, PersonRow>(&sql)
        .bind(email)
        .fetch_optional(executor)
        .await
}

pub async fn email_exists<'e>(executor: impl PgExecutor<'e>, email: &str) -> SqlxResult<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM persons WHERE LOWER(email) = LOWER($1))",
    )
    .bind(email)
    .fetch_one(executor)
    .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: &CreatePersonData,
) -> SqlxResult<PersonRow> {
    let sql = format!(
        r#"
        INSERT INTO persons (first_name, last_name, birth_date, gender, email, iban_number, club_id, password_hash)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PERSON_COLUMNS}
        "#
    );
    sqlx::query_as::<_, PersonRow>(&sql)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.birth_date)
        .bind(&data.gender)
        .bind(&data.email)
        .bind(&data.iban_number)
        .bind(data.club_id)
        .bind(&data.password_hash)
        .fetch_one(executor)
        .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: &UpdatePersonData,
) -> SqlxResult<Option<PersonRow>> {
    let sql = format!(
        r#"
        UPDATE persons
        SET first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            birth_date = COALESCE($4, birth_date),
            gender = COALESCE($5, gender),
            email = COALESCE($6, email),
            is_email_confirmed = CASE
                WHEN $6 IS NULL OR LOWER($6) = LOWER(email) THEN is_email_confirmed
                ELSE FALSE
            END,
            confirmation_token_hash = CASE
                WHEN $6 IS NULL OR LOWER($6) = LOWER(email) THEN confirmation_token_hash
                ELSE NULL
            END,
            iban_number = COALESCE($7, iban_number),
            club_id = COALESCE($8, club_id),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {PERSON_COLUMNS}
        "#
    );
    sqlx::query_as::<_, PersonRow>(&sql)
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.birth_date)
        .bind(&data.gender)
        .bind(&data.email)
        .bind(&data.iban_number)
        .bind(data.club_id)
        .fetch_optional(executor)
        .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<u64> {
    let result = sqlx::query("DELETE FROM persons WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn credentials_by_email<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
) -> SqlxResult<Option<PersonCredentialsRow>> {
    sqlx::query_as::<_, PersonCredentialsRow>(
        r#"
        SELECT p.id, p.email, p.password_hash, COALESCE(pr.role, 'user') AS role
        FROM persons p
        LEFT JOIN profiles pr ON pr.person_id = p.id
        WHERE LOWER(p.email) = LOWER($1)
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn credentials_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<PersonCredentialsRow>> {
    sqlx::query_as::<_, PersonCredentialsRow>(
        r#"
        SELECT p.id, p.email, p.password_hash, COALESCE(pr.role, 'user') AS role
        FROM persons p
        LEFT JOIN profiles pr ON pr.person_id = p.id
        WHERE p.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn set_password_hash<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    password_hash: &str,
) -> SqlxResult<u64> {
    let result = sqlx::query(
        "UPDATE persons SET password_hash = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(password_hash)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Stores a hashed reset token. Returns `false` when no person has that email.
pub async fn set_password_reset_token<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> SqlxResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE persons
        SET password_reset_token_hash = $2, password_reset_expires_at = $3, updated_at = NOW()
        WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(email)
    .bind(token_hash)
    .bind(expires_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Swaps in a new password when the reset token matches and has not expired.
/// The token is consumed in the same statement.
pub async fn reset_password_with_token<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
    token_hash: &str,
    password_hash: &str,
) -> SqlxResult<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE persons
        SET password_hash = $3,
            password_reset_token_hash = NULL,
            password_reset_expires_at = NULL,
            updated_at = NOW()
        WHERE LOWER(email) = LOWER($1)
          AND password_reset_token_hash = $2
          AND password_reset_expires_at > NOW()
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(token_hash)
    .bind(password_hash)
    .fetch_optional(executor)
    .await
}

pub async fn set_confirmation_token<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
    token_hash: &str,
) -> SqlxResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE persons
        SET confirmation_token_hash = $2, updated_at = NOW()
        WHERE LOWER(email) = LOWER($1) AND is_email_confirmed = FALSE
        "#,
    )
    .bind(email)
    .bind(token_hash)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn confirm_email<'e>(
    executor: impl PgExecutor<'e>,
    token_hash: &str,
) -> SqlxResult<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE persons
        SET is_email_confirmed = TRUE, confirmation_token_hash = NULL, updated_at = NOW()
        WHERE confirmation_token_hash = $1
        RETURNING id
        "#,
    )
    .bind(token_hash)
    .fetch_optional(executor)
    .await
}
