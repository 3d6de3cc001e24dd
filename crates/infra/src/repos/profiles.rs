use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::ProfileRow;

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    person_id: Uuid,
    role: &str,
) -> SqlxResult<ProfileRow> {
    sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles (person_id, role)
        VALUES ($1, $2)
        RETURNING id, person_id, role
        "#,
    )
    .bind(person_id)
    .bind(role)
    .fetch_one(executor)
    .await
}

pub async fn get_by_person<'e>(
    executor: impl PgExecutor<'e>,
    person_id: Uuid,
) -> SqlxResult<Option<ProfileRow>> {
    sqlx::query_as::<_, ProfileRow>(
        "SELECT id, person_id, role FROM profiles WHERE person_id = $1",
    )
    .bind(person_id)
    .fetch_optional(executor)
    .await
}

pub async fn get_by_person_ids<'e>(
    executor: impl PgExecutor<'e>,
    person_ids: &[Uuid],
) -> SqlxResult<Vec<ProfileRow>> {
    sqlx::query_as::<_, ProfileRow>(
        "SELECT id, person_id, role FROM profiles WHERE person_id = ANY($1)",
    )
    .bind(person_ids)
    .fetch_all(executor)
    .await
}

/// Sets the role, creating the profile when the person has none yet.
pub async fn upsert_role<'e>(
    executor: impl PgExecutor<'e>,
    person_id: Uuid,
    role: &str,
) -> SqlxResult<ProfileRow> {
    sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles (person_id, role)
        VALUES ($1, $2)
        ON CONFLICT (person_id) DO UPDATE SET role = EXCLUDED.role
        RETURNING id, person_id, role
        "#,
    )
    .bind(person_id)
    .bind(role)
    .fetch_one(executor)
    .await
}

/// Serializes the first-admin decision between concurrent registrations.
/// Held until the surrounding transaction ends.
pub async fn lock_admin_election<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext('profiles.first_admin'))")
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn any_admin<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM profiles WHERE role = 'admin')")
        .fetch_one(executor)
        .await
}
