use sqlx::{PgConnection, PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::{ClubRow, PersonRow};
use crate::repos::persons::PERSON_COLUMNS;

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<Vec<ClubRow>> {
    sqlx::query_as::<_, ClubRow>(
        r#"
        SELECT id, name, logo, created_at, updated_at
        FROM clubs
        ORDER BY name ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<ClubRow>> {
    sqlx::query_as::<_, ClubRow>(
        r#"
        SELECT id, name, logo, created_at, updated_at
        FROM clubs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_by_ids<'e>(executor: impl PgExecutor<'e>, ids: &[Uuid]) -> SqlxResult<Vec<ClubRow>> {
    sqlx::query_as::<_, ClubRow>(
        r#"
        SELECT id, name, logo, created_at, updated_at
        FROM clubs
        WHERE id = ANY($1::uuid[])
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

pub async fn exists_by_name<'e>(
    executor: impl PgExecutor<'e>,
    name: &str,
    excluding: Option<Uuid>,
) -> SqlxResult<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM clubs
            WHERE LOWER(name) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(name)
    .bind(excluding)
    .fetch_one(executor)
    .await
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, name: &str) -> SqlxResult<ClubRow> {
    sqlx::query_as::<_, ClubRow>(
        r#"
        INSERT INTO clubs (name)
        VALUES ($1)
        RETURNING id, name, logo, created_at, updated_at
        "#,
    )
    .bind(name)
    .fetch_one(executor)
    .await
}

pub async fn update_name<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    name: Option<&str>,
) -> SqlxResult<Option<ClubRow>> {
    sqlx::query_as::<_, ClubRow>(
        r#"
        UPDATE clubs
        SET name = COALESCE($2, name),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, logo, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_optional(executor)
    .await
}

pub async fn set_logo<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    logo: &str,
) -> SqlxResult<Option<ClubRow>> {
    sqlx::query_as::<_, ClubRow>(
        r#"
        UPDATE clubs
        SET logo = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, logo, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(logo)
    .fetch_optional(executor)
    .await
}

/// Deletes a club. Members keep their person record with `club_id` cleared.
pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<u64> {
    let result = sqlx::query("DELETE FROM clubs WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn list_members<'e>(
    executor: impl PgExecutor<'e>,
    club_id: Uuid,
) -> SqlxResult<Vec<PersonRow>> {
    let sql = format!(
        "SELECT {PERSON_COLUMNS} FROM persons WHERE club_id = $1 ORDER BY last_name, first_name"
    );
    sqlx::query_as::<_, PersonRow>(&sql)
        .bind(club_id)
        .fetch_all(executor)
        .await
}

/// Makes `member_ids` the exact member list of the club.
pub async fn replace_members(
    conn: &mut PgConnection,
    club_id: Uuid,
    member_ids: &[Uuid],
) -> SqlxResult<()> {
    sqlx::query(
        r#"
        UPDATE persons
        SET club_id = NULL, updated_at = NOW()
        WHERE club_id = $1 AND NOT (id = ANY($2::uuid[]))
        "#,
    )
    .bind(club_id)
    .bind(member_ids)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        UPDATE persons
        SET club_id = $1, updated_at = NOW()
        WHERE id = ANY($2::uuid[])
        "#,
    )
    .bind(club_id)
    .bind(member_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
