use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::AgeCategoryRow;

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<Vec<AgeCategoryRow>> {
    sqlx::query_as::<_, AgeCategoryRow>(
        r#"
        SELECT id, name, minimum_age, maximum_age
        FROM age_categories
        ORDER BY minimum_age ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<AgeCategoryRow>> {
    sqlx::query_as::<_, AgeCategoryRow>(
        "SELECT id, name, minimum_age, maximum_age FROM age_categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<AgeCategoryRow>> {
    sqlx::query_as::<_, AgeCategoryRow>(
        "SELECT id, name, minimum_age, maximum_age FROM age_categories WHERE id = ANY($1::uuid[])",
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

pub async fn find_for_age<'e>(
    executor: impl PgExecutor<'e>,
    age: i32,
) -> SqlxResult<Option<AgeCategoryRow>> {
    sqlx::query_as::<_, AgeCategoryRow>(
        r#"
        SELECT id, name, minimum_age, maximum_age
        FROM age_categories
        WHERE minimum_age <= $1 AND maximum_age >= $1
        ORDER BY minimum_age ASC
        LIMIT 1
        "#,
    )
    .bind(age)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    name: &str,
    minimum_age: i32,
    maximum_age: i32,
) -> SqlxResult<AgeCategoryRow> {
    sqlx::query_as::<_, AgeCategoryRow>(
        r#"
        INSERT INTO age_categories (name, minimum_age, maximum_age)
        VALUES ($1, $2, $3)
        RETURNING id, name, minimum_age, maximum_age
        "#,
    )
    .bind(name)
    .bind(minimum_age)
    .bind(maximum_age)
    .fetch_one(executor)
    .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<u64> {
    let result = sqlx::query("DELETE FROM age_categories WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
