use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

pub async fn revoke<'e>(
    executor: impl PgExecutor<'e>,
    jti: Uuid,
    expires_at: DateTime<Utc>,
) -> SqlxResult<()> {
    sqlx::query(
        r#"
        INSERT INTO revoked_tokens (jti, expires_at)
        VALUES ($1, $2)
        ON CONFLICT (jti) DO NOTHING
        "#,
    )
    .bind(jti)
    .bind(expires_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn is_revoked<'e>(executor: impl PgExecutor<'e>, jti: Uuid) -> SqlxResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
        .bind(jti)
        .fetch_one(executor)
        .await
}

/// Drops revocations whose token would have expired anyway.
pub async fn delete_expired<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<u64> {
    let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
