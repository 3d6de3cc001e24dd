use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::ResultRow;

const RESULT_SELECT: &str = r#"
    SELECT r.id AS registration_id,
           c.id AS competition_id,
           c.name AS competition_name,
           c.date AS competition_date,
           p.id AS person_id,
           p.first_name,
           p.last_name,
           p.gender,
           p.club_id,
           cpc.id AS competition_per_category_id,
           cpc.distance_name,
           cpc.distance_in_km,
           ac.id AS age_category_id,
           ac.name AS age_category_name,
           r.run_number,
           r.run_time_ms
    FROM registrations r
    JOIN competitions c ON c.id = r.competition_id
    JOIN persons p ON p.id = r.person_id
    JOIN competition_per_categories cpc ON cpc.id = r.competition_per_category_id
    JOIN age_categories ac ON ac.id = cpc.age_category_id
    WHERE r.run_number IS NOT NULL AND r.run_time_ms IS NOT NULL
"#;

/// Timed registrations of a competition, fastest first.
pub async fn list_for_competition<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> SqlxResult<Vec<ResultRow>> {
    let sql = format!("{RESULT_SELECT} AND r.competition_id = $1 ORDER BY r.run_time_ms ASC, r.run_number ASC");
    sqlx::query_as::<_, ResultRow>(&sql)
        .bind(competition_id)
        .fetch_all(executor)
        .await
}

pub async fn list_for_person<'e>(
    executor: impl PgExecutor<'e>,
    person_id: Uuid,
) -> SqlxResult<Vec<ResultRow>> {
    let sql = format!("{RESULT_SELECT} AND r.person_id = $1 ORDER BY c.date DESC");
    sqlx::query_as::<_, ResultRow>(&sql)
        .bind(person_id)
        .fetch_all(executor)
        .await
}

/// Timed registrations of every active ranking competition, grouped by competition.
pub async fn list_for_ranking<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<Vec<ResultRow>> {
    let sql = format!(
        "{RESULT_SELECT} AND c.active = TRUE AND c.ranking_active = TRUE \
         ORDER BY c.date ASC, c.id ASC, r.run_time_ms ASC, r.run_number ASC"
    );
    sqlx::query_as::<_, ResultRow>(&sql).fetch_all(executor).await
}
