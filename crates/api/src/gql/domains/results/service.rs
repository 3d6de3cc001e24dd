use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use infra::models::{RegistrationRow, ResultRow};
use infra::repos::{competition_per_categories, registrations, results};
use infra::run_time::RunTime;

use super::types::ResultRecordedEvent;
use crate::gql::common::helpers::{get_competition, get_person};
use crate::gql::error::GqlError;
use crate::gql::subscriptions::publish_result_recorded;
use crate::services::{CacheKey, ResultsCache};

/// A result row with its standing.
#[derive(Debug, Clone)]
pub struct RankedResult {
    pub row: ResultRow,
    pub overall_rank: i32,
    pub category_rank: i32,
}

/// Assigns overall ranks per competition and distance, and category ranks per bucket.
///
/// Equal times share a place and the next place is skipped (1, 1, 3).
/// The input order is kept.
pub fn rank_results(rows: Vec<ResultRow>) -> Vec<RankedResult> {
    let mut overall: HashMap<(Uuid, &str), Vec<i64>> = HashMap::new();
    let mut category: HashMap<Uuid, Vec<i64>> = HashMap::new();
    for row in &rows {
        overall
            .entry((row.competition_id, row.distance_name.as_str()))
            .or_default()
            .push(row.run_time_ms);
        category
            .entry(row.competition_per_category_id)
            .or_default()
            .push(row.run_time_ms);
    }
    for times in overall.values_mut().chain(category.values_mut()) {
        times.sort_unstable();
    }

    let ranks: Vec<(i32, i32)> = rows
        .iter()
        .map(|row| {
            let overall_rank = place(
                overall.get(&(row.competition_id, row.distance_name.as_str())),
                row.run_time_ms,
            );
            let category_rank = place(
                category.get(&row.competition_per_category_id),
                row.run_time_ms,
            );
            (overall_rank, category_rank)
        })
        .collect();
    drop(overall);

    rows.into_iter()
        .zip(ranks)
        .map(|(row, (overall_rank, category_rank))| RankedResult {
            row,
            overall_rank,
            category_rank,
        })
        .collect()
}

fn place(sorted_times: Option<&Vec<i64>>, time: i64) -> i32 {
    sorted_times.map_or(1, |times| times.partition_point(|t| *t < time) as i32 + 1)
}

pub async fn competition_results(
    pool: &sqlx::PgPool,
    cache: &ResultsCache,
    competition_id: Uuid,
) -> Result<Arc<Vec<RankedResult>>, GqlError> {
    let key = CacheKey::Competition(competition_id);
    if let Some(cached) = cache.get(key) {
        return Ok(cached);
    }

    get_competition(pool, competition_id).await?;
    let rows = results::list_for_competition(pool, competition_id).await?;
    Ok(cache.insert(key, rank_results(rows)))
}

/// Results of every competition that counts for the season ranking.
pub async fn ranking_results(
    pool: &sqlx::PgPool,
    cache: &ResultsCache,
) -> Result<Arc<Vec<RankedResult>>, GqlError> {
    if let Some(cached) = cache.get(CacheKey::Ranking) {
        return Ok(cached);
    }

    let rows = results::list_for_ranking(pool).await?;
    Ok(cache.insert(CacheKey::Ranking, rank_results(rows)))
}

/// A person's results, most recent competition first, ranked against the full field.
pub async fn person_results(
    pool: &sqlx::PgPool,
    cache: &ResultsCache,
    person_id: Uuid,
) -> Result<Vec<RankedResult>, GqlError> {
    get_person(pool, person_id).await?;
    let rows = results::list_for_person(pool, person_id).await?;

    let mut ranked = Vec::with_capacity(rows.len());
    for row in rows {
        let field = competition_results(pool, cache, row.competition_id).await?;
        if let Some(result) = field
            .iter()
            .find(|r| r.row.registration_id == row.registration_id)
        {
            ranked.push(result.clone());
        }
    }
    Ok(ranked)
}

/// Run numbers are positive and fit the stored column.
pub fn parse_run_number(run_number: i32) -> Result<i16, GqlError> {
    i16::try_from(run_number)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| GqlError::invalid(format!("Invalid run number: {run_number}")))
}

/// Sets or clears the run time of one registration.
pub async fn record_run_time(
    pool: &sqlx::PgPool,
    cache: &ResultsCache,
    registration_id: Uuid,
    run_time: Option<RunTime>,
) -> Result<RegistrationRow, GqlError> {
    let row = registrations::set_run_time(pool, registration_id, run_time.map(|t| t.as_millis()))
        .await?
        .ok_or_else(|| GqlError::not_found("Registration not found"))?;

    result_changed(cache, &row);
    Ok(row)
}

/// Records a finish line time; the run time is measured from the bucket's gun time.
pub async fn record_finish(
    pool: &sqlx::PgPool,
    cache: &ResultsCache,
    competition_id: Uuid,
    run_number: i32,
    finish_time: DateTime<Utc>,
) -> Result<RegistrationRow, GqlError> {
    let run_number = parse_run_number(run_number)?;
    let registration = registrations::find_by_run_number(pool, competition_id, run_number)
        .await?
        .ok_or_else(|| {
            GqlError::not_found(format!("No registration with run number {run_number}"))
        })?;

    let bucket = competition_per_categories::get_by_id(pool, registration.competition_per_category_id)
        .await?
        .ok_or_else(|| GqlError::not_found("This competition per category doesn't exist"))?;
    let gun_time = bucket.gun_time.ok_or_else(|| {
        GqlError::invalid(format!(
            "No gun time has been set for distance {}",
            bucket.distance_name
        ))
    })?;

    let run_time = RunTime::between(gun_time, finish_time)
        .map_err(|_| GqlError::invalid("Finish time is before the gun time"))?;

    record_run_time(pool, cache, registration.id, Some(run_time)).await
}

/// Records many run times by run number. Nothing is stored when one of them fails.
pub async fn record_run_times_bulk(
    pool: &sqlx::PgPool,
    cache: &ResultsCache,
    competition_id: Uuid,
    entries: &[(i32, RunTime)],
) -> Result<Vec<RegistrationRow>, GqlError> {
    let mut tx = pool.begin().await?;

    let mut updated = Vec::with_capacity(entries.len());
    for (run_number, run_time) in entries {
        let run_number = parse_run_number(*run_number)?;
        let registration = registrations::find_by_run_number(&mut *tx, competition_id, run_number)
            .await?
            .ok_or_else(|| {
                GqlError::not_found(format!("No registration with run number {run_number}"))
            })?;
        let row = registrations::set_run_time(&mut *tx, registration.id, Some(run_time.as_millis()))
            .await?
            .ok_or_else(|| GqlError::not_found("Registration not found"))?;
        updated.push(row);
    }

    tx.commit().await?;

    tracing::info!(%competition_id, count = updated.len(), "Run times recorded");
    for row in &updated {
        result_changed(cache, row);
    }
    Ok(updated)
}

fn result_changed(cache: &ResultsCache, row: &RegistrationRow) {
    cache.invalidate_competition(row.competition_id);
    publish_result_recorded(ResultRecordedEvent {
        competition_id: row.competition_id.into(),
        registration_id: row.id.into(),
        run_number: row.run_number.map(i32::from),
        run_time: row.run_time().map(Into::into),
        recorded_at: Utc::now(),
    });
}
