use uuid::Uuid;

use infra::models::{CompetitionPerCategoryRow, CompetitionRow, PersonRow, RegistrationRow};
use infra::repos::{
    age_categories, competition_per_categories, registrations, CreateRegistrationData,
    RunNumberChange,
};

use crate::gql::common::helpers::{get_competition, get_person};
use crate::gql::domains::age_categories::resolvers::no_category_for_age;
use crate::gql::domains::competitions::buckets::BUCKET_NOT_FOUND;
use crate::gql::error::{is_unique_violation, GqlError};
use crate::services::ResultsCache;

pub(crate) const REGISTRATION_EXISTS: &str = "This registration already exists";
const RUN_NUMBER_TAKEN: &str = "This run number is already used in this competition";

/// Parameters for signing a person up (parsed by the resolver).
pub struct SignInParams {
    pub person_id: Uuid,
    pub competition_id: Uuid,
    pub distance_name: String,
}

/// Finds the bucket matching the person's age on race day, their gender and the distance.
pub async fn resolve_bucket(
    pool: &sqlx::PgPool,
    person: &PersonRow,
    competition: &CompetitionRow,
    distance_name: &str,
) -> Result<CompetitionPerCategoryRow, GqlError> {
    let age = person.age_on(competition.date.date_naive());
    let category = age_categories::find_for_age(pool, age)
        .await?
        .ok_or_else(|| no_category_for_age(age))?;

    competition_per_categories::find_by_parameters(
        pool,
        category.id,
        distance_name.trim(),
        &person.gender,
        competition.id,
    )
    .await?
    .ok_or_else(|| GqlError::not_found(BUCKET_NOT_FOUND))
}

/// Register a person for a competition.
///
/// The caller (resolver) is responsible for:
/// - Authentication / authorization
/// - Cache invalidation
pub async fn sign_in_to_contest(
    pool: &sqlx::PgPool,
    params: SignInParams,
) -> Result<RegistrationRow, GqlError> {
    if registrations::exists_for_person(pool, params.person_id, params.competition_id).await? {
        return Err(GqlError::conflict(REGISTRATION_EXISTS));
    }

    let competition = get_competition(pool, params.competition_id).await?;
    if !competition.active {
        return Err(GqlError::invalid("This competition is not open for registration"));
    }

    let person = get_person(pool, params.person_id).await?;
    let bucket = resolve_bucket(pool, &person, &competition, &params.distance_name).await?;

    let data = CreateRegistrationData {
        person_id: person.id,
        competition_id: competition.id,
        competition_per_category_id: bucket.id,
    };
    // A concurrent sign-in for the same person loses on the unique constraint.
    let registration = registrations::create(pool, &data).await.map_err(|e| {
        if is_unique_violation(&e) {
            GqlError::conflict(REGISTRATION_EXISTS)
        } else {
            e.into()
        }
    })?;

    tracing::info!(
        registration_id = %registration.id,
        person_id = %person.id,
        competition_id = %competition.id,
        distance = %bucket.distance_name,
        "Registration created"
    );
    Ok(registration)
}

/// Interprets the run number argument: absent keeps it, -1 clears it.
pub fn run_number_change(run_number: Option<i32>) -> Result<RunNumberChange, GqlError> {
    match run_number {
        None => Ok(RunNumberChange::Keep),
        Some(-1) => Ok(RunNumberChange::Clear),
        Some(n) if (1..=i32::from(i16::MAX)).contains(&n) => Ok(RunNumberChange::Set(n as i16)),
        Some(n) => Err(GqlError::invalid(format!("Invalid run number: {n}"))),
    }
}

pub async fn update_registration(
    pool: &sqlx::PgPool,
    cache: &ResultsCache,
    id: Uuid,
    run_number: Option<i32>,
    paid: Option<bool>,
) -> Result<RegistrationRow, GqlError> {
    let change = run_number_change(run_number)?;
    let existing = registrations::get_by_id(pool, id)
        .await?
        .ok_or_else(|| GqlError::not_found("Registration not found"))?;

    if let RunNumberChange::Set(n) = change {
        if registrations::run_number_taken(pool, existing.competition_id, n, id).await? {
            return Err(GqlError::conflict(RUN_NUMBER_TAKEN));
        }
    }

    let updated = registrations::update(pool, id, change, paid)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                GqlError::conflict(RUN_NUMBER_TAKEN)
            } else {
                e.into()
            }
        })?
        .ok_or_else(|| GqlError::not_found("Registration not found"))?;

    if change != RunNumberChange::Keep {
        cache.invalidate_competition(updated.competition_id);
    }
    Ok(updated)
}

/// Moves a registration to the bucket of another distance in the same competition.
pub async fn change_distance(
    pool: &sqlx::PgPool,
    cache: &ResultsCache,
    registration: &RegistrationRow,
    distance_name: &str,
) -> Result<RegistrationRow, GqlError> {
    let (competition, person) = tokio::try_join!(
        get_competition(pool, registration.competition_id),
        get_person(pool, registration.person_id)
    )?;
    let bucket = resolve_bucket(pool, &person, &competition, distance_name).await?;

    let updated = registrations::set_bucket(pool, registration.id, bucket.id)
        .await?
        .ok_or_else(|| GqlError::not_found("Registration not found"))?;
    cache.invalidate_competition(updated.competition_id);

    tracing::info!(
        registration_id = %updated.id,
        distance = %bucket.distance_name,
        "Registration moved to another distance"
    );
    Ok(updated)
}
