use api::gql::build_schema;
use async_graphql::Variables;
use chrono::{Datelike, Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::common::*;

const SIGN_IN: &str = r#"
    mutation SignIn($input: SignInToContestInput!) {
        signInToContest(input: $input) {
            id
            paid
            runNumber
            competitionPerCategory {
                distanceName
                gender
                ageCategory { name }
            }
        }
    }
"#;

fn sign_in_variables(competition_id: Uuid, distance: &str) -> Variables {
    Variables::from_json(json!({
        "input": { "competitionId": competition_id, "distanceName": distance }
    }))
}

/// Birth date that makes a runner `age` years old on a competition ten days from now.
fn born_years_ago(age: i32) -> chrono::NaiveDate {
    let race_day = (Utc::now() + Duration::days(10)).date_naive();
    date(race_day.year() - age, 1, 1)
}

#[tokio::test]
async fn test_sign_in_resolves_bucket_from_age_and_gender() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let competition_id = create_test_competition(&app_state, true).await;
    let (_, claims) = create_test_person(&app_state, "user", born_years_ago(45), "V").await;

    let response = execute_graphql(
        &schema,
        SIGN_IN,
        Some(sign_in_variables(competition_id, "10km")),
        Some(claims),
    )
    .await;
    assert!(
        response.errors.is_empty(),
        "signInToContest should succeed: {:?}",
        response.errors
    );

    let data = response.data.into_json().unwrap();
    let registration = &data["signInToContest"];
    assert_eq!(registration["paid"], false);
    assert!(registration["runNumber"].is_null());
    assert_eq!(registration["competitionPerCategory"]["distanceName"], "10km");
    assert_eq!(registration["competitionPerCategory"]["gender"], "FEMALE");
    assert_eq!(
        registration["competitionPerCategory"]["ageCategory"]["name"],
        "plus40"
    );
}

#[tokio::test]
async fn test_duplicate_and_inactive_sign_ins_are_rejected() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let competition_id = create_test_competition(&app_state, true).await;
    let closed_id = create_test_competition(&app_state, false).await;
    let (_, claims) = create_test_person(&app_state, "user", born_years_ago(30), "M").await;

    let first = execute_graphql(
        &schema,
        SIGN_IN,
        Some(sign_in_variables(competition_id, "5km")),
        Some(claims.clone()),
    )
    .await;
    assert!(first.errors.is_empty(), "{:?}", first.errors);

    let second = execute_graphql(
        &schema,
        SIGN_IN,
        Some(sign_in_variables(competition_id, "10km")),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(second.errors[0].message, "This registration already exists");

    let closed = execute_graphql(
        &schema,
        SIGN_IN,
        Some(sign_in_variables(closed_id, "5km")),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(
        closed.errors[0].message,
        "This competition is not open for registration"
    );

    let unknown_distance = execute_graphql(
        &schema,
        SIGN_IN,
        Some(sign_in_variables(create_test_competition(&app_state, true).await, "3km")),
        Some(claims),
    )
    .await;
    assert_eq!(
        unknown_distance.errors[0].message,
        "This competition per category doesn't exist"
    );
}

#[tokio::test]
async fn test_admin_assigns_and_clears_run_numbers() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin_claims) = create_test_admin(&app_state).await;
    let competition_id = create_test_competition(&app_state, true).await;
    let (runner_a, _) = create_test_person(&app_state, "user", born_years_ago(25), "M").await;
    let (runner_b, _) = create_test_person(&app_state, "user", born_years_ago(52), "V").await;

    let mut registration_ids = Vec::new();
    for person_id in [runner_a, runner_b] {
        let variables = Variables::from_json(json!({
            "input": { "competitionId": competition_id, "distanceName": "5km", "personId": person_id }
        }));
        let response =
            execute_graphql(&schema, SIGN_IN, Some(variables), Some(admin_claims.clone())).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        registration_ids.push(data["signInToContest"]["id"].as_str().unwrap().to_string());
    }

    let update = r#"
        mutation Update($id: UUID!, $runNumber: Int) {
            updateRegistration(id: $id, input: { runNumber: $runNumber, paid: true }) {
                runNumber
                paid
            }
        }
    "#;

    let response = execute_graphql(
        &schema,
        update,
        Some(Variables::from_json(
            json!({ "id": registration_ids[0], "runNumber": 101 }),
        )),
        Some(admin_claims.clone()),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["updateRegistration"]["runNumber"], 101);
    assert_eq!(data["updateRegistration"]["paid"], true);

    let taken = execute_graphql(
        &schema,
        update,
        Some(Variables::from_json(
            json!({ "id": registration_ids[1], "runNumber": 101 }),
        )),
        Some(admin_claims.clone()),
    )
    .await;
    assert_eq!(
        taken.errors[0].message,
        "This run number is already used in this competition"
    );

    let cleared = execute_graphql(
        &schema,
        update,
        Some(Variables::from_json(
            json!({ "id": registration_ids[0], "runNumber": -1 }),
        )),
        Some(admin_claims),
    )
    .await;
    assert!(cleared.errors.is_empty(), "{:?}", cleared.errors);
    let data = cleared.data.into_json().unwrap();
    assert!(data["updateRegistration"]["runNumber"].is_null());
}

#[tokio::test]
async fn test_owner_changes_distance_but_others_cannot() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let competition_id = create_test_competition(&app_state, true).await;
    let (_, owner_claims) = create_test_person(&app_state, "user", born_years_ago(35), "M").await;
    let (_, other_claims) = create_test_person(&app_state, "user", born_years_ago(35), "M").await;

    let response = execute_graphql(
        &schema,
        SIGN_IN,
        Some(sign_in_variables(competition_id, "5km")),
        Some(owner_claims.clone()),
    )
    .await;
    let data = response.data.into_json().unwrap();
    let registration_id = data["signInToContest"]["id"].as_str().unwrap().to_string();

    let change = r#"
        mutation Change($id: UUID!) {
            changeDistance(id: $id, distanceName: "10km") {
                competitionPerCategory { distanceName }
            }
        }
    "#;

    let denied = execute_graphql(
        &schema,
        change,
        Some(Variables::from_json(json!({ "id": registration_id }))),
        Some(other_claims),
    )
    .await;
    assert_eq!(
        denied.errors[0].message,
        "Access denied: you can only access your own data"
    );

    let response = execute_graphql(
        &schema,
        change,
        Some(Variables::from_json(json!({ "id": registration_id }))),
        Some(owner_claims.clone()),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(
        data["changeDistance"]["competitionPerCategory"]["distanceName"],
        "10km"
    );

    let mine = execute_graphql(
        &schema,
        "{ myRegistrations { id competition { id } } }",
        None,
        Some(owner_claims),
    )
    .await;
    let data = mine.data.into_json().unwrap();
    let registrations = data["myRegistrations"].as_array().unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(
        registrations[0]["competition"]["id"],
        competition_id.to_string()
    );
}
