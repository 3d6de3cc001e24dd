use api::gql::build_schema;
use async_graphql::Variables;
use serde_json::json;

use crate::common::*;

const CREATE_COMPETITION: &str = r#"
    mutation CreateCompetition($input: CreateCompetitionInput!) {
        createCompetition(input: $input) {
            id
            name
            active
            distances { name km }
            categories {
                distanceName
                distanceInKm
                gender
                ageCategory { name }
            }
        }
    }
"#;

#[tokio::test]
async fn test_create_competition_seeds_every_bucket() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin_claims) = create_test_admin(&app_state).await;

    let category_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM age_categories")
        .fetch_one(&app_state.db)
        .await
        .unwrap();

    let variables = Variables::from_json(json!({
        "input": {
            "name": format!("Stadsloop {}", unique_suffix()),
            "date": "2030-06-01T10:00:00Z",
            "active": true,
            "distances": [
                { "name": "10km", "km": 10.0 },
                { "name": "5km", "km": 5.0 }
            ]
        }
    }));

    let response =
        execute_graphql(&schema, CREATE_COMPETITION, Some(variables), Some(admin_claims)).await;
    assert!(
        response.errors.is_empty(),
        "createCompetition should succeed: {:?}",
        response.errors
    );

    let data = response.data.into_json().unwrap();
    let competition = &data["createCompetition"];
    let categories = competition["categories"].as_array().unwrap();

    assert_eq!(categories.len() as i64, category_count * 2 * 2);
    assert_eq!(competition["distances"][0]["name"], "5km");
    assert_eq!(competition["distances"][1]["name"], "10km");

    // Shortest distance first, both genders for each age category
    assert_eq!(categories[0]["distanceName"], "5km");
    let min40_5km: Vec<_> = categories
        .iter()
        .filter(|c| c["distanceName"] == "5km" && c["ageCategory"]["name"] == "min40")
        .map(|c| c["gender"].as_str().unwrap())
        .collect();
    assert_eq!(min40_5km.len(), 2);
    assert!(min40_5km.contains(&"MALE"));
    assert!(min40_5km.contains(&"FEMALE"));
}

#[tokio::test]
async fn test_create_competition_rejects_bad_distances() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin_claims) = create_test_admin(&app_state).await;

    let duplicate = Variables::from_json(json!({
        "input": {
            "name": "Dubbel",
            "date": "2030-06-01T10:00:00Z",
            "distances": [
                { "name": "5km", "km": 5.0 },
                { "name": "5km", "km": 5.5 }
            ]
        }
    }));
    let response = execute_graphql(
        &schema,
        CREATE_COMPETITION,
        Some(duplicate),
        Some(admin_claims.clone()),
    )
    .await;
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "Duplicate distance name: 5km");

    let empty = Variables::from_json(json!({
        "input": {
            "name": "Leeg",
            "date": "2030-06-01T10:00:00Z",
            "distances": []
        }
    }));
    let response =
        execute_graphql(&schema, CREATE_COMPETITION, Some(empty), Some(admin_claims)).await;
    assert_eq!(
        response.errors[0].message,
        "At least one distance is required"
    );
}

#[tokio::test]
async fn test_create_competition_requires_admin() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, user_claims) = create_test_person(&app_state, "user", date(1990, 1, 1), "V").await;

    let variables = Variables::from_json(json!({
        "input": {
            "name": "Niet toegestaan",
            "date": "2030-06-01T10:00:00Z",
            "distances": [{ "name": "5km", "km": 5.0 }]
        }
    }));
    let response =
        execute_graphql(&schema, CREATE_COMPETITION, Some(variables), Some(user_claims)).await;

    assert!(!response.errors.is_empty());
    assert!(response.errors[0].message.contains("Administrator privileges required"));
}

#[tokio::test]
async fn test_update_competition_and_distances() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin_claims) = create_test_admin(&app_state).await;
    let competition_id = create_test_competition(&app_state, false).await;

    let mutation = r#"
        mutation Update($id: UUID!) {
            updateCompetition(id: $id, input: { active: true, rankingActive: true }) {
                id
                active
                rankingActive
            }
            updateDistances(competitionId: $id, distances: [
                { name: "5km", km: 5.2 },
                { name: "marathon", km: 42.195 }
            ]) {
                distanceName
                distanceInKm
            }
        }
    "#;
    let variables = Variables::from_json(json!({ "id": competition_id }));
    let response = execute_graphql(&schema, mutation, Some(variables), Some(admin_claims)).await;
    assert!(
        response.errors.is_empty(),
        "update should succeed: {:?}",
        response.errors
    );

    let data = response.data.into_json().unwrap();
    assert_eq!(data["updateCompetition"]["active"], true);
    assert_eq!(data["updateCompetition"]["rankingActive"], true);

    let buckets = data["updateDistances"].as_array().unwrap();
    assert!(buckets.iter().all(|b| b["distanceName"] != "marathon"));
    for bucket in buckets.iter().filter(|b| b["distanceName"] == "5km") {
        let km = bucket["distanceInKm"].as_f64().unwrap();
        assert!((km - 5.2).abs() < 0.001);
    }

    let ranking = execute_graphql(&schema, "{ rankingCompetitions { id } }", None, None).await;
    let data = ranking.data.into_json().unwrap();
    assert!(data["rankingCompetitions"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["id"] == competition_id.to_string()));
}

#[tokio::test]
async fn test_list_competitions_filters_by_name() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let competition_id = create_test_competition(&app_state, true).await;

    let name: String = sqlx::query_scalar("SELECT name FROM competitions WHERE id = $1")
        .bind(competition_id)
        .fetch_one(&app_state.db)
        .await
        .unwrap();

    let query = r#"
        query Search($name: String!) {
            competitions(filter: { name: $name, activeOnly: true }, pagination: { limit: 10 }) {
                items { id name }
                totalCount
                hasNextPage
            }
        }
    "#;
    let variables = Variables::from_json(json!({ "name": name.to_uppercase() }));
    let response = execute_graphql(&schema, query, Some(variables), None).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    assert_eq!(data["competitions"]["totalCount"], 1);
    assert_eq!(data["competitions"]["hasNextPage"], false);
    assert_eq!(
        data["competitions"]["items"][0]["id"],
        competition_id.to_string()
    );
}

#[tokio::test]
async fn test_set_gun_time_and_find_bucket() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin_claims) = create_test_admin(&app_state).await;
    let competition_id = create_test_competition(&app_state, true).await;

    let mutation = r#"
        mutation Gun($id: UUID!) {
            setGunTime(competitionId: $id, gunTime: "2030-06-01T10:00:00Z", distanceName: "10km")
        }
    "#;
    let variables = Variables::from_json(json!({ "id": competition_id }));
    let response = execute_graphql(
        &schema,
        mutation,
        Some(variables),
        Some(admin_claims.clone()),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let category_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM age_categories")
        .fetch_one(&app_state.db)
        .await
        .unwrap();
    let data = response.data.into_json().unwrap();
    assert_eq!(data["setGunTime"].as_i64().unwrap(), category_count * 2);

    let unknown = Variables::from_json(json!({ "id": uuid::Uuid::new_v4() }));
    let response = execute_graphql(&schema, mutation, Some(unknown), Some(admin_claims)).await;
    assert_eq!(response.errors[0].message, "Competition not found");

    let age_category_id: uuid::Uuid =
        sqlx::query_scalar("SELECT id FROM age_categories WHERE name = 'plus50'")
            .fetch_one(&app_state.db)
            .await
            .unwrap();
    let query = r#"
        query Find($competitionId: UUID!, $ageCategoryId: UUID!, $distance: String!) {
            findCompetitionPerCategory(
                ageCategoryId: $ageCategoryId,
                distanceName: $distance,
                gender: FEMALE,
                competitionId: $competitionId
            ) {
                distanceName
                gender
                gunTime
            }
        }
    "#;
    let variables = Variables::from_json(json!({
        "competitionId": competition_id,
        "ageCategoryId": age_category_id,
        "distance": "10km"
    }));
    let response = execute_graphql(&schema, query, Some(variables), None).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["findCompetitionPerCategory"]["gender"], "FEMALE");
    assert!(!data["findCompetitionPerCategory"]["gunTime"].is_null());

    let variables = Variables::from_json(json!({
        "competitionId": competition_id,
        "ageCategoryId": age_category_id,
        "distance": "21km"
    }));
    let response = execute_graphql(&schema, query, Some(variables), None).await;
    assert_eq!(
        response.errors[0].message,
        "This competition per category doesn't exist"
    );
}

#[tokio::test]
async fn test_distance_names_match_case_insensitively() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin_claims) = create_test_admin(&app_state).await;
    let competition_id = create_test_competition(&app_state, true).await;

    let mutation = r#"
        mutation Update($id: UUID!) {
            updateDistances(competitionId: $id, distances: [{ name: "10KM", km: 10.5 }]) {
                distanceName
                distanceInKm
            }
            setGunTime(competitionId: $id, gunTime: "2030-06-01T10:00:00Z", distanceName: "10Km")
        }
    "#;
    let variables = Variables::from_json(json!({ "id": competition_id }));
    let response = execute_graphql(&schema, mutation, Some(variables), Some(admin_claims)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    let ten_km: Vec<_> = data["updateDistances"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|b| b["distanceName"] == "10km")
        .collect();
    assert!(!ten_km.is_empty());
    for bucket in ten_km {
        let km = bucket["distanceInKm"].as_f64().unwrap();
        assert!((km - 10.5).abs() < 0.001);
    }
    assert!(data["setGunTime"].as_i64().unwrap() > 0);
}
