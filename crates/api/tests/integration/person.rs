use api::gql::build_schema;
use async_graphql::Variables;
use serde_json::json;

use crate::common::*;

#[tokio::test]
async fn test_me_returns_the_logged_in_person() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (person_id, claims) = create_test_person(&app_state, "user", date(1988, 8, 8), "V").await;

    let response = execute_graphql(
        &schema,
        "{ me { id fullName gender birthDate email } myProfile { role } }",
        None,
        Some(claims.clone()),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["me"]["id"], person_id.to_string());
    assert_eq!(data["me"]["fullName"], "Test Runner");
    assert_eq!(data["me"]["gender"], "FEMALE");
    assert_eq!(data["me"]["birthDate"], "1988-08-08");
    assert_eq!(data["me"]["email"], claims.email.as_str());
    assert_eq!(data["myProfile"]["role"], "USER");
}

#[tokio::test]
async fn test_person_is_visible_to_self_and_admin_only() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin) = create_test_admin(&app_state).await;
    let (person_id, owner) = create_test_person(&app_state, "user", date(1990, 1, 1), "M").await;
    let (_, stranger) = create_test_person(&app_state, "user", date(1990, 1, 1), "M").await;

    let query = r#"query Person($id: UUID!) { person(id: $id) { id email } }"#;
    let variables = || Some(Variables::from_json(json!({ "id": person_id })));

    let denied = execute_graphql(&schema, query, variables(), Some(stranger)).await;
    assert_eq!(
        denied.errors[0].message,
        "Access denied: you can only access your own data"
    );

    for claims in [owner.clone(), admin] {
        let response = execute_graphql(&schema, query, variables(), Some(claims)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(data["person"]["email"], owner.email.as_str());
    }
}

#[tokio::test]
async fn test_club_members_do_not_expose_private_details() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let club_id = create_test_club(&app_state, "Private Club").await;
    let (member, _) = create_test_person(&app_state, "user", date(1979, 3, 3), "M").await;
    let (_, viewer) = create_test_person(&app_state, "user", date(1979, 3, 3), "M").await;
    sqlx::query("UPDATE persons SET club_id = $1, iban_number = 'BE68539007547034' WHERE id = $2")
        .bind(club_id)
        .bind(member)
        .execute(&app_state.db)
        .await
        .unwrap();

    let response = execute_graphql(
        &schema,
        r#"query Members($id: UUID!) { clubWithMembers(id: $id) { members { email ibanNumber club { id } } } }"#,
        Some(Variables::from_json(json!({ "id": club_id }))),
        Some(viewer),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let member = &data["clubWithMembers"]["members"][0];
    assert!(member["email"].is_null());
    assert!(member["ibanNumber"].is_null());
    assert_eq!(member["club"]["id"], club_id.to_string());
}

#[tokio::test]
async fn test_admin_manages_persons_and_roles() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (admin_id, admin) = create_test_admin(&app_state).await;

    let last_name = format!("Walker{}", unique_suffix());
    let response = execute_graphql(
        &schema,
        r#"
        mutation Create($input: CreatePersonInput!) {
            createPerson(input: $input) { id lastName email }
        }
        "#,
        Some(Variables::from_json(json!({
            "input": {
                "firstName": "Jo",
                "lastName": last_name,
                "birthDate": "1966-06-06",
                "gender": "MALE"
            }
        }))),
        Some(admin.clone()),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let person_id = data["createPerson"]["id"].as_str().unwrap().to_string();
    assert!(data["createPerson"]["email"].is_null());

    let search = execute_graphql(
        &schema,
        r#"query Search($search: String) { persons(search: $search) { items { id } totalCount } }"#,
        Some(Variables::from_json(json!({ "search": last_name.to_lowercase() }))),
        Some(admin.clone()),
    )
    .await;
    assert!(search.errors.is_empty(), "{:?}", search.errors);
    let data = search.data.into_json().unwrap();
    assert_eq!(data["persons"]["totalCount"], 1);
    assert_eq!(data["persons"]["items"][0]["id"], person_id.as_str());

    let promote = execute_graphql(
        &schema,
        r#"mutation Promote($id: UUID!) { updateProfileRole(personId: $id, role: ADMIN) { role } }"#,
        Some(Variables::from_json(json!({ "id": person_id }))),
        Some(admin.clone()),
    )
    .await;
    assert!(promote.errors.is_empty(), "{:?}", promote.errors);
    let data = promote.data.into_json().unwrap();
    assert_eq!(data["updateProfileRole"]["role"], "ADMIN");

    let demote_self = execute_graphql(
        &schema,
        r#"mutation Demote($id: UUID!) { updateProfileRole(personId: $id, role: USER) { role } }"#,
        Some(Variables::from_json(json!({ "id": admin_id }))),
        Some(admin),
    )
    .await;
    assert_eq!(
        demote_self.errors[0].message,
        "You cannot remove your own administrator role"
    );
}

#[tokio::test]
async fn test_changing_email_requires_new_confirmation() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (person_id, owner) = create_test_person(&app_state, "user", date(1985, 4, 4), "M").await;
    sqlx::query("UPDATE persons SET is_email_confirmed = TRUE WHERE id = $1")
        .bind(person_id)
        .execute(&app_state.db)
        .await
        .unwrap();

    let mutation = r#"
        mutation Update($id: UUID!, $email: String) {
            updatePerson(id: $id, input: { email: $email }) { email isEmailConfirmed }
        }
    "#;

    // Same address in another case is not a change.
    let response = execute_graphql(
        &schema,
        mutation,
        Some(Variables::from_json(json!({ "id": person_id, "email": owner.email.to_uppercase() }))),
        Some(owner.clone()),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["updatePerson"]["isEmailConfirmed"], true);

    let new_email = format!("moved_{}@test.com", unique_suffix());
    let response = execute_graphql(
        &schema,
        mutation,
        Some(Variables::from_json(json!({ "id": person_id, "email": new_email }))),
        Some(owner),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["updatePerson"]["email"], new_email.as_str());
    assert_eq!(data["updatePerson"]["isEmailConfirmed"], false);

    let pending: Option<String> =
        sqlx::query_scalar("SELECT confirmation_token_hash FROM persons WHERE id = $1")
            .bind(person_id)
            .fetch_one(&app_state.db)
            .await
            .unwrap();
    assert!(pending.is_some(), "a new confirmation token should be issued");
}

#[tokio::test]
async fn test_deleting_a_person_refreshes_cached_results() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin) = create_test_admin(&app_state).await;
    let competition_id = create_test_competition(&app_state, true).await;
    let (person_id, _) = create_test_person(&app_state, "user", date(1992, 2, 2), "M").await;

    let registration_id: uuid::Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO registrations (person_id, competition_id, competition_per_category_id, run_number, run_time_ms)
        SELECT $1, $2, id, 7, 1800000
        FROM competition_per_categories
        WHERE competition_id = $2 AND distance_name = '5km' AND gender = 'M'
        ORDER BY age_category_id
        LIMIT 1
        RETURNING id
        "#,
    )
    .bind(person_id)
    .bind(competition_id)
    .fetch_one(&app_state.db)
    .await
    .unwrap();

    let results_query = r#"query Results($id: UUID!) { competitionResults(competitionId: $id) { registrationId } }"#;
    let results = || Some(Variables::from_json(json!({ "id": competition_id })));

    let warm = execute_graphql(&schema, results_query, results(), None).await;
    let data = warm.data.into_json().unwrap();
    assert_eq!(
        data["competitionResults"][0]["registrationId"],
        registration_id.to_string()
    );

    let deleted = execute_graphql(
        &schema,
        r#"mutation Delete($id: UUID!) { deletePerson(id: $id) }"#,
        Some(Variables::from_json(json!({ "id": person_id }))),
        Some(admin),
    )
    .await;
    assert!(deleted.errors.is_empty(), "{:?}", deleted.errors);

    let after = execute_graphql(&schema, results_query, results(), None).await;
    let data = after.data.into_json().unwrap();
    assert!(data["competitionResults"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_demoted_admin_loses_private_details_before_token_expiry() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let club_id = create_test_club(&app_state, "Demotion Club").await;
    let (member, _) = create_test_person(&app_state, "user", date(1979, 3, 3), "M").await;
    let (former_admin_id, former_admin) = create_test_admin(&app_state).await;
    sqlx::query("UPDATE persons SET club_id = $1 WHERE id = $2")
        .bind(club_id)
        .bind(member)
        .execute(&app_state.db)
        .await
        .unwrap();
    sqlx::query("UPDATE profiles SET role = 'user' WHERE person_id = $1")
        .bind(former_admin_id)
        .execute(&app_state.db)
        .await
        .unwrap();

    let response = execute_graphql(
        &schema,
        r#"query Members($id: UUID!) { clubWithMembers(id: $id) { members { email } } }"#,
        Some(Variables::from_json(json!({ "id": club_id }))),
        Some(former_admin),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert!(data["clubWithMembers"]["members"][0]["email"].is_null());
}
