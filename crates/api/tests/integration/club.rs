use api::gql::build_schema;
use async_graphql::Variables;
use serde_json::json;

use crate::common::*;

#[tokio::test]
async fn test_create_club_with_members_and_reject_duplicates() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin) = create_test_admin(&app_state).await;
    let (member_a, member_claims) =
        create_test_person(&app_state, "user", date(1991, 1, 1), "M").await;
    let (member_b, _) = create_test_person(&app_state, "user", date(1992, 2, 2), "V").await;

    let name = format!("Harriers {}", unique_suffix());
    let create = r#"
        mutation Create($input: CreateClubInput!) {
            createClub(input: $input) { id name logo }
        }
    "#;

    let response = execute_graphql(
        &schema,
        create,
        Some(Variables::from_json(json!({
            "input": { "name": name, "memberIds": [member_a, member_b] }
        }))),
        Some(admin.clone()),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let club_id = data["createClub"]["id"].as_str().unwrap().to_string();
    assert_eq!(data["createClub"]["name"], name.as_str());
    assert!(data["createClub"]["logo"].is_null());

    let duplicate = execute_graphql(
        &schema,
        create,
        Some(Variables::from_json(json!({ "input": { "name": name } }))),
        Some(admin),
    )
    .await;
    assert_eq!(duplicate.errors[0].message, "Club already exists");

    let members = execute_graphql(
        &schema,
        r#"query Members($id: UUID!) { clubWithMembers(id: $id) { club { name } members { id } } }"#,
        Some(Variables::from_json(json!({ "id": club_id }))),
        Some(member_claims),
    )
    .await;
    assert!(members.errors.is_empty(), "{:?}", members.errors);
    let data = members.data.into_json().unwrap();
    assert_eq!(data["clubWithMembers"]["members"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_club_replaces_member_list() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin) = create_test_admin(&app_state).await;
    let club_id = create_test_club(&app_state, "Road Runners").await;
    let (kept, _) = create_test_person(&app_state, "user", date(1980, 4, 4), "M").await;
    let (dropped, _) = create_test_person(&app_state, "user", date(1981, 5, 5), "V").await;

    let update = r#"
        mutation Update($id: UUID!, $input: UpdateClubInput!) {
            updateClub(id: $id, input: $input) { id }
        }
    "#;

    for members in [json!([kept, dropped]), json!([kept])] {
        let response = execute_graphql(
            &schema,
            update,
            Some(Variables::from_json(json!({
                "id": club_id, "input": { "memberIds": members }
            }))),
            Some(admin.clone()),
        )
        .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
    }

    let dropped_club: Option<uuid::Uuid> =
        sqlx::query_scalar("SELECT club_id FROM persons WHERE id = $1")
            .bind(dropped)
            .fetch_one(&app_state.db)
            .await
            .unwrap();
    assert_eq!(dropped_club, None);

    let kept_club: Option<uuid::Uuid> =
        sqlx::query_scalar("SELECT club_id FROM persons WHERE id = $1")
            .bind(kept)
            .fetch_one(&app_state.db)
            .await
            .unwrap();
    assert_eq!(kept_club, Some(club_id));

    let anonymous = execute_graphql(
        &schema,
        r#"query Members($id: UUID!) { clubWithMembers(id: $id) { club { id } } }"#,
        Some(Variables::from_json(json!({ "id": club_id }))),
        None,
    )
    .await;
    assert_eq!(
        anonymous.errors[0].message,
        "You must be logged in to perform this action"
    );
}

#[tokio::test]
async fn test_delete_club_detaches_members() {
    let app_state = setup_test_db().await;
    let schema = build_schema(app_state.clone());
    let (_, admin) = create_test_admin(&app_state).await;
    let club_id = create_test_club(&app_state, "Trail Club").await;
    let (member, _) = create_test_person(&app_state, "user", date(1975, 7, 7), "M").await;
    sqlx::query("UPDATE persons SET club_id = $1 WHERE id = $2")
        .bind(club_id)
        .bind(member)
        .execute(&app_state.db)
        .await
        .unwrap();

    let response = execute_graphql(
        &schema,
        r#"mutation Delete($id: UUID!) { deleteClub(id: $id) }"#,
        Some(Variables::from_json(json!({ "id": club_id }))),
        Some(admin),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let club: Option<uuid::Uuid> = sqlx::query_scalar("SELECT club_id FROM persons WHERE id = $1")
        .bind(member)
        .fetch_one(&app_state.db)
        .await
        .unwrap();
    assert_eq!(club, None);
}
