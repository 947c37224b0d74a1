//! Integration tests for the tag endpoints.
//!
//! These tests require a `PostgreSQL` database reachable via `DATABASE_URL`;
//! migrations are applied automatically on first connect.
//!
//! Run with: cargo test -p ladle-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use ladle_integration_tests::{TestContext, TestUser, read_json};

/// Test helper: create a tag through the API and return its id.
async fn create_tag(ctx: &TestContext, token: &str, name: &str) -> i64 {
    let resp = ctx
        .send(
            Method::POST,
            "/api/tags",
            Some(token),
            Some(json!({"name": name})),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    read_json(resp).await["id"].as_i64().unwrap()
}

/// Test helper: list tag names as the given user.
async fn list_names(ctx: &TestContext, user: &TestUser, uri: &str) -> Vec<String> {
    let resp = ctx.send(Method::GET, uri, Some(&user.token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    read_json(resp)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_owned())
        .collect()
}

// ============================================================================
// Authentication & Listing
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_auth_required() {
    let ctx = TestContext::new().await;

    let resp = ctx.send(Method::GET, "/api/tags", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_list_tags_name_descending() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    create_tag(&ctx, &user.token, "Dessert").await;
    create_tag(&ctx, &user.token, "Vegan").await;

    let names = list_names(&ctx, &user, "/api/tags").await;
    assert_eq!(names, vec!["Vegan", "Dessert"]);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_tags_limited_to_user() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;
    let other = ctx.create_user().await;

    create_tag(&ctx, &user.token, "Fruity").await;
    create_tag(&ctx, &other.token, "Comfort Food").await;

    let names = list_names(&ctx, &user, "/api/tags").await;
    assert_eq!(names, vec!["Fruity"]);
}

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_create_tag() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    create_tag(&ctx, &user.token, "Simple").await;

    let names = list_names(&ctx, &user, "/api/tags").await;
    assert_eq!(names, vec!["Simple"]);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_create_duplicate_tag_returns_existing() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    let first = create_tag(&ctx, &user.token, "Brunch").await;
    let second = create_tag(&ctx, &user.token, "Brunch").await;

    assert_eq!(first, second);
    assert_eq!(list_names(&ctx, &user, "/api/tags").await.len(), 1);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_create_tag_rejects_empty_name() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    let resp = ctx
        .send(
            Method::POST,
            "/api/tags",
            Some(&user.token),
            Some(json!({"name": ""})),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Rename & Delete
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_rename_tag() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    let id = create_tag(&ctx, &user.token, "After Dinner").await;

    let resp = ctx
        .send(
            Method::PATCH,
            &format!("/api/tags/{id}"),
            Some(&user.token),
            Some(json!({"name": "Dessert"})),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["name"], "Dessert");

    assert_eq!(list_names(&ctx, &user, "/api/tags").await, vec!["Dessert"]);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_rename_tag_to_taken_name_conflicts() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    create_tag(&ctx, &user.token, "Dinner").await;
    let id = create_tag(&ctx, &user.token, "Supper").await;

    let resp = ctx
        .send(
            Method::PATCH,
            &format!("/api/tags/{id}"),
            Some(&user.token),
            Some(json!({"name": "Dinner"})),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_rename_other_users_tag() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;
    let other = ctx.create_user().await;

    let id = create_tag(&ctx, &user.token, "Mine").await;

    let resp = ctx
        .send(
            Method::PATCH,
            &format!("/api/tags/{id}"),
            Some(&other.token),
            Some(json!({"name": "Stolen"})),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(list_names(&ctx, &user, "/api/tags").await, vec!["Mine"]);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_delete_tag() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    let id = create_tag(&ctx, &user.token, "Breakfast").await;

    let resp = ctx
        .send(
            Method::DELETE,
            &format!("/api/tags/{id}"),
            Some(&user.token),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert!(list_names(&ctx, &user, "/api/tags").await.is_empty());
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_delete_tag_detaches_from_recipes() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    let resp = ctx
        .send(
            Method::POST,
            "/api/recipes",
            Some(&user.token),
            Some(json!({
                "title": "Porridge",
                "time_minutes": 10,
                "price": "1.50",
                "tags": [{"name": "Breakfast"}],
            })),
        )
        .await;
    let recipe = read_json(resp).await;
    let tag_id = recipe["tags"][0]["id"].as_i64().unwrap();

    let resp = ctx
        .send(
            Method::DELETE,
            &format!("/api/tags/{tag_id}"),
            Some(&user.token),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The recipe survives with an empty tag set
    let resp = ctx
        .send(
            Method::GET,
            &format!("/api/recipes/{}", recipe["id"]),
            Some(&user.token),
            None,
        )
        .await;
    let body = read_json(resp).await;
    assert!(body["tags"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_delete_other_users_tag() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;
    let other = ctx.create_user().await;

    let id = create_tag(&ctx, &user.token, "Keep").await;

    let resp = ctx
        .send(
            Method::DELETE,
            &format!("/api/tags/{id}"),
            Some(&other.token),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(list_names(&ctx, &user, "/api/tags").await, vec!["Keep"]);
}

// ============================================================================
// Assigned-only Filtering
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_assigned_only_filters_unattached() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    create_tag(&ctx, &user.token, "Unused").await;

    let resp = ctx
        .send(
            Method::POST,
            "/api/recipes",
            Some(&user.token),
            Some(json!({
                "title": "Eggs on toast",
                "time_minutes": 10,
                "price": "2.00",
                "tags": [{"name": "Breakfast"}],
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let names = list_names(&ctx, &user, "/api/tags?assigned_only=1").await;
    assert_eq!(names, vec!["Breakfast"]);

    // Without the filter both appear
    let names = list_names(&ctx, &user, "/api/tags?assigned_only=0").await;
    assert_eq!(names.len(), 2);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database via DATABASE_URL"]
async fn test_assigned_only_is_distinct() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    for title in ["Pancakes", "Porridge"] {
        let resp = ctx
            .send(
                Method::POST,
                "/api/recipes",
                Some(&user.token),
                Some(json!({
                    "title": title,
                    "time_minutes": 10,
                    "price": "3.00",
                    "tags": [{"name": "Breakfast"}],
                })),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let names = list_names(&ctx, &user, "/api/tags?assigned_only=1").await;
    assert_eq!(names, vec!["Breakfast"]);
}
