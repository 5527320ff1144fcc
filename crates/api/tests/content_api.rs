//! HTTP-level integration tests for question, answer, comment and vote
//! endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, get, post_empty, post_json};
use sqlx::PgPool;

/// Create a question as `token` and return its id.
async fn create_question(pool: &PgPool, token: &str, title: &str, tags: &[&str]) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/questions",
        token,
        serde_json::json!({ "title": title, "body": "Body text", "tags": tags }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_question_normalizes_tags(pool: PgPool) {
    let (alice_id, alice) = create_user(&pool, "alice").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/questions",
        &alice,
        serde_json::json!({
            "title": "  Async traits?  ",
            "body": "How do I use async fn in traits?",
            "tags": ["Rust", " async ", "rust"],
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Async traits?");
    assert_eq!(json["data"]["author_id"], alice_id);
    assert_eq!(json["data"]["tags"], serde_json::json!(["async", "rust"]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_question_rejects_blank_title(pool: PgPool) {
    let (_, alice) = create_user(&pool, "alice").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/questions",
        &alice,
        serde_json::json!({ "title": "   ", "body": "body", "tags": [] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_question_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/questions",
        "not-a-token",
        serde_json::json!({ "title": "t", "body": "b", "tags": [] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_question_counts_views_and_404s(pool: PgPool) {
    let (_, alice) = create_user(&pool, "alice").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/questions",
        &alice,
        serde_json::json!({ "title": "Views", "body": "body", "tags": [] }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    get(app, &format!("/api/v1/questions/{id}")).await;
    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/questions/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["view_count"], 2);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/questions/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn answer_on_missing_question_returns_404(pool: PgPool) {
    let (_, bob) = create_user(&pool, "bob").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/questions/424242/answers",
        &bob,
        serde_json::json!({ "body": "orphan" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_question_author_can_accept(pool: PgPool) {
    let (_, alice) = create_user(&pool, "alice").await;
    let (_, bob) = create_user(&pool, "bob").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/questions",
        &alice,
        serde_json::json!({ "title": "Accept me", "body": "body", "tags": [] }),
    )
    .await;
    let question_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/questions/{question_id}/answers"),
        &bob,
        serde_json::json!({ "body": "Here you go" }),
    )
    .await;
    let answer_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_empty(app, &format!("/api/v1/answers/{answer_id}/accept"), &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response =
        post_empty(app, &format!("/api/v1/answers/{answer_id}/accept"), &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_accepted"], true);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/questions/{question_id}")).await;
    assert_eq!(
        body_json(response).await["data"]["accepted_answer_id"],
        answer_id
    );
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn votes_adjust_count(pool: PgPool) {
    let (_, alice) = create_user(&pool, "alice").await;
    let (_, bob) = create_user(&pool, "bob").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/questions",
        &alice,
        serde_json::json!({ "title": "Vote on me", "body": "body", "tags": [] }),
    )
    .await;
    let question_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/questions/{question_id}/vote"),
        &bob,
        serde_json::json!({ "direction": "down" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["vote_count"], -1);
    assert_eq!(json["data"]["target"]["type"], "question");

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/questions/{question_id}/vote"),
        &bob,
        serde_json::json!({ "direction": "sideways" }),
    )
    .await;
    assert!(response.status().is_client_error());
}

// ---------------------------------------------------------------------------
// Listing, search and tags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_questions_sorts_by_votes(pool: PgPool) {
    let (_, alice) = create_user(&pool, "alice").await;
    let (_, bob) = create_user(&pool, "bob").await;
    let popular = create_question(&pool, &alice, "Popular", &[]).await;
    let recent = create_question(&pool, &alice, "Recent", &[]).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/questions/{popular}/vote"),
        &bob,
        serde_json::json!({ "direction": "up" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let newest = body_json(get(app, "/api/v1/questions").await).await;
    assert_eq!(newest["data"][0]["id"], recent);

    let app = common::build_test_app(pool.clone());
    let by_votes = body_json(get(app, "/api/v1/questions?sort=votes").await).await;
    assert_eq!(by_votes["data"][0]["id"], popular);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/questions?sort=oldest").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_is_case_insensitive_and_blank_is_empty(pool: PgPool) {
    let (_, alice) = create_user(&pool, "alice").await;
    let tagged = create_question(&pool, &alice, "Pinning futures", &["tokio"]).await;
    create_question(&pool, &alice, "Something else", &["sqlx"]).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/search?q=TOKIO").await).await;
    let hits = json["data"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], tagged);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/search?q=%20%20").await).await;
    assert_eq!(json["data"], serde_json::json!([]));

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/search").await).await;
    assert_eq!(json["data"], serde_json::json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tags_are_listed_with_counts(pool: PgPool) {
    let (_, alice) = create_user(&pool, "alice").await;
    create_question(&pool, &alice, "First", &["rust", "axum"]).await;
    create_question(&pool, &alice, "Second", &["Rust"]).await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/tags").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"],
        serde_json::json!([
            { "name": "rust", "question_count": 2 },
            { "name": "axum", "question_count": 1 },
        ])
    );
}
