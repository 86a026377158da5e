mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::app::spawn_test_app;
use common::fixtures::seed_user;
use common::http::{assert_json_error, call};

#[tokio::test]
async fn it_rating_create_then_update() {
    let app = spawn_test_app().await;
    let user = seed_user(app.store(), "Ada");

    let payload = json!({"user_id": user.id, "course_id": 4, "rating": 5});
    let (status, body) = call(&app.app, Method::POST, "/api/ratings", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Rating saved successfully");

    let payload = json!({"user_id": user.id, "course_id": 4, "rating": 2.0});
    let (status, _) = call(&app.app, Method::POST, "/api/ratings", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app.app,
        Method::GET,
        &format!("/api/ratings/user/{}", user.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"course_id": 4, "rating": 2}]));
}

#[tokio::test]
async fn it_rating_rejects_bad_scores() {
    let app = spawn_test_app().await;
    let user = seed_user(app.store(), "Ada");

    for rating in [json!(0), json!(6), json!(3.5)] {
        let payload = json!({"user_id": user.id, "course_id": 1, "rating": rating});
        let (status, body) = call(&app.app, Method::POST, "/api/ratings", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {rating}");
        assert_json_error(&body, "RATING_INVALID_SCORE");
    }
    assert_eq!(app.store().count_ratings(), 0);
}

#[tokio::test]
async fn it_rating_requires_existing_user_and_course() {
    let app = spawn_test_app().await;
    let user = seed_user(app.store(), "Ada");

    let (status, body) = call(
        &app.app,
        Method::POST,
        "/api/ratings",
        Some(json!({"user_id": 777, "course_id": 1, "rating": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = call(
        &app.app,
        Method::POST,
        "/api/ratings",
        Some(json!({"user_id": user.id, "course_id": 4242, "rating": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Course not found");
}

#[tokio::test]
async fn it_rating_delete() {
    let app = spawn_test_app().await;
    let user = seed_user(app.store(), "Ada");
    app.store().upsert_rating(user.id, 7, 4).unwrap();

    let payload = json!({"user_id": user.id, "course_id": 7});
    let (status, body) = call(&app.app, Method::DELETE, "/api/ratings", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Rating deleted successfully");

    let (status, body) = call(&app.app, Method::DELETE, "/api/ratings", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Rating not found");
}

#[tokio::test]
async fn it_rating_list_for_unknown_user_is_empty() {
    let app = spawn_test_app().await;

    let (status, body) = call(&app.app, Method::GET, "/api/ratings/user/31337", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn it_rating_changes_retrain_the_model() {
    let app = spawn_test_app().await;
    let user = seed_user(app.store(), "Ada");

    for course_id in 1..=3 {
        let payload = json!({"user_id": user.id, "course_id": course_id, "rating": 4});
        let (status, _) = call(&app.app, Method::POST, "/api/ratings", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, info) = call(&app.app, Method::GET, "/api/model", None).await;
    assert_eq!(info["trained"], true);
    assert_eq!(info["stale"], false);
    assert_eq!(info["revision"], info["current_revision"]);

    let payload = json!({"user_id": user.id, "course_id": 3});
    call(&app.app, Method::DELETE, "/api/ratings", Some(payload)).await;
    let (_, info) = call(&app.app, Method::GET, "/api/model", None).await;
    assert_eq!(info["trained"], false);
}

#[tokio::test]
async fn it_rating_for_deleted_user_is_rejected() {
    let app = spawn_test_app().await;
    let user = seed_user(app.store(), "Ada");

    let (status, _) = call(&app.app, Method::DELETE, &format!("/api/users/{}", user.id), None).await;
    assert_eq!(status, StatusCode::OK);

    let payload = json!({"user_id": user.id, "course_id": 1, "rating": 4});
    let (status, body) = call(&app.app, Method::POST, "/api/ratings", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
    assert!(app.store().ratings_for_user(user.id).unwrap().is_empty());
}
