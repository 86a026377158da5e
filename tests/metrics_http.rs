mod common;

use axum::http::{Method, StatusCode};

use common::app::{spawn_empty_app, spawn_test_app};
use common::fixtures::{seed_courses, seed_dense_ratings, seed_user, seed_users};
use common::http::{assert_json_error, call};

#[tokio::test]
async fn it_metrics_need_ten_ratings() {
    let app = spawn_test_app().await;
    let user = seed_user(app.store(), "Ada");
    for course_id in 1..=9 {
        app.store().upsert_rating(user.id, course_id, 4).unwrap();
    }

    let (status, body) = call(&app.app, Method::GET, "/api/metrics", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "NOT_ENOUGH_DATA");
    assert_eq!(body["error"], "Not enough data for metrics");
}

#[tokio::test]
async fn it_metrics_report_rmse_and_precision() {
    let app = spawn_empty_app().await;
    let users = seed_users(app.store(), 5);
    let courses = seed_courses(app.store(), 6, "Data Science");
    let n = seed_dense_ratings(app.store(), &users, &courses);
    assert_eq!(n, 30);

    let (status, body) = call(&app.app, Method::GET, "/api/metrics", None).await;
    assert_eq!(status, StatusCode::OK);

    let rmse = body["rmse"].as_f64().unwrap();
    let precision = body["top_k_precision"].as_f64().unwrap();
    assert!(rmse >= 0.0);
    assert!((0.0..=1.0).contains(&precision));
    assert_eq!((rmse * 10_000.0).round() / 10_000.0, rmse);
    assert_eq!(body["test_size"], 6);
    assert_eq!(body["train_size"], 24);
    assert_eq!(body["k"], 5);
}

#[tokio::test]
async fn it_metrics_are_stable_until_ratings_change() {
    let app = spawn_empty_app().await;
    let users = seed_users(app.store(), 4);
    let courses = seed_courses(app.store(), 5, "DevOps");
    seed_dense_ratings(app.store(), &users, &courses);

    let (_, first) = call(&app.app, Method::GET, "/api/metrics", None).await;
    let (_, second) = call(&app.app, Method::GET, "/api/metrics", None).await;
    assert_eq!(first, second);

    app.store().upsert_rating(users[0].id, courses[0].id, 1).unwrap();
    let (status, _) = call(&app.app, Method::GET, "/api/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn it_model_info_before_training() {
    let app = spawn_test_app().await;

    let (status, body) = call(&app.app, Method::GET, "/api/model", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trained"], false);
    assert_eq!(body["current_revision"], 0);
}
