mod common;

use axum::http::{Method, StatusCode};

use common::app::{spawn_empty_app, spawn_test_app};
use common::http::call;

#[tokio::test]
async fn it_courses_list_seeded_catalog() {
    let app = spawn_test_app().await;

    let (status, body) = call(&app.app, Method::GET, "/api/courses", None).await;
    assert_eq!(status, StatusCode::OK);

    let courses = body.as_array().unwrap();
    assert_eq!(courses.len(), 53);
    assert_eq!(courses[0]["id"], 1);
    assert!(courses[0]["title"].is_string());
    assert!(courses[0]["description"].is_string());
    assert!(courses[0]["category"].is_string());

    let ids: Vec<u64> = courses.iter().map(|c| c["id"].as_u64().unwrap()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn it_courses_get_one_or_404() {
    let app = spawn_test_app().await;

    let (status, body) = call(&app.app, Method::GET, "/api/courses/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 3);

    let (status, body) = call(&app.app, Method::GET, "/api/courses/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Course not found");
}

#[tokio::test]
async fn it_courses_empty_store_lists_nothing() {
    let app = spawn_empty_app().await;

    let (status, body) = call(&app.app, Method::GET, "/api/courses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}
