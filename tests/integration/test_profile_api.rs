// Profile endpoints and the GitHub passthrough

use axum::http::{Method, StatusCode};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::common::{self, send, MockRepoLookup};

#[tokio::test]
async fn test_profile_upsert_and_me() {
    let (app, _) = common::create_test_app();
    let (token, user_id) = common::register(&app, "Ada", "ada@x.com", "secretpw").await;

    let (status, body) = send(&app, Method::GET, "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "Profile not found");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/profile",
        Some(&token),
        Some(json!({
            "status": "Developer",
            "skills": "rust,  sql",
            "githubusername": "octocat",
            "linkedin": "https://linkedin.com/in/ada"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner"], user_id.as_str());
    assert_eq!(body["skills"], json!(["rust", "sql"]));
    assert_eq!(body["social"]["linkedin"], "https://linkedin.com/in/ada");

    let (status, body) = send(&app, Method::GET, "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Developer");
    assert_eq!(body["user"]["name"], "Ada");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/profileById/{}", user_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["githubusername"], "octocat");
}

#[tokio::test]
async fn test_profile_by_bad_id_is_not_found() {
    let (app, _) = common::create_test_app();

    for id in ["not-a-uuid", "00000000-0000-0000-0000-000000000000"] {
        let (status, body) =
            send(&app, Method::GET, &format!("/api/profileById/{}", id), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["msg"], "Profile not found");
    }
}

#[tokio::test]
async fn test_list_profiles_is_public() {
    let (app, _) = common::create_test_app();
    let (ada, _) = common::register(&app, "Ada", "ada@x.com", "secretpw").await;
    let (bob, _) = common::register(&app, "Bob", "bob@x.com", "secretpw").await;
    common::register(&app, "Cy", "cy@x.com", "secretpw").await;
    for token in [&ada, &bob] {
        send(&app, Method::POST, "/api/profile", Some(token), Some(json!({ "status": "Dev" }))).await;
    }

    let (status, body) = send(&app, Method::GET, "/api/profiles", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let profiles = body.as_array().unwrap();
    assert_eq!(profiles.len(), 2);
    assert!(profiles.iter().all(|p| p["user"]["name"].is_string()));
}

#[tokio::test]
async fn test_experience_and_education_lifecycle() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register(&app, "Ada", "ada@x.com", "secretpw").await;
    send(&app, Method::POST, "/api/profile", Some(&token), Some(json!({}))).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/profile/me/experience",
        Some(&token),
        Some(json!({ "title": "Engineer", "company": "Acme", "from": "2019-05-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let exp_id = body["experience"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["name"], "Ada");

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/profile/me/experience",
        Some(&token),
        Some(json!({ "title": "Engineer", "salary": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "msg": "Invalid Updates!" }));

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/profile/me/education",
        Some(&token),
        Some(json!({ "school": "MIT", "degree": "BSc", "current": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let edu_id = body["education"][0]["id"].as_str().unwrap().to_string();

    // Unknown id leaves both lists untouched
    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/profile/me/experience/does-not-exist",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["experience"].as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/profile/me/experience/{}", exp_id.to_uppercase()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["experience"], json!([]));
    assert_eq!(body["education"].as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/profile/me/education/{}", edu_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["education"], json!([]));
}

#[tokio::test]
async fn test_entry_values_are_parsed_leniently() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register(&app, "Ada", "ada@x.com", "secretpw").await;
    send(&app, Method::POST, "/api/profile", Some(&token), Some(json!({}))).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/profile/me/experience",
        Some(&token),
        Some(json!({ "title": "Dev", "from": "2020-01-01T00:00:00.000Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "datetime rejected: {}", body);
    assert!(body["experience"][0]["from"]
        .as_str()
        .unwrap()
        .starts_with("2020-01-01T00:00:00"));

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/profile/me/education",
        Some(&token),
        Some(json!({ "school": "MIT", "current": null, "to": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "null rejected: {}", body);
    assert_eq!(body["education"][0]["current"], false);

    // A known key with an unusable value is not an unknown-key error
    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/profile/me/experience",
        Some(&token),
        Some(json!({ "title": "Dev", "from": "last spring" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let msg = body["msg"].as_str().unwrap();
    assert_ne!(msg, "Invalid Updates!");
    assert!(msg.starts_with("Invalid field value"));
}

#[tokio::test]
async fn test_delete_my_profile_closes_account() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register(&app, "Ada", "ada@x.com", "secretpw").await;
    send(&app, Method::POST, "/api/profile", Some(&token), Some(json!({}))).await;

    let (status, body) = send(&app, Method::DELETE, "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Successfully deleted account");

    let (status, _) = common::login(&app, "ada@x.com", "secretpw").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_github_repos_passthrough() {
    let mock = Arc::new(MockRepoLookup::default());
    let (app, _) = common::create_test_app_with(mock.clone());

    let (status, body) = send(&app, Method::GET, "/api/profile/github/octocat", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, mock.repos);
    assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_github_failure_is_generic_not_found() {
    let mock = Arc::new(MockRepoLookup {
        should_fail: true,
        ..Default::default()
    });
    let (app, _) = common::create_test_app_with(mock);

    let (status, body) = send(&app, Method::GET, "/api/profile/github/ghost", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "msg": "No Github Profile Found..." }));
}
