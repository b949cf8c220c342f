use axum::http::StatusCode;
use lms_api::auth::Role;
use serde_json::Value;

use crate::common;

#[tokio::test]
async fn test_health_and_fallback() {
    let Some(app) = common::app().await else { return };

    app.client.get("/health", None).await.assert_status(StatusCode::OK);
    app.client
        .get("/no/such/route", None)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_and_bad_tokens() {
    let Some(app) = common::app().await else { return };

    let response = app.client.get("/courses/progress?lang=en", None).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Not authorized");

    let response = app.client.get("/courses/progress", Some("not-a-jwt")).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let Some(mut app) = common::app().await else { return };
    let (_, token) = common::token(&app.state, Role::Root);

    app.state.jwt_secret = "another_secret_that_is_also_long_enough".to_string();
    let client = common::TestClient::new(lms_api::router::router().with_state(app.state.clone()));

    client
        .get("/courses/control", Some(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_localized_errors() {
    let Some(app) = common::app().await else { return };

    let response = app.client.get("/courses/progress", None).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Не авторизовано");
}
