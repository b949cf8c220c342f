use axum::http::StatusCode;
use lms_api::auth::Role;
use lms_core::payload::UploadedFile;
use serde_json::Value;

use crate::common::{self, PUBLIC_BASE};

#[tokio::test]
async fn test_upload_image() {
    let Some(app) = common::app().await else { return };
    let (_, token) = common::token(&app.state, Role::Medic);

    let response = app
        .client
        .upload(Some(&token), "images", "cover photo.png", "image/png", b"\x89PNG....")
        .await;
    response.assert_status(StatusCode::OK);
    let uploaded: UploadedFile = response.json();

    let keys = app.storage.keys();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("images/"));
    assert!(keys[0].ends_with("-cover_photo.png"));
    assert_eq!(uploaded.url, format!("{PUBLIC_BASE}/{}", keys[0]));
}

#[tokio::test]
async fn test_upload_rejects_wrong_type() {
    let Some(app) = common::app().await else { return };
    let (_, token) = common::token(&app.state, Role::Medic);

    let response = app
        .client
        .upload(Some(&token), "videos", "notes.txt", "text/plain", b"hello")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_unknown_kind() {
    let Some(app) = common::app().await else { return };
    let (_, token) = common::token(&app.state, Role::Medic);

    let response = app
        .client
        .upload(Some(&token), "archives", "a.zip", "application/zip", b"PK")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_upload_requires_author() {
    let Some(app) = common::app().await else { return };
    let (_, token) = common::token(&app.state, Role::User);

    app.client
        .upload(Some(&token), "images", "a.png", "image/png", b"png")
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.client
        .upload(None, "images", "a.png", "image/png", b"png")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
