use axum::http::StatusCode;
use lms_api::auth::Role;
use lms_core::payload::SavedEntity;
use serde_json::{Value, json};

use crate::common::{self, PUBLIC_BASE};

pub fn course_body(title: &str, lessons_per_section: &[usize]) -> Value {
    let sections: Vec<Value> = lessons_per_section
        .iter()
        .enumerate()
        .map(|(s, &count)| {
            let lessons: Vec<Value> = (0..count)
                .map(|l| {
                    json!({
                        "title": format!("Lesson {s}.{l}"),
                        "type": "TEXT",
                        "content": "Read this carefully.",
                        "order": l,
                    })
                })
                .collect();
            json!({ "title": format!("Section {s}"), "order": s, "lessons": lessons })
        })
        .collect();

    json!({
        "title": title,
        "description": "Emergency care basics",
        "keywords": ["airway", "Triage"],
        "sections": sections,
        "lang": "en",
    })
}

#[tokio::test]
async fn test_create_and_read_course() {
    let Some(app) = common::app().await else { return };
    let (_, token) = common::token(&app.state, Role::Medic);
    let title = common::unique_title("Airway Management");

    let response = app
        .client
        .post_json("/courses/control", &course_body(&title, &[2, 1]), Some(&token))
        .await;
    response.assert_status(StatusCode::CREATED);
    let saved: SavedEntity = response.json();
    assert_eq!(saved.version, 1);
    assert!(saved.slug.starts_with("airway-management-"));

    let response = app.client.get(&format!("/courses/{}", saved.id), None).await;
    response.assert_status(StatusCode::OK);
    let json: Value = response.json();
    assert_eq!(json["total_lessons"], 3);
    assert_eq!(json["keywords"], json!(["airway", "triage"]));
    assert_eq!(json["sections"].as_array().unwrap().len(), 2);
    assert_eq!(json["sections"][0]["lessons"][1]["title"], "Lesson 0.1");
    assert!(json["sections"][0]["lessons"][0].get("completed").is_none());
    assert!(json["user_progress"].is_null());

    common::db::delete_course(&app.state.pool, saved.id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_learner_cannot_author() {
    let Some(app) = common::app().await else { return };
    let (_, token) = common::token(&app.state, Role::User);

    let response = app
        .client
        .post_json(
            "/courses/control",
            &course_body(&common::unique_title("Nope"), &[1]),
            Some(&token),
        )
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let json: Value = response.json();
    assert_eq!(json["error"], "Not enough rights");
}

#[tokio::test]
async fn test_slug_conflict_and_check_mode() {
    let Some(app) = common::app().await else { return };
    let (_, token) = common::token(&app.state, Role::Medic);
    let title = common::unique_title("Sepsis Bundle");

    // Check mode on a free slug saves nothing.
    let response = app
        .client
        .send_json(
            "POST",
            "/courses/control",
            &json!({ "title": title, "lang": "en" }),
            Some(&token),
            Some(("x-only-check-slug", "true")),
        )
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "ok": true }));

    let saved: SavedEntity = app
        .client
        .post_json("/courses/control", &course_body(&title, &[1]), Some(&token))
        .await
        .json();

    // Same title with different casing maps to the same slug.
    let response = app
        .client
        .post_json(
            "/courses/control",
            &course_body(&title.to_uppercase(), &[1]),
            Some(&token),
        )
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let json: Value = response.json();
    assert_eq!(json["error"], "A course with this title already exists");

    // Updating a course under its own title is not a conflict.
    let response = app
        .client
        .send_json(
            "PUT",
            &format!("/courses/{}", saved.id),
            &json!({ "title": title, "lang": "en" }),
            Some(&token),
            Some(("x-only-check-slug", "true")),
        )
        .await;
    response.assert_status(StatusCode::OK);

    common::db::delete_course(&app.state.pool, saved.id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_invalid_course_rejected() {
    let Some(app) = common::app().await else { return };
    let (_, token) = common::token(&app.state, Role::Medic);

    let response = app
        .client
        .post_json(
            "/courses/control",
            &course_body(&common::unique_title("Empty"), &[1, 0]),
            Some(&token),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .client
        .post_json(
            "/courses/control",
            &json!({ "title": "   ", "sections": [], "lang": "en" }),
            Some(&token),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(json["error"], "Course title cannot be empty");
}

#[tokio::test]
async fn test_update_bumps_version_and_drops_replaced_files() {
    let Some(app) = common::app().await else { return };
    let (_, token) = common::token(&app.state, Role::Medic);
    let title = common::unique_title("Suturing");

    let old_cover = format!("{PUBLIC_BASE}/images/0a0a0a0a-old.png");
    let mut body = course_body(&title, &[1]);
    body["image_url"] = json!(old_cover);
    let saved: SavedEntity = app
        .client
        .post_json("/courses/control", &body, Some(&token))
        .await
        .json();

    let new_cover = format!("{PUBLIC_BASE}/images/0b0b0b0b-new.png");
    body["image_url"] = json!(new_cover);
    let response = app
        .client
        .put_json(&format!("/courses/{}", saved.id), &body, Some(&token))
        .await;
    response.assert_status(StatusCode::OK);
    let updated: SavedEntity = response.json();
    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.version, 2);
    assert_eq!(app.storage.deleted(), vec!["images/0a0a0a0a-old.png"]);

    common::db::delete_course(&app.state.pool, saved.id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_only_author_or_root_may_edit() {
    let Some(app) = common::app().await else { return };
    let (_, author) = common::token(&app.state, Role::Medic);
    let (_, other) = common::token(&app.state, Role::Medic);
    let (_, root) = common::token(&app.state, Role::Root);
    let title = common::unique_title("Burns");

    let body = course_body(&title, &[1]);
    let saved: SavedEntity = app
        .client
        .post_json("/courses/control", &body, Some(&author))
        .await
        .json();
    let uri = format!("/courses/{}", saved.id);

    app.client
        .put_json(&uri, &body, Some(&other))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.client
        .put_json(&uri, &body, Some(&root))
        .await
        .assert_status(StatusCode::OK);

    let listed: Vec<Value> = app.client.get("/courses/control", Some(&other)).await.json();
    assert!(listed.iter().all(|c| c["id"] != json!(saved.id)));

    let response = app.client.delete(&uri, Some(&author)).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "ok": true }));
    app.client.get(&uri, None).await.assert_status(StatusCode::NOT_FOUND);
}
