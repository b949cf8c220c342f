use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use lms_api::{
    auth::{
        Role,
        jwt::{TokenSubject, generate_jwt_token},
    },
    config::Environment,
    router,
    state::ApiState,
    storage::{ObjectStore, StorageError},
};
use serde::Deserialize;
use tower::ServiceExt;
use uuid::Uuid;

pub const PUBLIC_BASE: &str = "https://cdn.test/lms";

/// Test configuration
pub struct TestConfig {
    pub database_url: Option<String>,
    pub jwt_secret: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            database_url: std::env::var("TEST_DATABASE_URL").ok(),
            jwt_secret: "test_jwt_secret_minimum_32_characters_long".to_string(),
        }
    }
}

/// Object store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub objects: Mutex<Vec<(String, String, usize)>>,
    pub deleted: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _, _)| key.clone())
            .collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string(), bytes.len()));
        Ok(format!("{PUBLIC_BASE}/{key}"))
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn public_base(&self) -> &str {
        PUBLIC_BASE
    }
}

/// Test state builder for creating an ApiState backed by the test database
pub struct TestStateBuilder {
    config: TestConfig,
    storage: Arc<MemoryStore>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            config: TestConfig::default(),
            storage: Arc::new(MemoryStore::default()),
        }
    }

    pub fn storage(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.storage)
    }

    /// Build a test ApiState with a real database connection.
    ///
    /// Returns `None` when `TEST_DATABASE_URL` is not set.
    pub async fn build(self) -> anyhow::Result<Option<ApiState>> {
        let Some(database_url) = self.config.database_url else {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return Ok(None);
        };

        let pool = lms_db::create_pool(&database_url, 10).await?;
        lms_db::ensure_db_and_migrate(&database_url, &pool).await?;

        Ok(Some(ApiState {
            pool,
            jwt_secret: self.config.jwt_secret,
            environment: Environment::Development,
            storage: self.storage,
        }))
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A state, a client over the full router and the store behind it.
pub struct TestApp {
    pub state: ApiState,
    pub client: TestClient,
    pub storage: Arc<MemoryStore>,
}

/// Build the app, or `None` when no test database is configured.
pub async fn app() -> Option<TestApp> {
    let builder = TestStateBuilder::new();
    let storage = builder.storage();
    let state = builder.build().await.expect("Failed to create test state")?;
    let client = TestClient::new(router::router().with_state(state.clone()));
    Some(TestApp {
        state,
        client,
        storage,
    })
}

/// A signed token for a fresh user with `role`.
pub fn token(state: &ApiState, role: Role) -> (Uuid, String) {
    let user_id = Uuid::new_v4();
    let subject = TokenSubject {
        user_id,
        email: "author@example.com",
        name: "Test User",
        role,
    };
    let token = generate_jwt_token(&subject, &state.jwt_secret, 1).expect("Failed to sign token");
    (user_id, token)
}

/// Title unique to one test run, so slugs never collide across tests.
pub fn unique_title(prefix: &str) -> String {
    format!("{prefix} {}", &Uuid::new_v4().simple().to_string()[..8])
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a request and get the response
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match token {
            Some(token) => builder.header("authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Send a GET request
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let request = Self::builder("GET", uri, token)
            .body(Body::empty())
            .expect("Failed to build request");
        self.request(request).await
    }

    /// Send a DELETE request
    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let request = Self::builder("DELETE", uri, token)
            .body(Body::empty())
            .expect("Failed to build request");
        self.request(request).await
    }

    /// Send a request with a JSON body
    pub async fn send_json<T: serde::Serialize>(
        &self,
        method: &str,
        uri: &str,
        body: &T,
        token: Option<&str>,
        extra_header: Option<(&str, &str)>,
    ) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");
        let mut builder = Self::builder(method, uri, token).header("content-type", "application/json");
        if let Some((name, value)) = extra_header {
            builder = builder.header(name, value);
        }
        let request = builder.body(Body::from(json_body)).expect("Failed to build request");
        self.request(request).await
    }

    /// Send a POST request with a JSON body
    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T, token: Option<&str>) -> TestResponse {
        self.send_json("POST", uri, body, token, None).await
    }

    /// Send a PUT request with a JSON body
    pub async fn put_json<T: serde::Serialize>(&self, uri: &str, body: &T, token: Option<&str>) -> TestResponse {
        self.send_json("PUT", uri, body, token, None).await
    }

    /// Send a multipart upload with a `file` part and a `file_type` part
    pub async fn upload(
        &self,
        token: Option<&str>,
        file_type: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> TestResponse {
        const BOUNDARY: &str = "lms-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file_type\"\r\n\r\n{file_type}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Self::builder("POST", "/upload", token)
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .expect("Failed to build request");
        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }
}

pub mod db {
    use sqlx::PgPool;
    use uuid::Uuid;

    /// Delete a course; sections, lessons and progress cascade.
    pub async fn delete_course(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete_simulation(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM simulations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lesson ids of a course in section then lesson order.
    pub async fn lesson_ids(pool: &PgPool, course_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT l.id FROM lessons l
            JOIN sections s ON s.id = l.section_id
            WHERE s.course_id = $1
            ORDER BY s.position, l.position
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
