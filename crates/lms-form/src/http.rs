//! [`FormBackend`] over the platform's HTTP API.

use async_trait::async_trait;
use lms_core::{
    UploadKind,
    i18n::Lang,
    payload::{CoursePayload, ONLY_CHECK_SLUG_HEADER, SavedEntity, SimulationPayload, UploadedFile},
};
use reqwest::{
    Client, Method, RequestBuilder, Response, StatusCode,
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    draft::PendingFile,
    submit::{BackendError, EntityKind, FormBackend},
};

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: String,
    lang: Lang,
}

#[derive(Serialize)]
struct SlugCheckBody<'a> {
    title: &'a str,
    lang: Lang,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpBackend {
    /// `base_url` is the API root (no trailing slash), `token` a bearer JWT.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, lang: Lang) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            lang,
        }
    }

    fn entity_request(&self, kind: EntityKind, id: Option<Uuid>) -> RequestBuilder {
        let collection = match kind {
            EntityKind::Course => "courses",
            EntityKind::Simulation => "simulations",
        };
        let (method, url) = match id {
            None => (Method::POST, format!("{}/{collection}/control", self.base_url)),
            Some(id) => (Method::PUT, format!("{}/{collection}/{id}", self.base_url)),
        };
        self.request(method, url)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .query(&[("lang", self.lang.code())])
    }
}

/// Turn a non-success response into a [`BackendError`].
async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::CONFLICT {
        return Err(BackendError::Conflict);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("error").to_string(),
    };
    Err(BackendError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl FormBackend for HttpBackend {
    async fn check_slug(&self, kind: EntityKind, id: Option<Uuid>, title: &str, lang: Lang) -> Result<(), BackendError> {
        let response = self
            .entity_request(kind, id)
            .header(ONLY_CHECK_SLUG_HEADER, "true")
            .json(&SlugCheckBody { title, lang })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn upload(&self, kind: UploadKind, file: &PendingFile) -> Result<String, BackendError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("file_type", kind.as_str());

        let response = self
            .request(Method::POST, format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadedFile = check(response).await?.json().await?;
        Ok(uploaded.url)
    }

    async fn save_course(&self, id: Option<Uuid>, payload: &CoursePayload) -> Result<SavedEntity, BackendError> {
        let response = self
            .entity_request(EntityKind::Course, id)
            .json(payload)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn save_simulation(
        &self,
        id: Option<Uuid>,
        payload: &SimulationPayload,
    ) -> Result<SavedEntity, BackendError> {
        let response = self
            .entity_request(EntityKind::Simulation, id)
            .json(payload)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}
