use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use lms_core::{
    UploadKind,
    payload::UploadedFile,
    upload::{FileRule, object_key},
};

use crate::{
    ApiState,
    auth::{AuthUser, Role},
    error::ApiError,
    lang::RequestLang,
    metrics::record_upload,
};

/// Largest accepted request: the biggest file rule plus room for the multipart framing.
const MAX_UPLOAD_BODY: usize = FileRule::LessonVideo.max_bytes() as usize + 1024 * 1024;

/// Create the file upload route
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY))
}

struct IncomingFile {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Store one file under `{file_type}/{random}-{name}` and return its public URL.
async fn upload_file(
    auth_user: AuthUser,
    lang: RequestLang,
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<Json<UploadedFile>, ApiError> {
    let m = lang.messages();
    auth_user.require_role(Role::AUTHORS, lang)?;

    let malformed = |e: axum::extract::multipart::MultipartError| {
        tracing::warn!(error = %e, "malformed upload body");
        ApiError::Upload(m.invalid_request.to_string())
    };

    let mut file = None;
    let mut file_type = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("file").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(malformed)?.to_vec();
                file = Some(IncomingFile {
                    name,
                    content_type,
                    bytes,
                });
            }
            Some("file_type") => file_type = Some(field.text().await.map_err(malformed)?),
            _ => {}
        }
    }

    let file = file
        .filter(|f| !f.bytes.is_empty())
        .ok_or_else(|| ApiError::Upload(m.file_required.to_string()))?;
    let kind: UploadKind = file_type
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .parse()
        .map_err(|_| ApiError::Upload(m.invalid_request.to_string()))?;

    FileRule::for_kind(kind)
        .check(&file.name, &file.content_type, file.bytes.len() as u64)
        .map_err(|e| ApiError::Upload(m.upload_rule(&e)))?;

    let key = object_key(kind, &hex::encode(rand::random::<[u8; 4]>()), &file.name);
    let size = file.bytes.len();
    let url = match state.storage.put_object(&key, file.bytes, &file.content_type).await {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, %key, "upload to object storage failed");
            record_upload(kind, false);
            return Err(ApiError::Storage(m.upload_error.to_string()));
        }
    };

    record_upload(kind, true);
    tracing::info!(%key, size, user_id = %auth_user.user_id, "file uploaded");
    Ok(Json(UploadedFile { url }))
}
