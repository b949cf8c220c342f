use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    ApiConfig,
    config::Environment,
    storage::{ObjectStore, S3Store},
};

#[derive(Clone)]
pub struct ApiState {
    pub pool: PgPool,
    pub jwt_secret: String,
    pub environment: Environment,
    pub storage: Arc<dyn ObjectStore>,
}

impl ApiState {
    pub async fn new(config: &ApiConfig, pool: PgPool) -> anyhow::Result<Self> {
        let storage = S3Store::new(config).await;
        tracing::info!(bucket = %config.s3_bucket, "object storage configured");

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            environment: config.env,
            storage: Arc::new(storage),
        })
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("environment", &self.environment)
            .field("storage", &self.storage.public_base())
            .finish_non_exhaustive()
    }
}

/// The slice of state the auth extractor needs.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            jwt_secret: state.jwt_secret.clone(),
        }
    }
}
