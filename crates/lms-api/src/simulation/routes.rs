use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use lms_core::payload::{SavedEntity, SimulationPayload, SlugCheck};
use lms_db::{models::Simulation, repositories::simulation as simulation_repo};
use serde_json::json;
use uuid::Uuid;

use super::{model::SimulationDetail, service};
use crate::{
    ApiState,
    auth::{AuthUser, Role},
    entity::{conflict_on_unique, derive_slug, only_check_slug, stale_urls},
    error::ApiError,
    lang::RequestLang,
    storage::delete_urls,
    validation,
};

/// Create the simulation routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/simulations/control", get(list_control).post(create_simulation))
        .route("/simulations/available", get(list_available))
        .route(
            "/simulations/{id}",
            get(get_simulation)
                .put(update_simulation)
                .delete(delete_simulation),
        )
}

async fn with_steps(state: &ApiState, simulations: Vec<Simulation>) -> Result<Vec<SimulationDetail>, ApiError> {
    let mut details = Vec::with_capacity(simulations.len());
    for simulation in simulations {
        let steps = simulation_repo::list_steps(&state.pool, simulation.id).await?;
        details.push(SimulationDetail { simulation, steps });
    }
    Ok(details)
}

async fn list_control(
    auth_user: AuthUser,
    lang: RequestLang,
    State(state): State<ApiState>,
) -> Result<Json<Vec<SimulationDetail>>, ApiError> {
    auth_user.require_role(Role::AUTHORS, lang)?;

    let author = (!auth_user.is_root()).then_some(auth_user.user_id);
    let simulations = simulation_repo::list_simulations(&state.pool, author).await?;
    Ok(Json(with_steps(&state, simulations).await?))
}

/// Every simulation, newest first.
async fn list_available(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<SimulationDetail>>, ApiError> {
    let simulations = simulation_repo::list_simulations(&state.pool, None).await?;
    Ok(Json(with_steps(&state, simulations).await?))
}

async fn create_simulation(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(payload): Json<SimulationPayload>,
) -> Result<Response, ApiError> {
    let lang = RequestLang(payload.lang);
    let m = lang.messages();
    auth_user.require_role(Role::AUTHORS, lang)?;

    let slug = derive_slug(&payload.title, m.simulation_title_required)?;
    if simulation_repo::slug_taken(&state.pool, &slug, None).await? {
        return Err(ApiError::Conflict(m.simulation_already_exists.to_string()));
    }
    if only_check_slug(&headers) {
        return Ok(Json(SlugCheck { ok: true }).into_response());
    }

    validation::validate_simulation(&payload, m)?;
    let keywords = validation::validate_keywords(&payload.keywords, m)?;

    let simulation = service::create(&state.pool, &payload, &slug, &keywords, auth_user.user_id)
        .await
        .map_err(|e| conflict_on_unique(e, m.simulation_already_exists))?;

    tracing::info!(simulation_id = %simulation.id, slug = %simulation.slug, "simulation created");
    let saved = SavedEntity {
        id: simulation.id,
        slug: simulation.slug,
        version: simulation.version,
    };
    Ok((StatusCode::CREATED, Json(saved)).into_response())
}

async fn get_simulation(
    lang: RequestLang,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SimulationDetail>, ApiError> {
    let simulation = simulation_repo::find_simulation(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(lang.messages().simulation_not_found.to_string()))?;
    let steps = simulation_repo::list_steps(&state.pool, id).await?;

    Ok(Json(SimulationDetail { simulation, steps }))
}

async fn update_simulation(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<SimulationPayload>,
) -> Result<Response, ApiError> {
    let lang = RequestLang(payload.lang);
    let m = lang.messages();
    auth_user.require_role(Role::AUTHORS, lang)?;

    let slug = derive_slug(&payload.title, m.simulation_title_required)?;
    if simulation_repo::slug_taken(&state.pool, &slug, Some(id)).await? {
        return Err(ApiError::Conflict(m.simulation_already_exists.to_string()));
    }
    if only_check_slug(&headers) {
        return Ok(Json(SlugCheck { ok: true }).into_response());
    }

    let current = simulation_repo::find_simulation(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(m.simulation_not_found.to_string()))?;
    auth_user.require_owner(current.author_id, lang)?;

    validation::validate_simulation(&payload, m)?;
    let keywords = validation::validate_keywords(&payload.keywords, m)?;

    let mut previous_files = simulation_repo::step_file_urls(&state.pool, id).await?;
    previous_files.extend(current.image_url);

    let simulation = service::replace(&state.pool, id, &payload, &slug, &keywords)
        .await
        .map_err(|e| conflict_on_unique(e, m.simulation_already_exists))?
        .ok_or_else(|| ApiError::NotFound(m.simulation_not_found.to_string()))?;

    let stale = stale_urls(previous_files, service::referenced_urls(&payload));
    delete_urls(state.storage.as_ref(), stale).await;

    tracing::info!(simulation_id = %simulation.id, version = simulation.version, "simulation updated");
    Ok(Json(SavedEntity {
        id: simulation.id,
        slug: simulation.slug,
        version: simulation.version,
    })
    .into_response())
}

async fn delete_simulation(
    auth_user: AuthUser,
    lang: RequestLang,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let m = lang.messages();
    auth_user.require_role(Role::AUTHORS, lang)?;

    let simulation = simulation_repo::find_simulation(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(m.simulation_not_found.to_string()))?;
    auth_user.require_owner(simulation.author_id, lang)?;

    let mut files = simulation_repo::step_file_urls(&state.pool, id).await?;
    files.extend(simulation.image_url);

    if !simulation_repo::delete_simulation(&state.pool, id).await? {
        return Err(ApiError::NotFound(m.simulation_not_found.to_string()));
    }
    delete_urls(state.storage.as_ref(), files).await;

    tracing::info!(simulation_id = %id, "simulation deleted");
    Ok(Json(json!({ "ok": true })))
}
