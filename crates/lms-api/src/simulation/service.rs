use lms_core::payload::SimulationPayload;
use lms_db::{
    models::Simulation,
    repositories::simulation::{self as simulation_repo, SimulationFields},
};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

async fn write_steps(conn: &mut PgConnection, simulation_id: Uuid, payload: &SimulationPayload) -> Result<(), sqlx::Error> {
    for (i, step) in payload.steps.iter().enumerate() {
        simulation_repo::insert_step(&mut *conn, simulation_id, step, i as i32).await?;
    }
    Ok(())
}

fn fields<'a>(payload: &'a SimulationPayload, slug: &'a str, keywords: &'a [String]) -> SimulationFields<'a> {
    SimulationFields {
        title: payload.title.trim(),
        slug,
        description: &payload.description,
        image_url: payload.image_url.as_deref(),
        keywords,
    }
}

pub async fn create(
    pool: &PgPool,
    payload: &SimulationPayload,
    slug: &str,
    keywords: &[String],
    author_id: Uuid,
) -> Result<Simulation, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let simulation = simulation_repo::insert_simulation(&mut *tx, &fields(payload, slug, keywords), author_id).await?;
    write_steps(&mut *tx, simulation.id, payload).await?;

    tx.commit().await?;
    Ok(simulation)
}

/// Overwrite the header and replace all steps. `None` if the simulation vanished.
pub async fn replace(
    pool: &PgPool,
    id: Uuid,
    payload: &SimulationPayload,
    slug: &str,
    keywords: &[String],
) -> Result<Option<Simulation>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(simulation) = simulation_repo::update_simulation(&mut *tx, id, &fields(payload, slug, keywords)).await?
    else {
        return Ok(None);
    };
    simulation_repo::delete_steps(&mut *tx, id).await?;
    write_steps(&mut *tx, id, payload).await?;

    tx.commit().await?;
    Ok(Some(simulation))
}

pub fn referenced_urls(payload: &SimulationPayload) -> Vec<&str> {
    let step_urls = payload
        .steps
        .iter()
        .flat_map(|s| [s.video_url.as_deref(), s.video_preview_url.as_deref()])
        .flatten();
    payload.image_url.as_deref().into_iter().chain(step_urls).collect()
}

#[cfg(test)]
mod tests {
    use lms_core::payload::StepPayload;

    use super::*;

    #[test]
    fn test_referenced_urls_include_previews() {
        let payload = SimulationPayload {
            title: "Triage".to_string(),
            steps: vec![StepPayload {
                title: "S".to_string(),
                content: "C".to_string(),
                video_url: Some("v".to_string()),
                video_preview_url: Some("p".to_string()),
                order: 0,
            }],
            ..Default::default()
        };
        assert_eq!(referenced_urls(&payload), vec!["v", "p"]);
    }
}
