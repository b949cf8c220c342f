use lms_core::payload::StepPayload;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Simulation, Step};

#[derive(Debug, Clone)]
pub struct SimulationFields<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub image_url: Option<&'a str>,
    pub keywords: &'a [String],
}

pub async fn slug_taken<'e, E>(executor: E, slug: &str, except: Option<Uuid>) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT EXISTS(
                SELECT 1 FROM simulations
                WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
        "#,
    )
    .bind(slug)
    .bind(except)
    .fetch_one(executor)
    .await
}

pub async fn insert_simulation<'e, E>(
    executor: E,
    fields: &SimulationFields<'_>,
    author_id: Uuid,
) -> Result<Simulation, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO simulations (title, slug, description, image_url, keywords, author_id, version)
            VALUES ($1, $2, $3, $4, $5, $6, 1)
            RETURNING *
        "#,
    )
    .bind(fields.title)
    .bind(fields.slug)
    .bind(fields.description)
    .bind(fields.image_url)
    .bind(fields.keywords)
    .bind(author_id)
    .fetch_one(executor)
    .await
}

pub async fn update_simulation<'e, E>(
    executor: E,
    id: Uuid,
    fields: &SimulationFields<'_>,
) -> Result<Option<Simulation>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE simulations
            SET title = $2,
                slug = $3,
                description = $4,
                image_url = $5,
                keywords = $6,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(id)
    .bind(fields.title)
    .bind(fields.slug)
    .bind(fields.description)
    .bind(fields.image_url)
    .bind(fields.keywords)
    .fetch_optional(executor)
    .await
}

pub async fn find_simulation<'e, E>(executor: E, id: Uuid) -> Result<Option<Simulation>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM simulations WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_simulations<'e, E>(
    executor: E,
    author_id: Option<Uuid>,
) -> Result<Vec<Simulation>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM simulations
            WHERE $1::uuid IS NULL OR author_id = $1
            ORDER BY created_at DESC
        "#,
    )
    .bind(author_id)
    .fetch_all(executor)
    .await
}

pub async fn delete_simulation<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM simulations WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_steps<'e, E>(executor: E, simulation_id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM steps WHERE simulation_id = $1
        "#,
    )
    .bind(simulation_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_step<'e, E>(
    executor: E,
    simulation_id: Uuid,
    step: &StepPayload,
    position: i32,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO steps (simulation_id, title, content, video_url, video_preview_url, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
        "#,
    )
    .bind(simulation_id)
    .bind(step.title.trim())
    .bind(&step.content)
    .bind(step.video_url.as_deref())
    .bind(step.video_preview_url.as_deref())
    .bind(position)
    .fetch_one(executor)
    .await
}

pub async fn list_steps<'e, E>(executor: E, simulation_id: Uuid) -> Result<Vec<Step>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM steps
            WHERE simulation_id = $1
            ORDER BY position
        "#,
    )
    .bind(simulation_id)
    .fetch_all(executor)
    .await
}

/// Storage URLs referenced by the simulation's steps (videos and previews).
pub async fn step_file_urls<'e, E>(executor: E, simulation_id: Uuid) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT url FROM (
                SELECT video_url AS url FROM steps WHERE simulation_id = $1
                UNION
                SELECT video_preview_url AS url FROM steps WHERE simulation_id = $1
            ) urls
            WHERE url IS NOT NULL
        "#,
    )
    .bind(simulation_id)
    .fetch_all(executor)
    .await
}
