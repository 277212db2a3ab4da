use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::cvs::scope;
use crate::errors::AppError;
use crate::models::sections::ProjectRow;
use crate::sections::CvIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProjectPayload {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub technologies: String,
    #[serde(default)]
    pub url: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub cv_id: Uuid,
    #[serde(flatten)]
    pub fields: ProjectPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<String>,
    pub url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub order: Option<i32>,
}

impl ProjectPatch {
    fn apply(self, row: &mut ProjectRow) {
        if let Some(v) = self.title {
            row.title = v;
        }
        if let Some(v) = self.description {
            row.description = v;
        }
        if let Some(v) = self.technologies {
            row.technologies = v;
        }
        if let Some(v) = self.url {
            row.url = v;
        }
        if let Some(v) = self.start_date {
            row.start_date = Some(v);
        }
        if let Some(v) = self.end_date {
            row.end_date = Some(v);
        }
        if let Some(v) = self.order {
            row.order = v;
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Project {id} not found"))
}

/// GET /api/v1/projects?cv_id=
pub async fn handle_list(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<CvIdQuery>,
) -> Result<Json<Vec<ProjectRow>>, AppError> {
    let rows = match query.cv_id {
        Some(cv_id) => {
            sqlx::query_as::<_, ProjectRow>(
                r#"
                SELECT p.* FROM projects p
                JOIN cvs c ON c.id = p.cv_id
                WHERE c.user_id = $1 AND p.cv_id = $2
                ORDER BY p."order", p.start_date DESC
                "#,
            )
            .bind(principal.0)
            .bind(cv_id)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, ProjectRow>(
                r#"
                SELECT p.* FROM projects p
                JOIN cvs c ON c.id = p.cv_id
                WHERE c.user_id = $1
                ORDER BY p."order", p.start_date DESC
                "#,
            )
            .bind(principal.0)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(rows))
}

/// GET /api/v1/projects/:id
pub async fn handle_get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectRow>, AppError> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT p.* FROM projects p
        JOIN cvs c ON c.id = p.cv_id
        WHERE p.id = $1 AND c.user_id = $2
        "#,
    )
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(row))
}

/// POST /api/v1/projects
pub async fn handle_create(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<CreateProject>,
) -> Result<(StatusCode, Json<ProjectRow>), AppError> {
    if !scope::cv_is_owned(&state.db, principal.0, req.cv_id).await? {
        return Err(AppError::NotFound(format!("CV {} not found", req.cv_id)));
    }

    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects
            (cv_id, title, description, technologies, url, start_date,
             end_date, "order")
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(req.cv_id)
    .bind(&req.fields.title)
    .bind(&req.fields.description)
    .bind(&req.fields.technologies)
    .bind(&req.fields.url)
    .bind(req.fields.start_date)
    .bind(req.fields.end_date)
    .bind(req.fields.order)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/projects/:id
pub async fn handle_update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(fields): Json<ProjectPayload>,
) -> Result<Json<ProjectRow>, AppError> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        UPDATE projects
        SET title = $1, description = $2, technologies = $3, url = $4,
            start_date = $5, end_date = $6, "order" = $7
        WHERE id = $8 AND cv_id IN (SELECT id FROM cvs WHERE user_id = $9)
        RETURNING *
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.technologies)
    .bind(&fields.url)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.order)
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(row))
}

/// PATCH /api/v1/projects/:id
pub async fn handle_patch(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<ProjectRow>, AppError> {
    let mut row = sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT p.* FROM projects p
        JOIN cvs c ON c.id = p.cv_id
        WHERE p.id = $1 AND c.user_id = $2
        "#,
    )
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    patch.apply(&mut row);

    let updated = sqlx::query_as::<_, ProjectRow>(
        r#"
        UPDATE projects
        SET title = $1, description = $2, technologies = $3, url = $4,
            start_date = $5, end_date = $6, "order" = $7
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&row.title)
    .bind(&row.description)
    .bind(&row.technologies)
    .bind(&row.url)
    .bind(row.start_date)
    .bind(row.end_date)
    .bind(row.order)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// DELETE /api/v1/projects/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query(
        "DELETE FROM projects WHERE id = $1 AND cv_id IN (SELECT id FROM cvs WHERE user_id = $2)",
    )
    .bind(id)
    .bind(principal.0)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}
