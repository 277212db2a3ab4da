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
use crate::models::sections::EducationRow;
use crate::sections::CvIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EducationPayload {
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field_of_study: String,
    #[serde(default)]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateEducation {
    pub cv_id: Uuid,
    #[serde(flatten)]
    pub fields: EducationPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct EducationPatch {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: Option<bool>,
    pub grade: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
}

impl EducationPatch {
    fn apply(self, row: &mut EducationRow) {
        if let Some(v) = self.institution {
            row.institution = v;
        }
        if let Some(v) = self.degree {
            row.degree = v;
        }
        if let Some(v) = self.field_of_study {
            row.field_of_study = v;
        }
        if let Some(v) = self.location {
            row.location = v;
        }
        if let Some(v) = self.start_date {
            row.start_date = v;
        }
        if let Some(v) = self.end_date {
            row.end_date = Some(v);
        }
        if let Some(v) = self.is_current {
            row.is_current = v;
        }
        if let Some(v) = self.grade {
            row.grade = v;
        }
        if let Some(v) = self.description {
            row.description = v;
        }
        if let Some(v) = self.order {
            row.order = v;
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Education entry {id} not found"))
}

/// GET /api/v1/education?cv_id=
pub async fn handle_list(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<CvIdQuery>,
) -> Result<Json<Vec<EducationRow>>, AppError> {
    let rows = match query.cv_id {
        Some(cv_id) => {
            sqlx::query_as::<_, EducationRow>(
                r#"
                SELECT e.* FROM education e
                JOIN cvs c ON c.id = e.cv_id
                WHERE c.user_id = $1 AND e.cv_id = $2
                ORDER BY e."order", e.start_date DESC
                "#,
            )
            .bind(principal.0)
            .bind(cv_id)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, EducationRow>(
                r#"
                SELECT e.* FROM education e
                JOIN cvs c ON c.id = e.cv_id
                WHERE c.user_id = $1
                ORDER BY e."order", e.start_date DESC
                "#,
            )
            .bind(principal.0)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(rows))
}

/// GET /api/v1/education/:id
pub async fn handle_get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<EducationRow>, AppError> {
    let row = sqlx::query_as::<_, EducationRow>(
        r#"
        SELECT e.* FROM education e
        JOIN cvs c ON c.id = e.cv_id
        WHERE e.id = $1 AND c.user_id = $2
        "#,
    )
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(row))
}

/// POST /api/v1/education
pub async fn handle_create(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<CreateEducation>,
) -> Result<(StatusCode, Json<EducationRow>), AppError> {
    if !scope::cv_is_owned(&state.db, principal.0, req.cv_id).await? {
        return Err(AppError::NotFound(format!("CV {} not found", req.cv_id)));
    }

    let row = sqlx::query_as::<_, EducationRow>(
        r#"
        INSERT INTO education
            (cv_id, institution, degree, field_of_study, location, start_date,
             end_date, is_current, grade, description, "order")
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(req.cv_id)
    .bind(&req.fields.institution)
    .bind(&req.fields.degree)
    .bind(&req.fields.field_of_study)
    .bind(&req.fields.location)
    .bind(req.fields.start_date)
    .bind(req.fields.end_date)
    .bind(req.fields.is_current)
    .bind(&req.fields.grade)
    .bind(&req.fields.description)
    .bind(req.fields.order)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/education/:id
pub async fn handle_update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(fields): Json<EducationPayload>,
) -> Result<Json<EducationRow>, AppError> {
    let row = sqlx::query_as::<_, EducationRow>(
        r#"
        UPDATE education
        SET institution = $1, degree = $2, field_of_study = $3, location = $4,
            start_date = $5, end_date = $6, is_current = $7, grade = $8,
            description = $9, "order" = $10
        WHERE id = $11 AND cv_id IN (SELECT id FROM cvs WHERE user_id = $12)
        RETURNING *
        "#,
    )
    .bind(&fields.institution)
    .bind(&fields.degree)
    .bind(&fields.field_of_study)
    .bind(&fields.location)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.is_current)
    .bind(&fields.grade)
    .bind(&fields.description)
    .bind(fields.order)
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(row))
}

/// PATCH /api/v1/education/:id
pub async fn handle_patch(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(patch): Json<EducationPatch>,
) -> Result<Json<EducationRow>, AppError> {
    let mut row = sqlx::query_as::<_, EducationRow>(
        r#"
        SELECT e.* FROM education e
        JOIN cvs c ON c.id = e.cv_id
        WHERE e.id = $1 AND c.user_id = $2
        "#,
    )
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    patch.apply(&mut row);

    let updated = sqlx::query_as::<_, EducationRow>(
        r#"
        UPDATE education
        SET institution = $1, degree = $2, field_of_study = $3, location = $4,
            start_date = $5, end_date = $6, is_current = $7, grade = $8,
            description = $9, "order" = $10
        WHERE id = $11
        RETURNING *
        "#,
    )
    .bind(&row.institution)
    .bind(&row.degree)
    .bind(&row.field_of_study)
    .bind(&row.location)
    .bind(row.start_date)
    .bind(row.end_date)
    .bind(row.is_current)
    .bind(&row.grade)
    .bind(&row.description)
    .bind(row.order)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// DELETE /api/v1/education/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query(
        "DELETE FROM education WHERE id = $1 AND cv_id IN (SELECT id FROM cvs WHERE user_id = $2)",
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
