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
use crate::models::sections::WorkExperienceRow;
use crate::sections::CvIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WorkExperiencePayload {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    pub description: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkExperience {
    pub cv_id: Uuid,
    #[serde(flatten)]
    pub fields: WorkExperiencePayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkExperiencePatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: Option<bool>,
    pub description: Option<String>,
    pub order: Option<i32>,
}

impl WorkExperiencePatch {
    fn apply(self, row: &mut WorkExperienceRow) {
        if let Some(v) = self.company {
            row.company = v;
        }
        if let Some(v) = self.position {
            row.position = v;
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
        if let Some(v) = self.description {
            row.description = v;
        }
        if let Some(v) = self.order {
            row.order = v;
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Work experience {id} not found"))
}

/// GET /api/v1/work-experiences?cv_id=
pub async fn handle_list(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<CvIdQuery>,
) -> Result<Json<Vec<WorkExperienceRow>>, AppError> {
    let rows = match query.cv_id {
        Some(cv_id) => {
            sqlx::query_as::<_, WorkExperienceRow>(
                r#"
                SELECT w.* FROM work_experiences w
                JOIN cvs c ON c.id = w.cv_id
                WHERE c.user_id = $1 AND w.cv_id = $2
                ORDER BY w."order", w.start_date DESC
                "#,
            )
            .bind(principal.0)
            .bind(cv_id)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, WorkExperienceRow>(
                r#"
                SELECT w.* FROM work_experiences w
                JOIN cvs c ON c.id = w.cv_id
                WHERE c.user_id = $1
                ORDER BY w."order", w.start_date DESC
                "#,
            )
            .bind(principal.0)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(rows))
}

/// GET /api/v1/work-experiences/:id
pub async fn handle_get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkExperienceRow>, AppError> {
    let row = sqlx::query_as::<_, WorkExperienceRow>(
        r#"
        SELECT w.* FROM work_experiences w
        JOIN cvs c ON c.id = w.cv_id
        WHERE w.id = $1 AND c.user_id = $2
        "#,
    )
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(row))
}

/// POST /api/v1/work-experiences
///
/// The parent CV named in the body must belong to the caller; anything else
/// is reported as the CV not existing.
pub async fn handle_create(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<CreateWorkExperience>,
) -> Result<(StatusCode, Json<WorkExperienceRow>), AppError> {
    if !scope::cv_is_owned(&state.db, principal.0, req.cv_id).await? {
        return Err(AppError::NotFound(format!("CV {} not found", req.cv_id)));
    }

    let row = sqlx::query_as::<_, WorkExperienceRow>(
        r#"
        INSERT INTO work_experiences
            (cv_id, company, position, location, start_date, end_date,
             is_current, description, "order")
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(req.cv_id)
    .bind(&req.fields.company)
    .bind(&req.fields.position)
    .bind(&req.fields.location)
    .bind(req.fields.start_date)
    .bind(req.fields.end_date)
    .bind(req.fields.is_current)
    .bind(&req.fields.description)
    .bind(req.fields.order)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/work-experiences/:id
///
/// Full update. The parent CV is immutable.
pub async fn handle_update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(fields): Json<WorkExperiencePayload>,
) -> Result<Json<WorkExperienceRow>, AppError> {
    let row = sqlx::query_as::<_, WorkExperienceRow>(
        r#"
        UPDATE work_experiences
        SET company = $1, position = $2, location = $3, start_date = $4,
            end_date = $5, is_current = $6, description = $7, "order" = $8
        WHERE id = $9 AND cv_id IN (SELECT id FROM cvs WHERE user_id = $10)
        RETURNING *
        "#,
    )
    .bind(&fields.company)
    .bind(&fields.position)
    .bind(&fields.location)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.is_current)
    .bind(&fields.description)
    .bind(fields.order)
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(row))
}

/// PATCH /api/v1/work-experiences/:id
pub async fn handle_patch(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(patch): Json<WorkExperiencePatch>,
) -> Result<Json<WorkExperienceRow>, AppError> {
    let mut row = sqlx::query_as::<_, WorkExperienceRow>(
        r#"
        SELECT w.* FROM work_experiences w
        JOIN cvs c ON c.id = w.cv_id
        WHERE w.id = $1 AND c.user_id = $2
        "#,
    )
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    patch.apply(&mut row);

    let updated = sqlx::query_as::<_, WorkExperienceRow>(
        r#"
        UPDATE work_experiences
        SET company = $1, position = $2, location = $3, start_date = $4,
            end_date = $5, is_current = $6, description = $7, "order" = $8
        WHERE id = $9
        RETURNING *
        "#,
    )
    .bind(&row.company)
    .bind(&row.position)
    .bind(&row.location)
    .bind(row.start_date)
    .bind(row.end_date)
    .bind(row.is_current)
    .bind(&row.description)
    .bind(row.order)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// DELETE /api/v1/work-experiences/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query(
        "DELETE FROM work_experiences WHERE id = $1 AND cv_id IN (SELECT id FROM cvs WHERE user_id = $2)",
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> WorkExperienceRow {
        WorkExperienceRow {
            id: Uuid::new_v4(),
            cv_id: Uuid::new_v4(),
            company: "Initech".to_string(),
            position: "Engineer".to_string(),
            location: "Austin".to_string(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: None,
            is_current: true,
            description: "TPS reports".to_string(),
            order: 0,
        }
    }

    #[test]
    fn test_patch_overlays_only_supplied_fields() {
        let mut row = sample_row();
        let patch: WorkExperiencePatch = serde_json::from_str(
            r#"{"company": "Initrode", "end_date": "2023-06-30", "is_current": false}"#,
        )
        .unwrap();
        patch.apply(&mut row);
        assert_eq!(row.company, "Initrode");
        assert_eq!(row.end_date, NaiveDate::from_ymd_opt(2023, 6, 30));
        assert!(!row.is_current);
        // untouched fields keep their values
        assert_eq!(row.position, "Engineer");
        assert_eq!(row.description, "TPS reports");
    }

    #[test]
    fn test_create_payload_accepts_flattened_fields() {
        let req: CreateWorkExperience = serde_json::from_str(
            r#"{
                "cv_id": "8b9cbf40-59c5-4a5b-a0f3-86d11ee0a1e4",
                "company": "Initech",
                "position": "Engineer",
                "start_date": "2020-01-01",
                "description": "TPS reports"
            }"#,
        )
        .unwrap();
        assert_eq!(req.fields.company, "Initech");
        assert_eq!(req.fields.location, "");
        assert_eq!(req.fields.order, 0);
        assert!(!req.fields.is_current);
        assert!(req.fields.end_date.is_none());
    }
}
