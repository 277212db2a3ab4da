use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::cvs::scope;
use crate::errors::AppError;
use crate::models::sections::{SkillLevel, SkillRow};
use crate::sections::CvIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SkillPayload {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub order: i32,
}

fn default_level() -> String {
    SkillLevel::default().as_str().to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateSkill {
    pub cv_id: Uuid,
    #[serde(flatten)]
    pub fields: SkillPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub order: Option<i32>,
}

impl SkillPatch {
    fn apply(self, row: &mut SkillRow) {
        if let Some(v) = self.name {
            row.name = v;
        }
        if let Some(v) = self.category {
            row.category = v;
        }
        if let Some(v) = self.level {
            row.level = v;
        }
        if let Some(v) = self.order {
            row.order = v;
        }
    }
}

fn validate_level(level: &str) -> Result<(), AppError> {
    if SkillLevel::parse(level).is_none() {
        return Err(AppError::Validation(format!(
            "'{level}' is not a valid skill level"
        )));
    }
    Ok(())
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Skill {id} not found"))
}

/// GET /api/v1/skills?cv_id=
pub async fn handle_list(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<CvIdQuery>,
) -> Result<Json<Vec<SkillRow>>, AppError> {
    let rows = match query.cv_id {
        Some(cv_id) => {
            sqlx::query_as::<_, SkillRow>(
                r#"
                SELECT s.* FROM skills s
                JOIN cvs c ON c.id = s.cv_id
                WHERE c.user_id = $1 AND s.cv_id = $2
                ORDER BY s."order", s.category, s.name
                "#,
            )
            .bind(principal.0)
            .bind(cv_id)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, SkillRow>(
                r#"
                SELECT s.* FROM skills s
                JOIN cvs c ON c.id = s.cv_id
                WHERE c.user_id = $1
                ORDER BY s."order", s.category, s.name
                "#,
            )
            .bind(principal.0)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(rows))
}

/// GET /api/v1/skills/:id
pub async fn handle_get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<SkillRow>, AppError> {
    let row = sqlx::query_as::<_, SkillRow>(
        r#"
        SELECT s.* FROM skills s
        JOIN cvs c ON c.id = s.cv_id
        WHERE s.id = $1 AND c.user_id = $2
        "#,
    )
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(row))
}

/// POST /api/v1/skills
pub async fn handle_create(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<CreateSkill>,
) -> Result<(StatusCode, Json<SkillRow>), AppError> {
    validate_level(&req.fields.level)?;
    if !scope::cv_is_owned(&state.db, principal.0, req.cv_id).await? {
        return Err(AppError::NotFound(format!("CV {} not found", req.cv_id)));
    }

    let row = sqlx::query_as::<_, SkillRow>(
        r#"
        INSERT INTO skills (cv_id, name, category, level, "order")
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(req.cv_id)
    .bind(&req.fields.name)
    .bind(&req.fields.category)
    .bind(&req.fields.level)
    .bind(req.fields.order)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/skills/:id
pub async fn handle_update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(fields): Json<SkillPayload>,
) -> Result<Json<SkillRow>, AppError> {
    validate_level(&fields.level)?;

    let row = sqlx::query_as::<_, SkillRow>(
        r#"
        UPDATE skills
        SET name = $1, category = $2, level = $3, "order" = $4
        WHERE id = $5 AND cv_id IN (SELECT id FROM cvs WHERE user_id = $6)
        RETURNING *
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.category)
    .bind(&fields.level)
    .bind(fields.order)
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(row))
}

/// PATCH /api/v1/skills/:id
pub async fn handle_patch(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(patch): Json<SkillPatch>,
) -> Result<Json<SkillRow>, AppError> {
    if let Some(level) = &patch.level {
        validate_level(level)?;
    }

    let mut row = sqlx::query_as::<_, SkillRow>(
        r#"
        SELECT s.* FROM skills s
        JOIN cvs c ON c.id = s.cv_id
        WHERE s.id = $1 AND c.user_id = $2
        "#,
    )
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    patch.apply(&mut row);

    let updated = sqlx::query_as::<_, SkillRow>(
        r#"
        UPDATE skills
        SET name = $1, category = $2, level = $3, "order" = $4
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(&row.name)
    .bind(&row.category)
    .bind(&row.level)
    .bind(row.order)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// DELETE /api/v1/skills/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query(
        "DELETE FROM skills WHERE id = $1 AND cv_id IN (SELECT id FROM cvs WHERE user_id = $2)",
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

    #[test]
    fn test_payload_defaults_to_intermediate() {
        let req: CreateSkill = serde_json::from_str(
            r#"{"cv_id": "8b9cbf40-59c5-4a5b-a0f3-86d11ee0a1e4", "name": "Rust"}"#,
        )
        .unwrap();
        assert_eq!(req.fields.level, "intermediate");
        assert_eq!(req.fields.category, "");
    }

    #[test]
    fn test_validate_level_rejects_unknown() {
        assert!(validate_level("expert").is_ok());
        assert!(validate_level("grandmaster").is_err());
        assert!(validate_level("Expert").is_err());
    }

    #[test]
    fn test_patch_keeps_unspecified_fields() {
        let mut row = SkillRow {
            id: Uuid::new_v4(),
            cv_id: Uuid::new_v4(),
            name: "Rust".to_string(),
            category: "Technical".to_string(),
            level: "advanced".to_string(),
            order: 2,
        };
        let patch: SkillPatch = serde_json::from_str(r#"{"level": "expert"}"#).unwrap();
        patch.apply(&mut row);
        assert_eq!(row.level, "expert");
        assert_eq!(row.name, "Rust");
        assert_eq!(row.category, "Technical");
        assert_eq!(row.order, 2);
    }
}
