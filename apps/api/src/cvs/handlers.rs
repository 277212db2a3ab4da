//! Axum route handlers for the CV resource, including the analyze,
//! duplicate, and upload actions.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Principal;
use crate::cvs::analysis::CvAnalysis;
use crate::cvs::replicate::duplicate_cv;
use crate::cvs::scope;
use crate::errors::AppError;
use crate::models::cv::{CvDetail, CvRow, CvSummaryRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Writable CV fields. AI fields and the uploaded file are deliberately
/// absent: they change only through the analyze and upload actions.
#[derive(Debug, Clone, Deserialize)]
pub struct CvPayload {
    pub title: String,
    #[serde(default = "default_template")]
    pub template: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_template() -> String {
    "modern".to_string()
}

fn default_true() -> bool {
    true
}

impl CvPayload {
    fn from_row(row: &CvRow) -> Self {
        CvPayload {
            title: row.title.clone(),
            template: row.template.clone(),
            full_name: row.full_name.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            location: row.location.clone(),
            website: row.website.clone(),
            linkedin: row.linkedin.clone(),
            github: row.github.clone(),
            summary: row.summary.clone(),
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CvPatch {
    pub title: Option<String>,
    pub template: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub summary: Option<String>,
    pub is_active: Option<bool>,
}

impl CvPatch {
    fn apply(self, fields: &mut CvPayload) {
        if let Some(v) = self.title {
            fields.title = v;
        }
        if let Some(v) = self.template {
            fields.template = v;
        }
        if let Some(v) = self.full_name {
            fields.full_name = v;
        }
        if let Some(v) = self.email {
            fields.email = v;
        }
        if let Some(v) = self.phone {
            fields.phone = v;
        }
        if let Some(v) = self.location {
            fields.location = v;
        }
        if let Some(v) = self.website {
            fields.website = v;
        }
        if let Some(v) = self.linkedin {
            fields.linkedin = v;
        }
        if let Some(v) = self.github {
            fields.github = v;
        }
        if let Some(v) = self.summary {
            fields.summary = v;
        }
        if let Some(v) = self.is_active {
            fields.is_active = v;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub message: String,
    pub analysis: CvAnalysis,
}

#[derive(Debug, Serialize)]
pub struct DuplicateResponse {
    pub message: String,
    pub cv: CvDetail,
}

fn validate_payload(fields: &CvPayload) -> Result<(), AppError> {
    if fields.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if fields.full_name.trim().is_empty() {
        return Err(AppError::Validation(
            "full_name cannot be empty".to_string(),
        ));
    }
    if fields.email.trim().is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }
    Ok(())
}

fn cv_not_found(cv_id: Uuid) -> AppError {
    AppError::NotFound(format!("CV {cv_id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/cvs
///
/// Lists the caller's CVs as summaries with section counts, most recently
/// updated first.
pub async fn handle_list_cvs(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<CvSummaryRow>>, AppError> {
    let cvs = sqlx::query_as::<_, CvSummaryRow>(
        r#"
        SELECT c.id, c.title, c.template, c.full_name, c.ai_rating,
               c.is_active, c.created_at, c.updated_at,
               (SELECT COUNT(*) FROM skills s WHERE s.cv_id = c.id) AS skills_count,
               (SELECT COUNT(*) FROM work_experiences w WHERE w.cv_id = c.id) AS experience_count
        FROM cvs c
        WHERE c.user_id = $1
        ORDER BY c.updated_at DESC
        "#,
    )
    .bind(principal.0)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(cvs))
}

/// POST /api/v1/cvs
pub async fn handle_create_cv(
    State(state): State<AppState>,
    principal: Principal,
    Json(fields): Json<CvPayload>,
) -> Result<(StatusCode, Json<CvRow>), AppError> {
    validate_payload(&fields)?;

    let cv = sqlx::query_as::<_, CvRow>(
        r#"
        INSERT INTO cvs
            (user_id, title, template, full_name, email, phone, location,
             website, linkedin, github, summary, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(principal.0)
    .bind(&fields.title)
    .bind(&fields.template)
    .bind(&fields.full_name)
    .bind(&fields.email)
    .bind(&fields.phone)
    .bind(&fields.location)
    .bind(&fields.website)
    .bind(&fields.linkedin)
    .bind(&fields.github)
    .bind(&fields.summary)
    .bind(fields.is_active)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(cv)))
}

/// GET /api/v1/cvs/:id
///
/// Returns the CV with all five section collections in display order.
pub async fn handle_get_cv(
    State(state): State<AppState>,
    principal: Principal,
    Path(cv_id): Path<Uuid>,
) -> Result<Json<CvDetail>, AppError> {
    let cv = scope::find_owned_cv(&state.db, principal.0, cv_id)
        .await?
        .ok_or_else(|| cv_not_found(cv_id))?;

    Ok(Json(scope::load_detail(&state.db, cv).await?))
}

/// PUT /api/v1/cvs/:id
pub async fn handle_update_cv(
    State(state): State<AppState>,
    principal: Principal,
    Path(cv_id): Path<Uuid>,
    Json(fields): Json<CvPayload>,
) -> Result<Json<CvRow>, AppError> {
    validate_payload(&fields)?;

    let cv = store_cv_fields(&state, principal.0, cv_id, &fields)
        .await?
        .ok_or_else(|| cv_not_found(cv_id))?;

    Ok(Json(cv))
}

/// PATCH /api/v1/cvs/:id
pub async fn handle_patch_cv(
    State(state): State<AppState>,
    principal: Principal,
    Path(cv_id): Path<Uuid>,
    Json(patch): Json<CvPatch>,
) -> Result<Json<CvRow>, AppError> {
    let existing = scope::find_owned_cv(&state.db, principal.0, cv_id)
        .await?
        .ok_or_else(|| cv_not_found(cv_id))?;

    let mut fields = CvPayload::from_row(&existing);
    patch.apply(&mut fields);
    validate_payload(&fields)?;

    let cv = store_cv_fields(&state, principal.0, cv_id, &fields)
        .await?
        .ok_or_else(|| cv_not_found(cv_id))?;

    Ok(Json(cv))
}

/// DELETE /api/v1/cvs/:id
///
/// Cascades to every section record of the CV.
pub async fn handle_delete_cv(
    State(state): State<AppState>,
    principal: Principal,
    Path(cv_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM cvs WHERE id = $1 AND user_id = $2")
        .bind(cv_id)
        .bind(principal.0)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(cv_not_found(cv_id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/cvs/:id/analyze
///
/// Runs the configured analyzer and persists its report into
/// `ai_rating`/`ai_review`. The shipped analyzer returns a fixed payload.
pub async fn handle_analyze(
    State(state): State<AppState>,
    principal: Principal,
    Path(cv_id): Path<Uuid>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let cv = scope::find_owned_cv(&state.db, principal.0, cv_id)
        .await?
        .ok_or_else(|| cv_not_found(cv_id))?;

    let analysis = state.analyzer.analyze(&cv).await?;
    let review = serde_json::to_value(&analysis)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("serializing analysis: {e}")))?;

    sqlx::query("UPDATE cvs SET ai_rating = $1, ai_review = $2, updated_at = now() WHERE id = $3")
        .bind(analysis.overall_score)
        .bind(&review)
        .bind(cv.id)
        .execute(&state.db)
        .await?;

    Ok(Json(AnalyzeResponse {
        message: "CV analyzed successfully".to_string(),
        analysis,
    }))
}

/// POST /api/v1/cvs/:id/duplicate
pub async fn handle_duplicate(
    State(state): State<AppState>,
    principal: Principal,
    Path(cv_id): Path<Uuid>,
) -> Result<(StatusCode, Json<DuplicateResponse>), AppError> {
    let source = scope::find_owned_cv(&state.db, principal.0, cv_id)
        .await?
        .ok_or_else(|| cv_not_found(cv_id))?;

    let cv = duplicate_cv(&state.db, principal.0, &source).await?;

    Ok((
        StatusCode::CREATED,
        Json(DuplicateResponse {
            message: "CV duplicated successfully".to_string(),
            cv,
        }),
    ))
}

/// POST /api/v1/cvs/:id/upload
///
/// Accepts a multipart body with an `uploaded_file` part, stores it in S3
/// under `cvs/{cv_id}/{filename}`, and records the object key on the CV.
pub async fn handle_upload(
    State(state): State<AppState>,
    principal: Principal,
    Path(cv_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<CvRow>, AppError> {
    let cv = scope::find_owned_cv(&state.db, principal.0, cv_id)
        .await?
        .ok_or_else(|| cv_not_found(cv_id))?;

    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let is_upload = field.name() == Some("uploaded_file");
        if !is_upload {
            continue;
        }
        let filename = field
            .file_name()
            .map(sanitize_filename)
            .unwrap_or_else(|| "cv.pdf".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::Validation("Missing 'uploaded_file' part".to_string()))?;

    let key = format!("cvs/{}/{}", cv.id, filename);
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&key)
        .body(ByteStream::from(data.to_vec()))
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload failed: {e}")))?;

    let updated = sqlx::query_as::<_, CvRow>(
        "UPDATE cvs SET uploaded_file = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(&key)
    .bind(cv.id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// Drops any path components a client smuggles into the filename.
fn sanitize_filename(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("cv.pdf")
        .to_string()
}

async fn store_cv_fields(
    state: &AppState,
    user_id: Uuid,
    cv_id: Uuid,
    fields: &CvPayload,
) -> Result<Option<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>(
        r#"
        UPDATE cvs
        SET title = $1, template = $2, full_name = $3, email = $4, phone = $5,
            location = $6, website = $7, linkedin = $8, github = $9,
            summary = $10, is_active = $11, updated_at = now()
        WHERE id = $12 AND user_id = $13
        RETURNING *
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.template)
    .bind(&fields.full_name)
    .bind(&fields.email)
    .bind(&fields.phone)
    .bind(&fields.location)
    .bind(&fields.website)
    .bind(&fields.linkedin)
    .bind(&fields.github)
    .bind(&fields.summary)
    .bind(fields.is_active)
    .bind(cv_id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_defaults() {
        let fields: CvPayload = serde_json::from_str(
            r#"{"title": "Resume", "full_name": "Ada Lovelace", "email": "ada@example.com"}"#,
        )
        .unwrap();
        assert_eq!(fields.template, "modern");
        assert!(fields.is_active);
        assert_eq!(fields.phone, "");
        assert_eq!(fields.summary, "");
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut fields: CvPayload = serde_json::from_str(
            r#"{"title": "  ", "full_name": "Ada Lovelace", "email": "ada@example.com"}"#,
        )
        .unwrap();
        assert!(validate_payload(&fields).is_err());
        fields.title = "Resume".to_string();
        assert!(validate_payload(&fields).is_ok());
    }

    #[test]
    fn test_patch_overlays_only_supplied_fields() {
        let mut fields: CvPayload = serde_json::from_str(
            r#"{"title": "Resume", "full_name": "Ada Lovelace", "email": "ada@example.com",
                "summary": "Original summary"}"#,
        )
        .unwrap();
        let patch: CvPatch =
            serde_json::from_str(r#"{"title": "Senior Resume", "is_active": false}"#).unwrap();
        patch.apply(&mut fields);
        assert_eq!(fields.title, "Senior Resume");
        assert!(!fields.is_active);
        assert_eq!(fields.summary, "Original summary");
        assert_eq!(fields.full_name, "Ada Lovelace");
    }

    #[test]
    fn test_sanitize_filename_strips_paths() {
        assert_eq!(sanitize_filename("resume.pdf"), "resume.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\files\\resume.pdf"), "resume.pdf");
        assert_eq!(sanitize_filename(""), "cv.pdf");
    }
}
