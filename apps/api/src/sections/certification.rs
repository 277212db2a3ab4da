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
use crate::models::sections::CertificationRow;
use crate::sections::CvIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CertificationPayload {
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub credential_id: String,
    #[serde(default)]
    pub credential_url: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateCertification {
    pub cv_id: Uuid,
    #[serde(flatten)]
    pub fields: CertificationPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct CertificationPatch {
    pub name: Option<String>,
    pub issuing_organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub order: Option<i32>,
}

impl CertificationPatch {
    fn apply(self, row: &mut CertificationRow) {
        if let Some(v) = self.name {
            row.name = v;
        }
        if let Some(v) = self.issuing_organization {
            row.issuing_organization = v;
        }
        if let Some(v) = self.issue_date {
            row.issue_date = v;
        }
        if let Some(v) = self.expiry_date {
            row.expiry_date = Some(v);
        }
        if let Some(v) = self.credential_id {
            row.credential_id = v;
        }
        if let Some(v) = self.credential_url {
            row.credential_url = v;
        }
        if let Some(v) = self.order {
            row.order = v;
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Certification {id} not found"))
}

/// GET /api/v1/certifications?cv_id=
pub async fn handle_list(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<CvIdQuery>,
) -> Result<Json<Vec<CertificationRow>>, AppError> {
    let rows = match query.cv_id {
        Some(cv_id) => {
            sqlx::query_as::<_, CertificationRow>(
                r#"
                SELECT x.* FROM certifications x
                JOIN cvs c ON c.id = x.cv_id
                WHERE c.user_id = $1 AND x.cv_id = $2
                ORDER BY x."order", x.issue_date DESC
                "#,
            )
            .bind(principal.0)
            .bind(cv_id)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, CertificationRow>(
                r#"
                SELECT x.* FROM certifications x
                JOIN cvs c ON c.id = x.cv_id
                WHERE c.user_id = $1
                ORDER BY x."order", x.issue_date DESC
                "#,
            )
            .bind(principal.0)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(rows))
}

/// GET /api/v1/certifications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<CertificationRow>, AppError> {
    let row = sqlx::query_as::<_, CertificationRow>(
        r#"
        SELECT x.* FROM certifications x
        JOIN cvs c ON c.id = x.cv_id
        WHERE x.id = $1 AND c.user_id = $2
        "#,
    )
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(row))
}

/// POST /api/v1/certifications
pub async fn handle_create(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<CreateCertification>,
) -> Result<(StatusCode, Json<CertificationRow>), AppError> {
    if !scope::cv_is_owned(&state.db, principal.0, req.cv_id).await? {
        return Err(AppError::NotFound(format!("CV {} not found", req.cv_id)));
    }

    let row = sqlx::query_as::<_, CertificationRow>(
        r#"
        INSERT INTO certifications
            (cv_id, name, issuing_organization, issue_date, expiry_date,
             credential_id, credential_url, "order")
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(req.cv_id)
    .bind(&req.fields.name)
    .bind(&req.fields.issuing_organization)
    .bind(req.fields.issue_date)
    .bind(req.fields.expiry_date)
    .bind(&req.fields.credential_id)
    .bind(&req.fields.credential_url)
    .bind(req.fields.order)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/certifications/:id
pub async fn handle_update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(fields): Json<CertificationPayload>,
) -> Result<Json<CertificationRow>, AppError> {
    let row = sqlx::query_as::<_, CertificationRow>(
        r#"
        UPDATE certifications
        SET name = $1, issuing_organization = $2, issue_date = $3,
            expiry_date = $4, credential_id = $5, credential_url = $6,
            "order" = $7
        WHERE id = $8 AND cv_id IN (SELECT id FROM cvs WHERE user_id = $9)
        RETURNING *
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.issuing_organization)
    .bind(fields.issue_date)
    .bind(fields.expiry_date)
    .bind(&fields.credential_id)
    .bind(&fields.credential_url)
    .bind(fields.order)
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(row))
}

/// PATCH /api/v1/certifications/:id
pub async fn handle_patch(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(patch): Json<CertificationPatch>,
) -> Result<Json<CertificationRow>, AppError> {
    let mut row = sqlx::query_as::<_, CertificationRow>(
        r#"
        SELECT x.* FROM certifications x
        JOIN cvs c ON c.id = x.cv_id
        WHERE x.id = $1 AND c.user_id = $2
        "#,
    )
    .bind(id)
    .bind(principal.0)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found(id))?;

    patch.apply(&mut row);

    let updated = sqlx::query_as::<_, CertificationRow>(
        r#"
        UPDATE certifications
        SET name = $1, issuing_organization = $2, issue_date = $3,
            expiry_date = $4, credential_id = $5, credential_url = $6,
            "order" = $7
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&row.name)
    .bind(&row.issuing_organization)
    .bind(row.issue_date)
    .bind(row.expiry_date)
    .bind(&row.credential_id)
    .bind(&row.credential_url)
    .bind(row.order)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// DELETE /api/v1/certifications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query(
        "DELETE FROM certifications WHERE id = $1 AND cv_id IN (SELECT id FROM cvs WHERE user_id = $2)",
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
