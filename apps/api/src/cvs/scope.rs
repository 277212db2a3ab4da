//! Ownership-scoped CV access.
//!
//! Every lookup here carries the requesting user's id in the WHERE clause,
//! so a CV that exists but belongs to someone else resolves exactly like a
//! CV that does not exist. Child records are scoped in their own modules by
//! joining through `cvs` to `user_id`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::cv::{CvDetail, CvRow};
use crate::models::sections::{
    CertificationRow, EducationRow, ProjectRow, SkillRow, WorkExperienceRow,
};

/// Fetches a CV only if it belongs to `user_id`.
pub async fn find_owned_cv(
    pool: &PgPool,
    user_id: Uuid,
    cv_id: Uuid,
) -> Result<Option<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>("SELECT * FROM cvs WHERE id = $1 AND user_id = $2")
        .bind(cv_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// True if `cv_id` exists and belongs to `user_id`. Used to validate the
/// parent CV before inserting a section record.
pub async fn cv_is_owned(pool: &PgPool, user_id: Uuid, cv_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM cvs WHERE id = $1 AND user_id = $2)")
        .bind(cv_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Loads all section collections for a CV whose ownership the caller has
/// already established, in their display order.
pub async fn load_detail(pool: &PgPool, cv: CvRow) -> Result<CvDetail, sqlx::Error> {
    let work_experiences = sqlx::query_as::<_, WorkExperienceRow>(
        r#"SELECT * FROM work_experiences WHERE cv_id = $1 ORDER BY "order", start_date DESC"#,
    )
    .bind(cv.id)
    .fetch_all(pool)
    .await?;

    let education = sqlx::query_as::<_, EducationRow>(
        r#"SELECT * FROM education WHERE cv_id = $1 ORDER BY "order", start_date DESC"#,
    )
    .bind(cv.id)
    .fetch_all(pool)
    .await?;

    let skills = sqlx::query_as::<_, SkillRow>(
        r#"SELECT * FROM skills WHERE cv_id = $1 ORDER BY "order", category, name"#,
    )
    .bind(cv.id)
    .fetch_all(pool)
    .await?;

    let projects = sqlx::query_as::<_, ProjectRow>(
        r#"SELECT * FROM projects WHERE cv_id = $1 ORDER BY "order", start_date DESC"#,
    )
    .bind(cv.id)
    .fetch_all(pool)
    .await?;

    let certifications = sqlx::query_as::<_, CertificationRow>(
        r#"SELECT * FROM certifications WHERE cv_id = $1 ORDER BY "order", issue_date DESC"#,
    )
    .bind(cv.id)
    .fetch_all(pool)
    .await?;

    Ok(CvDetail {
        cv,
        work_experiences,
        education,
        skills,
        projects,
        certifications,
    })
}
