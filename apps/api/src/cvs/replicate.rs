//! Deep copy of a CV into a fresh, unanalyzed copy owned by the caller.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::cvs::scope;
use crate::errors::AppError;
use crate::models::cv::{CvDetail, CvRow};

/// Title given to a duplicated CV.
pub fn copy_title(title: &str) -> String {
    format!("{title} (Copy)")
}

/// Clones `source` and its work experience, education, and skill rows into a
/// new CV owned by `user_id`.
///
/// The whole copy runs in one transaction, so a concurrent reader either
/// sees the finished CV with all of its children or nothing at all.
///
/// The copy starts unanalyzed and unpublished-from-file: `ai_rating`,
/// `ai_review`, and `uploaded_file` stay empty, and `is_active` takes its
/// column default.
pub async fn duplicate_cv(
    pool: &PgPool,
    user_id: Uuid,
    source: &CvRow,
) -> Result<CvDetail, AppError> {
    let mut tx = pool.begin().await?;

    let new_cv = sqlx::query_as::<_, CvRow>(
        r#"
        INSERT INTO cvs
            (user_id, title, template, full_name, email, phone, location,
             website, linkedin, github, summary)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(copy_title(&source.title))
    .bind(&source.template)
    .bind(&source.full_name)
    .bind(&source.email)
    .bind(&source.phone)
    .bind(&source.location)
    .bind(&source.website)
    .bind(&source.linkedin)
    .bind(&source.github)
    .bind(&source.summary)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO work_experiences
            (cv_id, company, position, location, start_date, end_date,
             is_current, description, "order")
        SELECT $1, company, position, location, start_date, end_date,
               is_current, description, "order"
        FROM work_experiences
        WHERE cv_id = $2
        "#,
    )
    .bind(new_cv.id)
    .bind(source.id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO education
            (cv_id, institution, degree, field_of_study, location, start_date,
             end_date, is_current, grade, description, "order")
        SELECT $1, institution, degree, field_of_study, location, start_date,
               end_date, is_current, grade, description, "order"
        FROM education
        WHERE cv_id = $2
        "#,
    )
    .bind(new_cv.id)
    .bind(source.id)
    .execute(&mut *tx)
    .await?;

    // TODO: confirm with product whether projects and certifications should
    // also carry over; today a duplicate starts without them.
    sqlx::query(
        r#"
        INSERT INTO skills (cv_id, name, category, level, "order")
        SELECT $1, name, category, level, "order"
        FROM skills
        WHERE cv_id = $2
        "#,
    )
    .bind(new_cv.id)
    .bind(source.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Duplicated CV {} into {} for user {}",
        source.id, new_cv.id, user_id
    );

    Ok(scope::load_detail(pool, new_cv).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_title_appends_suffix() {
        assert_eq!(copy_title("Resume"), "Resume (Copy)");
    }

    #[test]
    fn test_copy_title_stacks_on_repeated_duplication() {
        assert_eq!(copy_title("Resume (Copy)"), "Resume (Copy) (Copy)");
    }

    #[test]
    fn test_copy_title_keeps_empty_title_valid() {
        assert_eq!(copy_title(""), " (Copy)");
    }
}
