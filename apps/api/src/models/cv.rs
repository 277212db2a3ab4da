use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::sections::{
    CertificationRow, EducationRow, ProjectRow, SkillRow, WorkExperienceRow,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub template: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
    pub github: String,
    pub summary: String,
    pub ai_rating: Option<i32>,
    pub ai_review: Option<Value>,
    /// S3 object key of the uploaded source document, if any.
    pub uploaded_file: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact row returned by the CV list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvSummaryRow {
    pub id: Uuid,
    pub title: String,
    pub template: String,
    pub full_name: String,
    pub ai_rating: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub skills_count: i64,
    pub experience_count: i64,
}

/// A CV together with all of its section collections, as returned by the
/// detail and duplicate endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CvDetail {
    #[serde(flatten)]
    pub cv: CvRow,
    pub work_experiences: Vec<WorkExperienceRow>,
    pub education: Vec<EducationRow>,
    pub skills: Vec<SkillRow>,
    pub projects: Vec<ProjectRow>,
    pub certifications: Vec<CertificationRow>,
}
