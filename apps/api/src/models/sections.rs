//! Row types for the five CV section tables.
//!
//! Rows store the skill proficiency as plain text and validate it against
//! [`SkillLevel`] on every write, so reads never fail on legacy data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkExperienceRow {
    pub id: Uuid,
    pub cv_id: Uuid,
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EducationRow {
    pub id: Uuid,
    pub cv_id: Uuid,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub grade: String,
    pub description: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub cv_id: Uuid,
    pub name: String,
    pub category: String,
    pub level: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub cv_id: Uuid,
    pub title: String,
    pub description: String,
    /// Comma-separated list, kept verbatim from user input.
    pub technologies: String,
    pub url: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CertificationRow {
    pub id: Uuid,
    pub cv_id: Uuid,
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: String,
    pub credential_url: String,
    pub order: i32,
}

/// Skill proficiency enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(SkillLevel::Beginner),
            "intermediate" => Some(SkillLevel::Intermediate),
            "advanced" => Some(SkillLevel::Advanced),
            "expert" => Some(SkillLevel::Expert),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
            SkillLevel::Expert => "expert",
        }
    }
}

impl Default for SkillLevel {
    fn default() -> Self {
        SkillLevel::Intermediate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_all_levels() {
        for (raw, expected) in [
            ("beginner", SkillLevel::Beginner),
            ("intermediate", SkillLevel::Intermediate),
            ("advanced", SkillLevel::Advanced),
            ("expert", SkillLevel::Expert),
        ] {
            assert_eq!(SkillLevel::parse(raw), Some(expected));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        assert_eq!(SkillLevel::parse("ninja"), None);
        assert_eq!(SkillLevel::parse("Beginner"), None);
        assert_eq!(SkillLevel::parse(""), None);
    }

    #[test]
    fn test_default_is_intermediate() {
        assert_eq!(SkillLevel::default(), SkillLevel::Intermediate);
    }

    #[test]
    fn test_as_str_round_trips() {
        for level in [
            SkillLevel::Beginner,
            SkillLevel::Intermediate,
            SkillLevel::Advanced,
            SkillLevel::Expert,
        ] {
            assert_eq!(SkillLevel::parse(level.as_str()), Some(level));
        }
    }
}
