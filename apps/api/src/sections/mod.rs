//! CRUD endpoints for the five CV section collections.
//!
//! Every operation is scoped to the requesting user by joining through
//! `cvs.user_id`; a record owned by someone else behaves exactly like a
//! missing record.

pub mod certification;
pub mod education;
pub mod project;
pub mod skill;
pub mod work_experience;

use serde::Deserialize;
use uuid::Uuid;

/// Optional parent-CV filter accepted by every section list endpoint.
///
/// A `cv_id` pointing at another user's CV simply yields an empty list, so
/// enumeration cannot reveal whether a CV exists.
#[derive(Debug, Deserialize)]
pub struct CvIdQuery {
    pub cv_id: Option<Uuid>,
}
