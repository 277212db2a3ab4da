pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::accounts::handlers as accounts;
use crate::cvs::handlers as cvs;
use crate::sections::{certification, education, project, skill, work_experience};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/users", post(accounts::handle_register))
        .route(
            "/api/v1/users/me",
            get(accounts::handle_get_profile).patch(accounts::handle_update_profile),
        )
        // CVs
        .route(
            "/api/v1/cvs",
            get(cvs::handle_list_cvs).post(cvs::handle_create_cv),
        )
        .route(
            "/api/v1/cvs/:id",
            get(cvs::handle_get_cv)
                .put(cvs::handle_update_cv)
                .patch(cvs::handle_patch_cv)
                .delete(cvs::handle_delete_cv),
        )
        .route("/api/v1/cvs/:id/analyze", post(cvs::handle_analyze))
        .route("/api/v1/cvs/:id/duplicate", post(cvs::handle_duplicate))
        .route("/api/v1/cvs/:id/upload", post(cvs::handle_upload))
        // Work experience
        .route(
            "/api/v1/work-experiences",
            get(work_experience::handle_list).post(work_experience::handle_create),
        )
        .route(
            "/api/v1/work-experiences/:id",
            get(work_experience::handle_get)
                .put(work_experience::handle_update)
                .patch(work_experience::handle_patch)
                .delete(work_experience::handle_delete),
        )
        // Education
        .route(
            "/api/v1/education",
            get(education::handle_list).post(education::handle_create),
        )
        .route(
            "/api/v1/education/:id",
            get(education::handle_get)
                .put(education::handle_update)
                .patch(education::handle_patch)
                .delete(education::handle_delete),
        )
        // Skills
        .route(
            "/api/v1/skills",
            get(skill::handle_list).post(skill::handle_create),
        )
        .route(
            "/api/v1/skills/:id",
            get(skill::handle_get)
                .put(skill::handle_update)
                .patch(skill::handle_patch)
                .delete(skill::handle_delete),
        )
        // Projects
        .route(
            "/api/v1/projects",
            get(project::handle_list).post(project::handle_create),
        )
        .route(
            "/api/v1/projects/:id",
            get(project::handle_get)
                .put(project::handle_update)
                .patch(project::handle_patch)
                .delete(project::handle_delete),
        )
        // Certifications
        .route(
            "/api/v1/certifications",
            get(certification::handle_list).post(certification::handle_create),
        )
        .route(
            "/api/v1/certifications/:id",
            get(certification::handle_get)
                .put(certification::handle_update)
                .patch(certification::handle_patch)
                .delete(certification::handle_delete),
        )
        .with_state(state)
}
