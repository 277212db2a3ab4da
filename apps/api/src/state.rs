use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::cvs::analysis::CvAnalyzer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Pluggable CV analyzer. The shipped backend is the fixed mock; a real
    /// model slots in here without touching any handler.
    pub analyzer: Arc<dyn CvAnalyzer>,
}
