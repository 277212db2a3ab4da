use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;

/// Header carrying the authenticated user id, set by the auth gateway in
/// front of this service.
pub const PRINCIPAL_HEADER: &str = "x-user-id";

/// The authenticated identity for the current request.
///
/// Credentials are verified upstream; this service trusts the forwarded id
/// and only uses it to scope data access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(PRINCIPAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let user_id = Uuid::parse_str(raw).map_err(|_| AppError::Unauthorized)?;
        Ok(Principal(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Principal, AppError> {
        let (mut parts, _) = request.into_parts();
        Principal::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_header_is_accepted() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header(PRINCIPAL_HEADER, id.to_string())
            .body(())
            .unwrap();
        let principal = extract(request).await.unwrap();
        assert_eq!(principal.0, id);
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_malformed_header_is_rejected() {
        let request = Request::builder()
            .header(PRINCIPAL_HEADER, "not-a-uuid")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized)
        ));
    }
}
