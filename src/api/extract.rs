//! Request Extractors
//!
//! `ApiJson` behaves like `axum::Json` but turns every body rejection
//! (bad syntax, wrong field types, unknown `kind`, missing Content-Type)
//! into the standard `VALIDATION_ERROR` response.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

use crate::api::error::ApiError;

/// JSON body extractor with API-shaped rejections
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Reading {
        weight_kg: f64,
    }

    async fn extract(content_type: Option<&str>, body: &str) -> Result<Reading, ApiError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();

        ApiJson::<Reading>::from_request(request, &()).await.map(|ApiJson(r)| r)
    }

    #[tokio::test]
    async fn test_accepts_valid_body() {
        let reading = extract(Some("application/json"), r#"{"weight_kg": 4.2}"#)
            .await
            .unwrap();
        assert_eq!(reading.weight_kg, 4.2);
    }

    #[tokio::test]
    async fn test_rejections_become_validation_errors() {
        let cases = [
            (Some("application/json"), r#"{"weight_kg": "heavy"}"#),
            (Some("application/json"), r#"{}"#),
            (Some("application/json"), "not json"),
            (None, r#"{"weight_kg": 4.2}"#),
            (Some("text/plain"), r#"{"weight_kg": 4.2}"#),
        ];

        for (content_type, body) in cases {
            let err = extract(content_type, body).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "{:?} {}", content_type, body);
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }
}
