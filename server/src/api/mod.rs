pub mod error;
pub mod extract;
mod status;
mod tracks;

use axum::{routing::get, Router};
pub use error::Error;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::store::{DocumentStore, StorageError};

/// Shared by every handler. The store is absent when the database could not be opened.
#[derive(Clone)]
pub struct AppState(pub Option<Arc<dyn DocumentStore>>);

impl AppState {
    pub fn store(&self) -> Result<&dyn DocumentStore, StorageError> {
        self.0.as_deref().ok_or(StorageError::Unavailable)
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::mirror_request())
        .allow_origin(AllowOrigin::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);
    let tracing = TraceLayer::new_for_http();
    Router::new()
        .route("/", get(status::root))
        .route("/test", get(status::test))
        .nest("/api", api_router())
        .fallback(not_found)
        .layer(cors)
        .layer(tracing)
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/hello", get(status::hello))
        .route("/tracks", get(tracks::tracks).post(tracks::create_track))
}

async fn not_found() -> Error {
    Error::NotFound
}


#[cfg(test)]
mod tests {
    use super::testing::{get, send};
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let (status, body) = send(router(AppState(None)), get("/albums")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Not Found"}));
    }

    #[tokio::test]
    async fn cors_allows_any_origin_with_credentials() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/tracks")
            .header(header::ORIGIN, "http://player.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let response = router(AppState(None)).oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://player.example"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type");
    }
}
