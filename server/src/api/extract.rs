use super::error::ErrorBody;
use axum::{
    async_trait,
    body::{Bytes, HttpBody},
    extract::{rejection::QueryRejection, FromRequest, FromRequestParts, Query as AxumQuery},
    http::header::{self, HeaderMap},
    http::{request::Parts, Request, StatusCode},
    response::{IntoResponse, Response},
    BoxError, Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub struct Json<T>(pub T);

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("Invalid mime type, expected application/json")]
    Mime,
    #[error("Could not read body bytes: {}", .0)]
    BodyRead(#[from] axum::extract::rejection::BytesRejection),
    #[error("Invalid JSON structure: {}", .0)]
    Data(String),
    #[error("Invalid JSON syntax: {}", .0)]
    Syntax(String),
    #[error("IO error")]
    Io,
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status = match self {
            JsonError::Mime => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            JsonError::BodyRead(_) | JsonError::Syntax(_) => StatusCode::BAD_REQUEST,
            JsonError::Data(_) => StatusCode::UNPROCESSABLE_ENTITY,
            JsonError::Io => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ErrorBody::response(status, self.to_string())
    }
}

#[async_trait]
impl<S, B, T> FromRequest<S, B> for Json<T>
where
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = JsonError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        if !json_content_type(req.headers()) {
            return Err(JsonError::Mime);
        }
        let bytes = Bytes::from_request(req, state).await?;
        let deserializer = &mut serde_json::Deserializer::from_slice(&bytes);

        match serde_path_to_error::deserialize(deserializer) {
            Ok(value) => Ok(Json(value)),
            Err(err) => Err(match err.inner().classify() {
                serde_json::error::Category::Data => JsonError::Data(err.to_string()),
                serde_json::error::Category::Syntax | serde_json::error::Category::Eof => {
                    JsonError::Syntax(err.to_string())
                }
                serde_json::error::Category::Io => JsonError::Io,
            }),
        }
    }
}

fn json_content_type(headers: &HeaderMap) -> bool {
    let content_type = if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        content_type
    } else {
        return false;
    };

    let content_type = if let Ok(content_type) = content_type.to_str() {
        content_type
    } else {
        return false;
    };

    let mime = if let Ok(mime) = content_type.parse::<mime::Mime>() {
        mime
    } else {
        return false;
    };

    mime.type_() == "application"
        && (mime.subtype() == "json" || mime.suffix().map_or(false, |suffix| suffix == "json"))
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

pub struct Query<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AxumQuery(t) = AxumQuery::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| {
                ErrorBody::response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            })?;
        Ok(Self(t))
    }
}
