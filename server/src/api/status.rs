use axum::extract::State;
use base::{setting::env_var, DATABASE_NAME, DATABASE_URL};
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;

use crate::api::{extract::Json, AppState};

static MAX_COLLECTIONS: usize = 10;
static MAX_ERROR_LENGTH: usize = 50;

#[derive(Serialize)]
pub struct Message {
    message: &'static str,
}

pub async fn root() -> Json<Message> {
    Json(Message {
        message: "Music App Backend Running",
    })
}

pub async fn hello() -> Json<Message> {
    Json(Message {
        message: "Hello from the backend API!",
    })
}

/// Best effort report on the backend and its database.
#[derive(Serialize, Debug)]
pub struct Diagnostic {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

pub async fn test(State(state): State<AppState>) -> Json<Diagnostic> {
    Json(diagnose(&state, env_var(DATABASE_URL), env_var(DATABASE_NAME)).await)
}

fn set_or_not(var: Option<String>) -> String {
    match var {
        Some(_) => "✅ Set".to_string(),
        None => "❌ Not Set".to_string(),
    }
}

fn truncate(message: &str) -> String {
    message.chars().take(MAX_ERROR_LENGTH).collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.to_owned()
    } else {
        "unknown panic".to_string()
    }
}

/// Never fails: every problem ends up as text in the `database` field.
pub async fn diagnose(
    state: &AppState,
    database_url: Option<String>,
    database_name: Option<String>,
) -> Diagnostic {
    let mut report = Diagnostic {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: set_or_not(database_url),
        database_name: set_or_not(database_name),
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    let store = match &state.0 {
        Some(store) => store,
        None => {
            report.database = "⚠️  Available but not initialized".to_string();
            return report;
        }
    };
    report.database = "✅ Available".to_string();
    report.connection_status = "Connected".to_string();

    match AssertUnwindSafe(store.collection_names())
        .catch_unwind()
        .await
    {
        Ok(Ok(names)) => {
            report.collections = names.into_iter().take(MAX_COLLECTIONS).collect();
            report.database = "✅ Connected & Working".to_string();
        }
        Ok(Err(e)) => {
            tracing::warn! {error = %e, "Could not list collections"};
            report.database = format!("⚠️  Connected but Error: {}", truncate(&e.to_string()));
        }
        Err(payload) => {
            let message = panic_message(payload);
            tracing::error! {%message, "Database diagnostic panicked"};
            report.database = format!("❌ Error: {}", truncate(&message));
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::api::testing::{get, send, state};
    use crate::store::{create_record, Document, DocumentStore, Filter, StorageError};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    enum Broken {
        Failing,
        Panicking,
    }

    #[async_trait]
    impl DocumentStore for Broken {
        async fn create_document(
            &self,
            _: &str,
            _: Document,
        ) -> Result<Uuid, StorageError> {
            Err(StorageError::Unavailable)
        }

        async fn get_documents(
            &self,
            _: &str,
            _: &Filter,
            _: u64,
        ) -> Result<Vec<Document>, StorageError> {
            Err(StorageError::Unavailable)
        }

        async fn collection_names(&self) -> Result<Vec<String>, StorageError> {
            match self {
                Broken::Failing => Err(StorageError::Database(sea_orm::DbErr::Custom(
                    "connection refused by the remote host while listing collections"
                        .to_string(),
                ))),
                Broken::Panicking => panic!("driver exploded"),
            }
        }
    }

    #[tokio::test]
    async fn static_messages() {
        let state = AppState(None);
        let (status, body) = send(router(state.clone()), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Music App Backend Running"}));

        let (status, body) = send(router(state), get("/api/hello")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Hello from the backend API!"}));
    }

    #[tokio::test]
    async fn test_endpoint_without_store() {
        let (status, body) = send(router(AppState(None)), get("/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend"], json!("✅ Running"));
        assert_eq!(body["database"], json!("⚠️  Available but not initialized"));
        assert_eq!(body["connection_status"], json!("Not Connected"));
        assert_eq!(body["collections"], json!([]));
        assert!(body["database_url"].is_string());
        assert!(body["database_name"].is_string());
    }

    #[tokio::test]
    async fn test_endpoint_lists_collections() {
        let state = state().await;
        let store = state.store().unwrap();
        create_record(store, "track", &json!({"title": "Song A"}))
            .await
            .unwrap();
        create_record(store, "album", &json!({"title": "Album A"}))
            .await
            .unwrap();
        let (status, body) = send(router(state), get("/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], json!("✅ Connected & Working"));
        assert_eq!(body["connection_status"], json!("Connected"));
        assert_eq!(body["collections"], json!(["album", "track"]));
    }

    #[tokio::test]
    async fn collections_are_capped() {
        let state = state().await;
        let store = state.store().unwrap();
        for n in 0..12 {
            create_record(store, &format!("c{:02}", n), &json!({}))
                .await
                .unwrap();
        }
        let report = diagnose(&state, None, None).await;
        assert_eq!(report.collections.len(), MAX_COLLECTIONS);
        assert_eq!(report.collections[0], "c00");
    }

    #[tokio::test]
    async fn environment_presence_is_reported_not_echoed() {
        let report = diagnose(
            &AppState(None),
            Some("postgres://user:secret@db/music".to_string()),
            None,
        )
        .await;
        assert_eq!(report.database_url, "✅ Set");
        assert_eq!(report.database_name, "❌ Not Set");
    }

    #[tokio::test]
    async fn store_errors_are_reported() {
        let state = AppState(Some(Arc::new(Broken::Failing)));
        let (status, body) = send(router(state), get("/test")).await;
        assert_eq!(status, StatusCode::OK);
        let database = body["database"].as_str().unwrap();
        let detail = database
            .strip_prefix("⚠️  Connected but Error: ")
            .unwrap();
        assert_eq!(detail.chars().count(), MAX_ERROR_LENGTH);
        assert_eq!(body["connection_status"], json!("Connected"));
        assert_eq!(body["collections"], json!([]));
    }

    #[tokio::test]
    async fn store_panics_are_reported() {
        let state = AppState(Some(Arc::new(Broken::Panicking)));
        let (status, body) = send(router(state), get("/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], json!("❌ Error: driver exploded"));
    }
}
