use std::collections::BTreeMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{AuthUser, ServerState, app, router, run_with_listener, spawn_with_listener};
pub use token::{Claims, TokenKeys};

mod analytics;
mod auth;
mod budgets;
mod categories;
mod server;
mod token;
mod transactions;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{
            AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UserView,
        };
    }

    pub mod transaction {
        pub use api_types::TransactionKind;
        pub use api_types::transaction::{TransactionNew, TransactionRange, TransactionView};
    }

    pub mod budget {
        pub use api_types::budget::{BudgetNew, BudgetView};
    }

    pub mod analytics {
        pub use api_types::analytics::{
            BudgetComparison, CategoryAmount, DashboardStats, KindQuery, MonthQuery,
            MonthlyAmount,
        };
    }

    pub mod category {
        pub use api_types::category::{CategoryList, CategoryNew, CategoryView};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    Unauthorized,
    /// Logged, then reported without details.
    Internal(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, String>>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::PasswordHash(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn body_for_engine_error(err: EngineError) -> Error {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            Error {
                error: "internal server error".to_string(),
                fields: None,
            }
        }
        EngineError::PasswordHash(hash_err) => {
            tracing::error!("password hashing error: {hash_err}");
            Error {
                error: "internal server error".to_string(),
                fields: None,
            }
        }
        EngineError::Validation(fields) => Error {
            error: "validation failed".to_string(),
            fields: Some(
                fields
                    .iter()
                    .map(|(field, message)| (field.to_string(), message.to_string()))
                    .collect(),
            ),
        },
        other => Error {
            error: other.to_string(),
            fields: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                Error {
                    error,
                    fields: None,
                },
            ),
            ServerError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Error {
                    error: "unauthorized".to_string(),
                    fields: None,
                },
            ),
            ServerError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Error {
                        error: "internal server error".to_string(),
                        fields: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::FieldErrors;
    use http_body_util::BodyExt;

    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_credentials_map_to_401() {
        let res = ServerError::from(EngineError::InvalidCredentials).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ServerError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn validation_lists_fields() {
        let mut fields = FieldErrors::new();
        fields.add("amount_minor", "amount must be positive");
        let res = ServerError::from(EngineError::Validation(fields)).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["fields"]["amount_minor"], "amount must be positive");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let res = ServerError::from(EngineError::Database(sea_orm::DbErr::Custom(
            "disk on fire".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
        assert!(body.get("fields").is_none());
    }
}
