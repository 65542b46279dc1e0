//! Category labels: built-in defaults plus user-defined ones.

use api_types::category::{CategoryList, CategoryNew, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{AuthUser, ServerState},
    transactions::{engine_kind, map_kind},
};

fn view(category: engine::CustomCategory) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: map_kind(category.kind),
        created_at: category.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryList>, ServerError> {
    let names = state.engine.list_categories(user.id).await?;
    let custom = state.engine.list_custom_categories(user.id).await?;
    Ok(Json(CategoryList {
        income: names.income,
        expense: names.expense,
        custom: custom.into_iter().map(view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(user.id, &payload.name, engine_kind(payload.kind))
        .await?;
    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
