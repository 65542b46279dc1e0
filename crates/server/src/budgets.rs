//! Budgets API endpoints

use api_types::budget::{BudgetNew, BudgetView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::BudgetCmd;
use uuid::Uuid;

use crate::{
    ServerError,
    server::{AuthUser, ServerState},
};

fn view(budget: engine::Budget) -> BudgetView {
    BudgetView {
        remaining_minor: budget.remaining_minor(),
        percentage_used: budget.percentage_used(),
        id: budget.id,
        category: budget.category,
        amount_minor: budget.amount_minor,
        spent_minor: budget.spent_minor,
        month: budget.month,
        year: budget.year,
        created_at: budget.created_at,
        updated_at: budget.updated_at,
    }
}

fn views(budgets: Vec<engine::Budget>) -> Json<Vec<BudgetView>> {
    Json(budgets.into_iter().map(view).collect())
}

fn command(payload: BudgetNew) -> BudgetCmd {
    BudgetCmd::new(
        payload.category,
        payload.amount_minor,
        payload.month,
        payload.year,
    )
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    Ok(views(state.engine.list_budgets(user.id).await?))
}

/// Creates the budget for its category and month, or changes its limit.
pub async fn upsert(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let budget = state
        .engine
        .upsert_budget(user.id, command(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(view(budget))))
}

pub async fn current(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    Ok(views(
        state.engine.current_budgets(user.id, Utc::now()).await?,
    ))
}

pub async fn for_month(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path((month, year)): Path<(u32, i32)>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    if !(1..=12).contains(&month) {
        return Err(ServerError::Generic(
            "month must be between 1 and 12".to_string(),
        ));
    }
    Ok(views(
        state
            .engine
            .list_budgets_for_month(user.id, month, year)
            .await?,
    ))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    Ok(Json(view(state.engine.budget(user.id, id).await?)))
}

pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetNew>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state
        .engine
        .update_budget(user.id, id, command(payload))
        .await?;
    Ok(Json(view(budget)))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
