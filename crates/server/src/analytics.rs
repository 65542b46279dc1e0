//! Read-only analytics endpoints

use api_types::analytics::{
    BudgetComparison, CategoryAmount, DashboardStats, KindQuery, MonthQuery, MonthlyAmount,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{Datelike, Utc};

use crate::{
    ServerError,
    server::{AuthUser, ServerState},
    transactions::engine_kind,
};

fn kind_or_expense(query: &KindQuery) -> engine::TransactionKind {
    query
        .kind
        .map(engine_kind)
        .unwrap_or(engine::TransactionKind::Expense)
}

fn category_rows(rows: Vec<engine::CategoryAmount>) -> Json<Vec<CategoryAmount>> {
    Json(
        rows.into_iter()
            .map(|row| CategoryAmount {
                category: row.category,
                amount_minor: row.amount_minor,
                count: row.count,
                percentage: row.percentage,
            })
            .collect(),
    )
}

fn monthly_rows(rows: Vec<engine::MonthlyAmount>) -> Json<Vec<MonthlyAmount>> {
    Json(
        rows.into_iter()
            .map(|row| MonthlyAmount {
                month: row.month,
                amount_minor: row.amount_minor,
            })
            .collect(),
    )
}

pub async fn stats(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardStats>, ServerError> {
    let stats = state.engine.dashboard_stats(user.id, Utc::now()).await?;
    Ok(Json(DashboardStats {
        total_income_minor: stats.total_income_minor,
        total_expenses_minor: stats.total_expenses_minor,
        balance_minor: stats.balance_minor,
        monthly_income_minor: stats.monthly_income_minor,
        monthly_expenses_minor: stats.monthly_expenses_minor,
    }))
}

/// Breakdown for the current month.
pub async fn categories_current(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<KindQuery>,
) -> Result<Json<Vec<CategoryAmount>>, ServerError> {
    let now = Utc::now();
    let rows = state
        .engine
        .category_breakdown(user.id, kind_or_expense(&query), now.month(), now.year())
        .await?;
    Ok(category_rows(rows))
}

pub async fn categories_for_month(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path((month, year)): Path<(u32, i32)>,
    Query(query): Query<KindQuery>,
) -> Result<Json<Vec<CategoryAmount>>, ServerError> {
    let rows = state
        .engine
        .category_breakdown(user.id, kind_or_expense(&query), month, year)
        .await?;
    Ok(category_rows(rows))
}

pub async fn monthly_expenses(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<MonthlyAmount>>, ServerError> {
    let rows = state
        .engine
        .monthly_series(user.id, engine::TransactionKind::Expense)
        .await?;
    Ok(monthly_rows(rows))
}

pub async fn monthly_income(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<MonthlyAmount>>, ServerError> {
    let rows = state
        .engine
        .monthly_series(user.id, engine::TransactionKind::Income)
        .await?;
    Ok(monthly_rows(rows))
}

pub async fn budget_comparison(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<BudgetComparison>>, ServerError> {
    let now = Utc::now();
    let month = query.month.unwrap_or_else(|| now.month());
    let year = query.year.unwrap_or_else(|| now.year());
    let rows = state
        .engine
        .budget_comparison(user.id, month, year)
        .await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| BudgetComparison {
                category: row.category,
                budget_minor: row.budget_minor,
                spent_minor: row.spent_minor,
            })
            .collect(),
    ))
}
