//! Transactions API endpoints

use api_types::{
    TransactionKind as ApiKind,
    transaction::{TransactionNew, TransactionRange, TransactionView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::TransactionCmd;
use uuid::Uuid;

use crate::{
    ServerError,
    server::{AuthUser, ServerState},
};

pub(crate) fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
    }
}

pub(crate) fn engine_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
    }
}

fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        amount_minor: tx.amount_minor,
        description: tx.description,
        category: tx.category,
        kind: map_kind(tx.kind),
        occurred_at: tx.occurred_at,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

fn command(payload: TransactionNew) -> TransactionCmd {
    TransactionCmd::new(
        engine_kind(payload.kind),
        payload.amount_minor,
        payload.category,
        payload.occurred_at.with_timezone(&Utc),
    )
    .description(payload.description)
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(range): Query<TransactionRange>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let txs = match (range.from, range.to) {
        (Some(from), Some(to)) => {
            state
                .engine
                .list_transactions_between(
                    user.id,
                    from.with_timezone(&Utc),
                    to.with_timezone(&Utc),
                )
                .await?
        }
        (None, None) => state.engine.list_transactions(user.id).await?,
        _ => {
            return Err(ServerError::Generic(
                "provide both from and to, or neither".to_string(),
            ));
        }
    };
    Ok(Json(txs.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state
        .engine
        .create_transaction(user.id, command(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(user.id, id).await?;
    Ok(Json(view(tx)))
}

pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(user.id, id, command(payload))
        .await?;
    Ok(Json(view(tx)))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
