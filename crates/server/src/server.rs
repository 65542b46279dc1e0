use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use std::sync::Arc;

use crate::{ServerError, analytics, auth, budgets, categories, token::TokenKeys, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub keys: Arc<TokenKeys>,
}

/// Identity of the caller, inserted by the auth middleware.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

async fn auth_layer(
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(authorization)) = bearer else {
        return Err(ServerError::Unauthorized);
    };

    let claims = state.keys.verify(authorization.token()).map_err(|err| {
        tracing::debug!("rejected bearer token: {err}");
        ServerError::Unauthorized
    })?;

    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        username: claims.username,
    });
    Ok(next.run(request).await)
}

fn protected(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", get(auth::profile))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/budgets", get(budgets::list).post(budgets::upsert))
        .route("/budgets/current", get(budgets::current))
        .route(
            "/budgets/month/{month}/year/{year}",
            get(budgets::for_month),
        )
        .route(
            "/budgets/{id}",
            get(budgets::get).put(budgets::update).delete(budgets::delete),
        )
        .route("/analytics/stats", get(analytics::stats))
        .route("/analytics/categories", get(analytics::categories_current))
        .route(
            "/analytics/categories/month/{month}/year/{year}",
            get(analytics::categories_for_month),
        )
        .route("/analytics/monthly/expenses", get(analytics::monthly_expenses))
        .route("/analytics/monthly/income", get(analytics::monthly_income))
        .route(
            "/analytics/budget-comparison",
            get(analytics::budget_comparison),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/{id}", axum::routing::delete(categories::delete))
        .route_layer(middleware::from_fn_with_state(state, auth_layer))
}

/// Builds the full `/api` router.
pub fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected(state.clone()));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn app(engine: Engine, keys: TokenKeys) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        keys: Arc::new(keys),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    keys: TokenKeys,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, keys)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    keys: TokenKeys,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, keys, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
