//! Registration, login and profile endpoints.

use api_types::auth::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::RegisterCmd;

use crate::{
    ServerError,
    server::{AuthUser, ServerState},
};

fn user_view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    }
}

fn token_response(state: &ServerState, user: engine::User) -> Result<AuthResponse, ServerError> {
    let (token, expires_at) = state
        .keys
        .issue(&user, Utc::now())
        .map_err(|err| ServerError::Internal(format!("failed to sign token: {err}")))?;
    Ok(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at,
        user: user_view(user),
    })
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    let user = state
        .engine
        .register(RegisterCmd::new(
            payload.username,
            payload.email,
            payload.password,
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(token_response(&state, user)?)))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ServerError> {
    let user = state
        .engine
        .verify_credentials(&payload.username, &payload.password)
        .await?;
    tracing::info!(user = %user.id, "user logged in");
    Ok(Json(token_response(&state, user)?))
}

/// Tokens are not revoked; the client drops its copy.
pub async fn logout(Extension(user): Extension<AuthUser>) -> Json<MessageResponse> {
    tracing::info!(user = %user.id, username = %user.username, "user logged out");
    Json(MessageResponse {
        message: "logged out".to_string(),
    })
}

pub async fn profile(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user_profile(user.id).await?;
    Ok(Json(user_view(user)))
}
