// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::auth::{LoginUserPayload, RegisterUserPayload, User},
};

// Handler de registro (sempre cria um cliente)
pub async fn register(
    State(app_state): State<AppState>,
    TenantContext(tenant): TenantContext,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let auth = app_state.auth_service.register_user(&tenant, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Usuário registrado com sucesso.", auth)),
    ))
}

// Handler de login
pub async fn login(
    State(app_state): State<AppState>,
    TenantContext(tenant): TenantContext,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let auth = app_state.auth_service.login_user(&tenant, &payload).await?;

    Ok(Json(ApiResponse::with_message("Login realizado com sucesso.", auth)))
}

// Handler da rota protegida /me
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<ApiResponse<User>> {
    Json(ApiResponse::ok(user))
}
