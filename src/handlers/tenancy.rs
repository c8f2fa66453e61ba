// src/handlers/tenancy.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::tenancy::CreateTenantPayload,
};

// POST /api/tenants (público)
pub async fn create_tenant(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state.tenant_service.create_tenant(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Loja criada com sucesso.", created)),
    ))
}
