// src/handlers/health.rs

use axum::{extract::State, Json};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
};

// GET /api/health: 200 se o banco responde, 503 caso contrário
pub async fn health(State(app_state): State<AppState>) -> Result<Json<ApiResponse<()>>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&app_state.db_pool)
        .await
        .map_err(|e| {
            tracing::warn!("Health check falhou: {}", e);
            AppError::ServiceUnavailable("Banco de dados indisponível.".into())
        })?;

    Ok(Json(ApiResponse::message("OK")))
}
