// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::PageParams, response::ApiResponse},
    config::AppState,
    middleware::rbac::{Admin, RequireRole},
    models::{
        auth::Principal,
        order::{CreateOrderPayload, UpdateOrderStatusPayload},
    },
};

// POST /api/orders: checkout do carrinho atual
pub async fn create_order(
    State(app_state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order = app_state.order_service.create_order(&principal, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Pedido criado com sucesso.", order)),
    ))
}

pub async fn list_orders(
    State(app_state): State<AppState>,
    principal: Principal,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.get_orders(&principal, page).await?;
    Ok(Json(ApiResponse::ok(orders)))
}

pub async fn get_order(
    State(app_state): State<AppState>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.get_order_by_id(&principal, order_id).await?;
    Ok(Json(ApiResponse::ok(order)))
}

pub async fn update_order_status(
    State(app_state): State<AppState>,
    principal: Principal,
    _guard: RequireRole<Admin>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .order_service
        .update_order_status(principal.tenant_id, order_id, payload.status)
        .await?;

    Ok(Json(ApiResponse::with_message("Status do pedido atualizado.", order)))
}
