// src/handlers/products.rs

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
    middleware::{
        rbac::{Admin, RequireRole},
        tenancy::TenantContext,
    },
    models::product::{CreateProductPayload, ProductFilter, UpdateProductPayload},
};

// GET /api/products?category=&page=&limit=
pub async fn list_products(
    State(app_state): State<AppState>,
    TenantContext(tenant): TenantContext,
    Query(filter): Query<ProductFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .product_service
        .list_products(tenant.id, filter, page)
        .await?;

    Ok(Json(ApiResponse::ok(products)))
}

pub async fn get_product(
    State(app_state): State<AppState>,
    TenantContext(tenant): TenantContext,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get_product(tenant.id, product_id).await?;
    Ok(Json(ApiResponse::ok(product)))
}

pub async fn create_product(
    State(app_state): State<AppState>,
    TenantContext(tenant): TenantContext,
    _guard: RequireRole<Admin>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.product_service.create_product(tenant.id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Produto criado com sucesso.", product)),
    ))
}

pub async fn update_product(
    State(app_state): State<AppState>,
    TenantContext(tenant): TenantContext,
    _guard: RequireRole<Admin>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .product_service
        .update_product(tenant.id, product_id, &payload)
        .await?;

    Ok(Json(ApiResponse::with_message("Produto atualizado com sucesso.", product)))
}

// Exclusão lógica
pub async fn delete_product(
    State(app_state): State<AppState>,
    TenantContext(tenant): TenantContext,
    _guard: RequireRole<Admin>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_service.delete_product(tenant.id, product_id).await?;
    Ok(Json(ApiResponse::message("Produto removido com sucesso.")))
}
