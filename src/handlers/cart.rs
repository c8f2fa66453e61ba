// src/handlers/cart.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::{
        auth::Principal,
        cart::{AddCartItemPayload, Cart, UpdateCartItemPayload},
    },
};

type CartResponse = Result<Json<ApiResponse<Cart>>, AppError>;

pub async fn get_cart(State(app_state): State<AppState>, principal: Principal) -> CartResponse {
    let cart = app_state
        .cart_service
        .get_cart(principal.tenant_id, principal.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(cart)))
}

pub async fn add_item(
    State(app_state): State<AppState>,
    principal: Principal,
    Json(payload): Json<AddCartItemPayload>,
) -> CartResponse {
    payload.validate()?;

    let cart = app_state
        .cart_service
        .add_item(principal.tenant_id, principal.user_id, payload.product_id, payload.quantity)
        .await?;
    Ok(Json(ApiResponse::with_message("Item adicionado ao carrinho.", cart)))
}

pub async fn update_item(
    State(app_state): State<AppState>,
    principal: Principal,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemPayload>,
) -> CartResponse {
    payload.validate()?;

    let cart = app_state
        .cart_service
        .update_item(principal.tenant_id, principal.user_id, product_id, payload.quantity)
        .await?;
    Ok(Json(ApiResponse::with_message("Carrinho atualizado.", cart)))
}

pub async fn remove_item(
    State(app_state): State<AppState>,
    principal: Principal,
    Path(product_id): Path<Uuid>,
) -> CartResponse {
    let cart = app_state
        .cart_service
        .remove_item(principal.tenant_id, principal.user_id, product_id)
        .await?;
    Ok(Json(ApiResponse::with_message("Item removido do carrinho.", cart)))
}

pub async fn clear_cart(State(app_state): State<AppState>, principal: Principal) -> CartResponse {
    let cart = app_state
        .cart_service
        .clear_cart(principal.tenant_id, principal.user_id)
        .await?;
    Ok(Json(ApiResponse::with_message("Carrinho esvaziado.", cart)))
}
