// src/app.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    config::AppState,
    handlers,
    middleware::{auth::auth_guard, tenancy::tenant_resolver},
};

/// Monta todas as rotas sob /api.
///
/// - públicas: criação de loja e health check
/// - `tenant_resolver`: rotas públicas de uma loja (X-Tenant-ID, sem token)
/// - `auth_guard`: X-Tenant-ID + Bearer; papéis conferidos pelo extrator `RequireRole`
pub fn create_router(app_state: AppState) -> Router {
    let resolve = || axum_middleware::from_fn_with_state(app_state.clone(), tenant_resolver);
    let guard = || axum_middleware::from_fn_with_state(app_state.clone(), auth_guard);

    // Define as rotas de autenticação
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register).route_layer(resolve()))
        .route("/login", post(handlers::auth::login).route_layer(resolve()))
        .route("/me", get(handlers::auth::get_me).route_layer(guard()));

    // Catálogo: leitura pública na loja, escrita só para admin
    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products)
                .route_layer(resolve())
                .merge(post(handlers::products::create_product).route_layer(guard())),
        )
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .route_layer(resolve())
                .merge(
                    put(handlers::products::update_product)
                        .delete(handlers::products::delete_product)
                        .route_layer(guard()),
                ),
        );

    let cart_routes = Router::new()
        .route(
            "/",
            get(handlers::cart::get_cart).delete(handlers::cart::clear_cart),
        )
        .route("/items", post(handlers::cart::add_item))
        .route(
            "/items/{product_id}",
            put(handlers::cart::update_item).delete(handlers::cart::remove_item),
        )
        .route_layer(guard());

    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route("/{id}", get(handlers::orders::get_order))
        .route("/{id}/status", put(handlers::orders::update_order_status))
        .route_layer(guard());

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/tenants", post(handlers::tenancy::create_tenant))
        .nest("/api/auth", auth_routes)
        .nest("/api/products", product_routes)
        .nest("/api/cart", cart_routes)
        .nest("/api/orders", order_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
