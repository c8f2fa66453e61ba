// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::tenancy::{Tenant, TenantIdentifier},
};

// O nome do nosso cabeçalho HTTP customizado
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

// A loja resolvida para esta requisição.
#[derive(Debug, Clone)]
pub struct TenantContext(pub Tenant);

/// Lê o X-Tenant-ID (UUID ou slug). Ausente ou ilegível = 403, sem tocar no banco.
pub fn tenant_identifier(headers: &HeaderMap) -> Result<TenantIdentifier, AppError> {
    headers
        .get(TENANT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(TenantIdentifier::parse)
        .ok_or_else(|| AppError::forbidden("O cabeçalho X-Tenant-ID é obrigatório."))
}

// Middleware das rotas públicas de uma loja (login, registro, catálogo)
pub async fn tenant_resolver(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identifier = tenant_identifier(request.headers())?;
    let tenant = app_state.tenant_service.resolve(&identifier).await?;

    request.extensions_mut().insert(TenantContext(tenant));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .ok_or_else(|| AppError::forbidden("Contexto da loja não encontrado."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    #[test]
    fn missing_header_is_forbidden() {
        let err = tenant_identifier(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn header_accepts_uuid_and_slug() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(tenant_identifier(&headers).unwrap(), TenantIdentifier::Id(id));

        headers.insert(TENANT_ID_HEADER, HeaderValue::from_static("loja-centro"));
        assert_eq!(
            tenant_identifier(&headers).unwrap(),
            TenantIdentifier::Slug("loja-centro".into())
        );
    }
}
