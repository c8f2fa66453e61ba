// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::{tenant_identifier, TenantContext},
    models::{
        auth::{Principal, User},
        tenancy::TenantIdentifier,
    },
};

// O guardião das rotas autenticadas.
// A ordem importa: tudo que dá para rejeitar sem banco é rejeitado antes.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Loja (403 se ausente)
    let identifier = tenant_identifier(request.headers())?;

    // 2. Bearer (401 se ausente)
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::unauthorized("Token de autenticação ausente."))?;

    // 3. Assinatura e expiração (401)
    let claims = app_state.auth_service.decode_token(bearer.token())?;

    // 4. Se o cabeçalho já traz o UUID, confere com o token antes de ir ao banco
    if let TenantIdentifier::Id(id) = &identifier {
        if *id != claims.tenant_id {
            return Err(AppError::forbidden("O token não pertence a esta loja."));
        }
    }

    // 5. Loja ativa (404) e usuário ainda existente (401)
    let tenant = app_state.tenant_service.resolve(&identifier).await?;
    let user = app_state.auth_service.authenticate(&tenant, &claims).await?;

    // Insere o contexto nos "extensions" da requisição
    let principal = Principal::from(&user);
    let extensions = request.extensions_mut();
    extensions.insert(TenantContext(tenant));
    extensions.insert(AuthenticatedUser(user));
    extensions.insert(principal);

    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Usuário não autenticado."))
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .ok_or_else(|| AppError::unauthorized("Usuário não autenticado."))
    }
}
