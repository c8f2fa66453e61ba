// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{Principal, Role},
};

/// 1. O Trait que define quais papéis uma rota aceita
pub trait RoleDef: Send + Sync + 'static {
    fn allowed() -> &'static [Role];
}

/// 2. O Extractor (Guardião). Depende do `auth_guard` ter rodado antes.
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .ok_or_else(|| AppError::unauthorized("Usuário não autenticado."))?;

        principal.require_role(T::allowed())?;

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct Admin;
impl RoleDef for Admin {
    fn allowed() -> &'static [Role] { &[Role::Admin] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    async fn extract(principal: Option<Principal>) -> Result<RequireRole<Admin>, AppError> {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(p) = principal {
            parts.extensions.insert(p);
        }
        RequireRole::<Admin>::from_request_parts(&mut parts, &()).await
    }

    fn principal(role: Role) -> Principal {
        Principal { user_id: Uuid::new_v4(), tenant_id: Uuid::new_v4(), role }
    }

    #[tokio::test]
    async fn admin_passes() {
        assert!(extract(Some(principal(Role::Admin))).await.is_ok());
    }

    #[tokio::test]
    async fn customer_is_forbidden() {
        let err = extract(Some(principal(Role::Customer))).await.err().unwrap();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn anonymous_is_unauthorized() {
        let err = extract(None).await.err().unwrap();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
