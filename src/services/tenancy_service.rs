// src/services/tenancy_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{TenantRepository, UserRepository},
    models::{
        auth::Role,
        tenancy::{CreateTenantPayload, Tenant, TenantCreated, TenantIdentifier},
    },
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct TenantService {
    tenant_repo: TenantRepository,
    user_repo: UserRepository,
    bcrypt_cost: u32,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl TenantService {
    pub fn new(
        tenant_repo: TenantRepository,
        user_repo: UserRepository,
        bcrypt_cost: u32,
        pool: PgPool,
    ) -> Self {
        Self { tenant_repo, user_repo, bcrypt_cost, pool }
    }

    /// Resolve o cabeçalho X-Tenant-ID (UUID ou slug) para uma loja ATIVA.
    pub async fn resolve(&self, identifier: &TenantIdentifier) -> Result<Tenant, AppError> {
        self.tenant_repo
            .find_active(identifier)
            .await?
            .ok_or_else(|| AppError::not_found("Loja não encontrada ou inativa."))
    }

    /// Cria a loja e, atomicamente, o seu administrador inicial (se informado).
    pub async fn create_tenant(&self, payload: &CreateTenantPayload) -> Result<TenantCreated, AppError> {
        let admin = payload.admin_info().map_err(|e| {
            AppError::validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Dados do administrador inválidos.".to_string()),
            )
        })?;

        // 1. Hash fora da transação
        let admin_hash = match &admin {
            Some(info) => Some(hash_password(&info.password, self.bcrypt_cost).await?),
            None => None,
        };

        // 2. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 3. Cria a loja
        let tenant = self
            .tenant_repo
            .create_tenant(
                &mut *tx,
                payload.name.trim(),
                &payload.slug,
                payload.domain.as_deref(),
            )
            .await?;

        // 4. Cria o admin dentro da mesma transação
        let admin_user = match (admin, admin_hash) {
            (Some(info), Some(password_hash)) => Some(
                self.user_repo
                    .create_user(
                        &mut *tx,
                        tenant.id,
                        &info.name,
                        &info.email,
                        &password_hash,
                        Role::Admin,
                    )
                    .await?,
            ),
            _ => None,
        };

        // 5. Commit
        tx.commit().await?;

        tracing::info!(tenant_id = %tenant.id, slug = %tenant.slug, "🏪 Nova loja criada");

        Ok(TenantCreated { tenant, admin: admin_user })
    }
}
