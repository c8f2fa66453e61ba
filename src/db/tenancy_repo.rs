// src/db/tenancy_repo.rs

use sqlx::{PgPool, Postgres, Executor};
use crate::common::error::AppError;
use crate::models::tenancy::{Tenant, TenantIdentifier};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca um tenant ATIVO pelo id ou pelo slug.
    pub async fn find_active(&self, identifier: &TenantIdentifier) -> Result<Option<Tenant>, AppError> {
        let tenant = match identifier {
            TenantIdentifier::Id(id) => {
                sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1 AND is_active")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            TenantIdentifier::Slug(slug) => {
                sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = $1 AND is_active")
                    .bind(slug)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(tenant)
    }

    /// Cria um novo tenant. Slug duplicado vira `Conflict`.
    pub async fn create_tenant<'e, E>(
        &self,
        executor: E, // Aceita um executor (pool ou transação)
        name: &str,
        slug: &str,
        domain: Option<&str>,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, slug, domain)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
            .bind(name)
            .bind(slug)
            .bind(domain)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::conflict(format!("O slug '{}' já está em uso.", slug));
                    }
                }
                e.into()
            })
    }
}
