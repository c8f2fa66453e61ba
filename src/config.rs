// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::{
    db::{CartRepository, OrderRepository, ProductRepository, TenantRepository, UserRepository},
    services::{AuthService, CartService, OrderService, ProductService, TenantService},
};

/// Configuração lida do ambiente (com `.env` opcional).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in_hours: i64,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_statement_timeout_ms: u64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            jwt_expires_in_hours: env_or("JWT_EXPIRES_IN_HOURS", 168)?,
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout: Duration::from_secs(env_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            db_statement_timeout_ms: env_or("DB_STATEMENT_TIMEOUT_MS", 5000)?,
            bcrypt_cost: env_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }

    /// Opções de pool: timeout de aquisição e `statement_timeout` em toda conexão.
    pub fn pool_options(&self) -> anyhow::Result<(PgPoolOptions, PgConnectOptions)> {
        let connect = PgConnectOptions::from_str(&self.database_url)
            .context("DATABASE_URL inválida")?
            .options([("statement_timeout", self.db_statement_timeout_ms.to_string())]);

        let pool = PgPoolOptions::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(self.db_acquire_timeout);

        Ok((pool, connect))
    }

    pub async fn connect_pool(&self) -> anyhow::Result<PgPool> {
        let (pool, connect) = self.pool_options()?;
        let db_pool = pool
            .connect_with(connect)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(db_pool)
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_or(key, env::var(key).ok().as_deref(), default)
}

fn parse_or<T>(key: &str, raw: Option<&str>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} inválida ({}): {}", key, raw, e)),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub product_service: ProductService,
    pub cart_service: CartService,
    pub order_service: OrderService,
}

impl AppState {
    // --- Monta o gráfico de dependências ---
    pub fn new(config: Config, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let cart_repo = CartRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            config.jwt_expires_in_hours,
            config.bcrypt_cost,
            db_pool.clone(),
        );
        let tenant_service =
            TenantService::new(tenant_repo, user_repo, config.bcrypt_cost, db_pool.clone());
        let product_service = ProductService::new(product_repo.clone(), db_pool.clone());
        let cart_service = CartService::new(cart_repo.clone(), product_repo.clone(), db_pool.clone());
        let order_service = OrderService::new(order_repo, cart_repo, product_repo, db_pool.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            tenant_service,
            product_service,
            cart_service,
            order_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_and_parses() {
        assert_eq!(parse_or::<u32>("DB_MAX_CONNECTIONS", None, 7).unwrap(), 7);
        assert_eq!(parse_or::<u32>("DB_MAX_CONNECTIONS", Some(" 42 "), 7).unwrap(), 42);

        let err = parse_or::<u32>("DB_MAX_CONNECTIONS", Some("abc"), 7).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn unset_variable_uses_default() {
        assert_eq!(env_or::<u32>("STOREFRONT_TEST_UNSET_VAR", 7).unwrap(), 7);
    }
}
