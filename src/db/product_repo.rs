// src/db/product_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::product::{CreateProductPayload, Product, ProductCategory, UpdateProductPayload},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    /// Produto ativo do tenant. Inativo ou de outro tenant = `None`.
    pub async fn find_active<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 AND id = $2 AND is_active",
        )
            .bind(tenant_id)
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Vários produtos de uma vez (ativos ou não), usado no checkout.
    pub async fn find_many<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 AND id = ANY($2)",
        )
            .bind(tenant_id)
            .bind(product_ids)
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn list_active(
        &self,
        tenant_id: Uuid,
        category: Option<ProductCategory>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Product>, i64), AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE tenant_id = $1 AND is_active AND ($2::product_category IS NULL OR category = $2)
            ORDER BY name ASC, id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
            .bind(tenant_id)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM products
            WHERE tenant_id = $1 AND is_active AND ($2::product_category IS NULL OR category = $2)
            "#,
        )
            .bind(tenant_id)
            .bind(category)
            .fetch_one(&self.pool)
            .await?;

        Ok((products, total))
    }

    // ---
    // Escrita
    // ---

    pub async fn create_product(
        &self,
        tenant_id: Uuid,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (tenant_id, name, description, category, brand, sku, image_url, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(&payload.name)
            .bind(&payload.description)
            .bind(payload.category)
            .bind(&payload.brand)
            .bind(&payload.sku)
            .bind(&payload.image_url)
            .bind(payload.price)
            .bind(payload.stock)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::conflict("Já existe um produto com esse SKU.");
                    }
                }
                e.into()
            })
    }

    /// Atualização parcial: campos `None` mantêm o valor atual.
    pub async fn update_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                category = COALESCE($5, category),
                brand = COALESCE($6, brand),
                image_url = COALESCE($7, image_url),
                price = COALESCE($8, price),
                stock = COALESCE($9, stock),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(product_id)
            .bind(&payload.name)
            .bind(&payload.description)
            .bind(payload.category)
            .bind(&payload.brand)
            .bind(&payload.image_url)
            .bind(payload.price)
            .bind(payload.stock)
            .bind(payload.is_active)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Exclusão lógica: os snapshots dos pedidos continuam válidos.
    pub async fn deactivate(&self, tenant_id: Uuid, product_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE tenant_id = $1 AND id = $2 AND is_active",
        )
            .bind(tenant_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Baixa de estoque atômica e condicional: só decrementa se `stock >= amount`.
    /// Um único UPDATE, sem janela entre a leitura e a escrita.
    /// `None` = produto ausente/inativo ou estoque insuficiente neste instante.
    pub async fn decrement_stock<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = stock - $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2 AND is_active AND stock >= $3
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(product_id)
            .bind(amount)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }
}
