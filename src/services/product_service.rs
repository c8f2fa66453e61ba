// src/services/product_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
    },
    db::ProductRepository,
    models::product::{CreateProductPayload, Product, ProductFilter, UpdateProductPayload},
};

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    pool: PgPool,
}

impl ProductService {
    pub fn new(product_repo: ProductRepository, pool: PgPool) -> Self {
        Self { product_repo, pool }
    }

    pub async fn list_products(
        &self,
        tenant_id: Uuid,
        filter: ProductFilter,
        page: PageParams,
    ) -> Result<Paginated<Product>, AppError> {
        let (items, total) = self
            .product_repo
            .list_active(tenant_id, filter.category, page.limit() as i64, page.offset())
            .await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn get_product(&self, tenant_id: Uuid, product_id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .find_active(&self.pool, tenant_id, product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Produto não encontrado."))
    }

    pub async fn create_product(
        &self,
        tenant_id: Uuid,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError> {
        let product = self.product_repo.create_product(tenant_id, payload).await?;
        tracing::info!(tenant_id = %tenant_id, product_id = %product.id, "Produto criado");
        Ok(product)
    }

    /// Alterações de preço/estoque não afetam pedidos existentes (snapshots).
    pub async fn update_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Product, AppError> {
        self.product_repo
            .update_product(tenant_id, product_id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("Produto não encontrado."))
    }

    pub async fn delete_product(&self, tenant_id: Uuid, product_id: Uuid) -> Result<(), AppError> {
        if !self.product_repo.deactivate(tenant_id, product_id).await? {
            return Err(AppError::not_found("Produto não encontrado."));
        }
        tracing::info!(tenant_id = %tenant_id, product_id = %product_id, "Produto desativado");
        Ok(())
    }
}
