// src/services/cart_service.rs

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CartRepository, ProductRepository},
    models::{
        cart::{Cart, CartRow},
        product::Product,
    },
};

const NOT_IN_CART: &str = "Produto não está no carrinho.";

#[derive(Clone)]
pub struct CartService {
    cart_repo: CartRepository,
    product_repo: ProductRepository,
    pool: PgPool,
}

impl CartService {
    pub fn new(cart_repo: CartRepository, product_repo: ProductRepository, pool: PgPool) -> Self {
        Self { cart_repo, product_repo, pool }
    }

    /// O carrinho é criado preguiçosamente no primeiro acesso.
    pub async fn get_cart(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Cart, AppError> {
        let row = self.cart_repo.get_or_create(tenant_id, user_id).await?;
        self.view(row).await
    }

    pub async fn add_item(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, AppError> {
        if quantity < 1 {
            return Err(AppError::validation("A quantidade deve ser pelo menos 1."));
        }

        // 1. Produto precisa existir e estar ativo nesta loja
        let product = self.active_product(tenant_id, product_id).await?;
        if quantity > product.stock {
            return Err(insufficient_stock(&product));
        }

        // 2. Soma atômica com teto de estoque sobre o novo total, com o carrinho travado
        self.cart_repo.get_or_create(tenant_id, user_id).await?;
        let mut tx = self.pool.begin().await?;
        let cart = self.lock(&mut tx, tenant_id, user_id).await?;

        let merged = self
            .cart_repo
            .upsert_line(&mut *tx, tenant_id, cart.id, product_id, quantity)
            .await?;

        if merged.is_none() {
            drop(tx);
            // Relê para a mensagem refletir o estoque atual
            let current = self.active_product(tenant_id, product_id).await?;
            return Err(insufficient_stock(&current));
        }

        self.cart_repo.touch(&mut *tx, cart.id).await?;
        tx.commit().await?;
        self.get_cart(tenant_id, user_id).await
    }

    /// Substitui a quantidade. Zero é rejeitado: a remoção é pelo DELETE.
    pub async fn update_item(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, AppError> {
        if quantity < 1 {
            return Err(AppError::validation(
                "A quantidade deve ser pelo menos 1. Use DELETE para remover o item.",
            ));
        }

        let mut tx = self.pool.begin().await?;
        let cart = self.lock(&mut tx, tenant_id, user_id).await?;

        // 1. A linha precisa existir antes de qualquer conferência de estoque
        self.cart_repo
            .set_line_quantity(&mut *tx, cart.id, product_id, quantity)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_IN_CART))?;

        // 2. Estoque atual; o drop de `tx` desfaz a troca
        let product = self
            .product_repo
            .find_active(&mut *tx, tenant_id, product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Produto não encontrado."))?;
        if quantity > product.stock {
            return Err(insufficient_stock(&product));
        }

        self.cart_repo.touch(&mut *tx, cart.id).await?;
        tx.commit().await?;
        self.get_cart(tenant_id, user_id).await
    }

    pub async fn remove_item(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Cart, AppError> {
        let mut tx = self.pool.begin().await?;
        let cart = self.lock(&mut tx, tenant_id, user_id).await?;

        if !self.cart_repo.delete_line(&mut *tx, cart.id, product_id).await? {
            return Err(AppError::not_found(NOT_IN_CART));
        }

        self.cart_repo.touch(&mut *tx, cart.id).await?;
        tx.commit().await?;
        self.get_cart(tenant_id, user_id).await
    }

    /// Idempotente: limpar um carrinho vazio também dá certo.
    pub async fn clear_cart(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Cart, AppError> {
        self.cart_repo.get_or_create(tenant_id, user_id).await?;
        let mut tx = self.pool.begin().await?;
        let cart = self.lock(&mut tx, tenant_id, user_id).await?;

        let removed = self.cart_repo.clear(&mut *tx, cart.id).await?;
        if removed > 0 {
            self.cart_repo.touch(&mut *tx, cart.id).await?;
        }
        tx.commit().await?;
        self.get_cart(tenant_id, user_id).await
    }

    // ---
    // Auxiliares
    // ---

    async fn view(&self, row: CartRow) -> Result<Cart, AppError> {
        let lines = self.cart_repo.list_lines(&self.pool, row.tenant_id, row.id).await?;
        Ok(Cart::assemble(row, lines))
    }

    /// Mesma trava do checkout: uma alteração de linha nunca corre em paralelo com ele.
    async fn lock(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<CartRow, AppError> {
        self.cart_repo
            .lock_cart(&mut **tx, tenant_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_IN_CART))
    }

    async fn active_product(&self, tenant_id: Uuid, product_id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .find_active(&self.pool, tenant_id, product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Produto não encontrado."))
    }
}

fn insufficient_stock(product: &Product) -> AppError {
    AppError::validation(format!(
        "Estoque insuficiente para '{}'. Disponível: {}.",
        product.name, product.stock
    ))
}
