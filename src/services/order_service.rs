// src/services/order_service.rs

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
    },
    db::{CartRepository, OrderRepository, ProductRepository},
    models::{
        auth::Principal,
        cart::CartLine,
        order::{order_total, CreateOrderPayload, Order, OrderItem, OrderStatus},
        product::Product,
    },
};

const EMPTY_CART: &str = "O carrinho está vazio.";

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    cart_repo: CartRepository,
    product_repo: ProductRepository,
    pool: PgPool,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        cart_repo: CartRepository,
        product_repo: ProductRepository,
        pool: PgPool,
    ) -> Self {
        Self { order_repo, cart_repo, product_repo, pool }
    }

    /// Checkout: transforma o carrinho em pedido, tudo ou nada.
    ///
    /// Numa única transação:
    /// trava o carrinho, valida cada linha, baixa o estoque em ordem crescente de
    /// `product_id`, grava o pedido com o snapshot de nome/preço e esvazia o carrinho.
    /// Qualquer falha antes do commit desfaz todas as baixas já feitas.
    pub async fn create_order(
        &self,
        principal: &Principal,
        payload: &CreateOrderPayload,
    ) -> Result<Order, AppError> {
        let tenant_id = principal.tenant_id;
        let user_id = principal.user_id;

        let mut tx = self.pool.begin().await?;

        // 1. Trava o carrinho: checkouts concorrentes do mesmo carrinho entram em fila
        //    e o segundo encontra o carrinho já vazio.
        let cart = self
            .cart_repo
            .lock_cart(&mut *tx, tenant_id, user_id)
            .await?
            .ok_or_else(|| AppError::validation(EMPTY_CART))?;

        let lines = self.cart_repo.list_lines(&mut *tx, tenant_id, cart.id).await?;
        if lines.is_empty() {
            return Err(AppError::validation(EMPTY_CART));
        }

        // 2. Pré-validação na ordem de inserção (a primeira linha ruim dá nome ao erro)
        let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let products: HashMap<Uuid, Product> = self
            .product_repo
            .find_many(&mut *tx, tenant_id, &product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        for line in &lines {
            check_line(line, products.get(&line.product_id))?;
        }

        // 3. Baixa condicional do estoque, em ordem global de product_id
        let mut lock_order: Vec<&CartLine> = lines.iter().collect();
        lock_order.sort_by_key(|l| l.product_id);

        let mut decremented: HashMap<Uuid, Product> = HashMap::with_capacity(lines.len());
        for line in lock_order {
            let product = self
                .product_repo
                .decrement_stock(&mut *tx, tenant_id, line.product_id, line.quantity)
                .await?
                .ok_or_else(|| {
                    // O drop de `tx` devolve as baixas anteriores
                    tracing::info!(
                        tenant_id = %tenant_id,
                        user_id = %user_id,
                        product_id = %line.product_id,
                        "Checkout abortado: estoque mudou durante a compra"
                    );
                    AppError::validation(format!("Estoque insuficiente para '{}'.", line.name))
                })?;
            decremented.insert(product.id, product);
        }

        // 4. Snapshot na ordem do carrinho, com o preço da linha travada
        let items = lines
            .iter()
            .map(|line| -> Result<OrderItem, AppError> {
                let product = decremented.get(&line.product_id).ok_or_else(|| {
                    anyhow::anyhow!("produto {} ausente após a baixa de estoque", line.product_id)
                })?;
                Ok(OrderItem {
                    product_id: product.id,
                    name: product.name.clone(),
                    unit_price: product.price,
                    quantity: line.quantity,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total_amount = order_total(&items);

        // 5. Pedido + itens
        let mut order = self
            .order_repo
            .insert_order(
                &mut *tx,
                tenant_id,
                user_id,
                total_amount,
                payload.payment_method,
                &payload.shipping_address,
                payload.notes.as_deref(),
            )
            .await?;

        self.order_repo
            .insert_items(&mut *tx, tenant_id, order.id, &items)
            .await?;

        // 6. Esvaziar o carrinho não derruba um pedido já montado
        if let Err(e) = self.clear_cart_in_savepoint(&mut tx, cart.id).await {
            tracing::warn!(
                tenant_id = %tenant_id,
                user_id = %user_id,
                order_id = %order.id,
                "Pedido criado, mas o carrinho não foi esvaziado: {}", e
            );
        }

        // 7. Commit
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            order_id = %order.id,
            total = %total_amount,
            "🧾 Pedido criado"
        );

        order.items = items;
        Ok(order)
    }

    /// Cliente vê só os próprios pedidos; admin vê todos da loja.
    pub async fn get_orders(
        &self,
        principal: &Principal,
        page: PageParams,
    ) -> Result<Paginated<Order>, AppError> {
        let owner = if principal.is_admin() { None } else { Some(principal.user_id) };

        let (orders, total) = self
            .order_repo
            .list(principal.tenant_id, owner, page.limit() as i64, page.offset())
            .await?;

        Ok(Paginated::new(orders, page, total))
    }

    pub async fn get_order_by_id(
        &self,
        principal: &Principal,
        order_id: Uuid,
    ) -> Result<Order, AppError> {
        let order = self
            .order_repo
            .find_by_id(principal.tenant_id, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Pedido não encontrado."))?;

        if !principal.is_admin() && order.user_id != principal.user_id {
            return Err(AppError::forbidden("Você não tem acesso a este pedido."));
        }
        Ok(order)
    }

    pub async fn update_order_status(
        &self,
        tenant_id: Uuid,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .order_repo
            .lock_order(&mut *tx, tenant_id, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Pedido não encontrado."))?;

        if !current.status.can_transition_to(new_status) {
            return Err(AppError::validation(format!(
                "Transição de status inválida: {} -> {}.",
                current.status.as_str(),
                new_status.as_str()
            )));
        }

        let updated = self
            .order_repo
            .update_status(&mut *tx, tenant_id, order_id, new_status)
            .await?;

        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            order_id = %order_id,
            from = current.status.as_str(),
            to = new_status.as_str(),
            "Status do pedido alterado"
        );

        let mut with_items = self.order_repo.attach_items(tenant_id, vec![updated]).await?;
        with_items
            .pop()
            .ok_or_else(|| anyhow::anyhow!("pedido {} sumiu após a atualização", order_id).into())
    }

    async fn clear_cart_in_savepoint(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        cart_id: Uuid,
    ) -> Result<u64, AppError> {
        let mut savepoint = sqlx::Connection::begin(&mut **tx).await?;
        let removed = self.cart_repo.clear(&mut *savepoint, cart_id).await?;
        savepoint.commit().await?;
        Ok(removed)
    }
}

/// Linha do carrinho só é comprável se o produto segue ativo e com estoque.
fn check_line(line: &CartLine, product: Option<&Product>) -> Result<(), AppError> {
    match product {
        Some(p) if p.is_active => {
            if p.stock < line.quantity {
                return Err(AppError::validation(format!(
                    "Estoque insuficiente para '{}'. Disponível: {}, solicitado: {}.",
                    p.name, p.stock, line.quantity
                )));
            }
            Ok(())
        }
        _ => Err(AppError::validation(format!(
            "O produto '{}' não está mais disponível.",
            line.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::models::product::ProductCategory;

    fn line(quantity: i32) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            name: "PlayStation 5".into(),
            price: Decimal::from(3999),
            unit_price_snapshot: None,
            quantity,
            stock: 0,
            is_active: true,
        }
    }

    fn product(stock: i32, is_active: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "PlayStation 5".into(),
            description: None,
            category: ProductCategory::Consoles,
            brand: None,
            sku: None,
            image_url: None,
            price: Decimal::from(3999),
            stock,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn line_within_stock_passes() {
        assert!(check_line(&line(3), Some(&product(3, true))).is_ok());
    }

    #[test]
    fn line_over_stock_names_the_product() {
        let err = check_line(&line(5), Some(&product(3, true))).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("PlayStation 5"));
                assert!(msg.contains("Disponível: 3"));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn inactive_or_missing_product_is_rejected() {
        assert!(matches!(
            check_line(&line(1), Some(&product(10, false))),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(check_line(&line(1), None), Err(AppError::Validation(_))));
    }
}
