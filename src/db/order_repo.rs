// src/db/order_repo.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::order::{Order, OrderItem, OrderStatus, PaymentMethod, ShippingAddress},
};

// Linha de order_items com a chave do pedido, para agrupar em lote.
#[derive(FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    name: String,
    unit_price: Decimal,
    quantity: i32,
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ESCRITA (sempre dentro da transação do serviço)
    // =========================================================================

    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        total_amount: Decimal,
        payment_method: PaymentMethod,
        shipping_address: &ShippingAddress,
        notes: Option<&str>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (tenant_id, user_id, total_amount, status, payment_method, shipping_address, notes)
            VALUES ($1, $2, $3, 'pending', $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(user_id)
            .bind(total_amount)
            .bind(payment_method)
            .bind(Json(shipping_address))
            .bind(notes)
            .fetch_one(executor)
            .await?;
        Ok(order)
    }

    /// Inserção em massa do snapshot usando UNNEST; `position` preserva a ordem do carrinho.
    pub async fn insert_items<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        order_id: Uuid,
        items: &[OrderItem],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let positions: Vec<i32> = (0..items.len() as i32).collect();
        let names: Vec<String> = items.iter().map(|i| i.name.clone()).collect();
        let prices: Vec<Decimal> = items.iter().map(|i| i.unit_price).collect();
        let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();

        sqlx::query(
            r#"
            INSERT INTO order_items (tenant_id, order_id, product_id, position, name, unit_price, quantity)
            SELECT $1, $2, t.product_id, t.position, t.name, t.unit_price, t.quantity
            FROM UNNEST($3::uuid[], $4::int4[], $5::text[], $6::numeric[], $7::int4[])
                AS t(product_id, position, name, unit_price, quantity)
            "#,
        )
            .bind(tenant_id)
            .bind(order_id)
            .bind(product_ids)
            .bind(positions)
            .bind(names)
            .bind(prices)
            .bind(quantities)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Trava o pedido para a mudança de status.
    pub async fn lock_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
            .bind(tenant_id)
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(order_id)
            .bind(status)
            .fetch_one(executor)
            .await?;
        Ok(order)
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn find_by_id(&self, tenant_id: Uuid, order_id: Uuid) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        match order {
            Some(order) => Ok(self.attach_items(tenant_id, vec![order]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Lista paginada, mais recentes primeiro. `user_id = None` lista o tenant inteiro.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Order>, i64), AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
            .bind(tenant_id)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE tenant_id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
        )
            .bind(tenant_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((self.attach_items(tenant_id, orders).await?, total))
    }

    /// Carrega os itens de vários pedidos numa única consulta.
    pub async fn attach_items(&self, tenant_id: Uuid, mut orders: Vec<Order>) -> Result<Vec<Order>, AppError> {
        if orders.is_empty() {
            return Ok(orders);
        }
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT order_id, product_id, name, unit_price, quantity
            FROM order_items
            WHERE tenant_id = $1 AND order_id = ANY($2)
            ORDER BY order_id, position ASC
            "#,
        )
            .bind(tenant_id)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            by_order.entry(row.order_id).or_default().push(OrderItem {
                product_id: row.product_id,
                name: row.name,
                unit_price: row.unit_price,
                quantity: row.quantity,
            });
        }
        for order in orders.iter_mut() {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }
}
