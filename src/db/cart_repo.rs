// src/db/cart_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::cart::{CartLine, CartRow},
};

#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Devolve o carrinho do usuário, criando-o na primeira vez.
    /// O `DO UPDATE` sem efeito garante que a linha sempre volta no RETURNING,
    /// mesmo quando outra requisição acabou de criá-la.
    pub async fn get_or_create(&self, tenant_id: Uuid, user_id: Uuid) -> Result<CartRow, AppError> {
        let cart = sqlx::query_as::<_, CartRow>(
            r#"
            INSERT INTO carts (tenant_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (tenant_id, user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(cart)
    }

    /// Trava o carrinho até o fim da transação. Checkout e toda alteração de linha
    /// passam por aqui, então operações no mesmo carrinho ficam em fila.
    pub async fn lock_cart<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CartRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cart = sqlx::query_as::<_, CartRow>(
            "SELECT * FROM carts WHERE tenant_id = $1 AND user_id = $2 FOR UPDATE",
        )
            .bind(tenant_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(cart)
    }

    /// Linhas do carrinho com os dados atuais do produto, em ordem de inserção.
    pub async fn list_lines<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        cart_id: Uuid,
    ) -> Result<Vec<CartLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT ci.product_id, p.name, p.price, ci.unit_price_snapshot, ci.quantity, p.stock, p.is_active
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            JOIN products p ON p.id = ci.product_id
            WHERE c.tenant_id = $1 AND c.id = $2 AND p.tenant_id = $1
            ORDER BY ci.line_no ASC
            "#,
        )
            .bind(tenant_id)
            .bind(cart_id)
            .fetch_all(executor)
            .await?;
        Ok(lines)
    }

    /// Adiciona ou soma a quantidade numa única instrução.
    /// O teto de estoque é conferido contra o NOVO total, dentro do mesmo statement.
    /// `None` = o total passaria do estoque (ou o produto saiu de linha).
    pub async fn upsert_line<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let new_quantity = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity, unit_price_snapshot)
            SELECT $2, p.id, $4, p.price
            FROM products p
            WHERE p.tenant_id = $1 AND p.id = $3 AND p.is_active AND p.stock >= $4
            ON CONFLICT (cart_id, product_id) DO UPDATE
            SET quantity = cart_items.quantity + EXCLUDED.quantity,
                unit_price_snapshot = EXCLUDED.unit_price_snapshot,
                updated_at = NOW()
            WHERE cart_items.quantity + EXCLUDED.quantity <= (
                SELECT p2.stock FROM products p2 WHERE p2.id = EXCLUDED.product_id AND p2.is_active
            )
            RETURNING quantity
            "#,
        )
            .bind(tenant_id)
            .bind(cart_id)
            .bind(product_id)
            .bind(quantity)
            .fetch_optional(executor)
            .await?;
        Ok(new_quantity)
    }

    /// Substitui a quantidade de uma linha existente. `None` = linha inexistente.
    pub async fn set_line_quantity<'e, E>(
        &self,
        executor: E,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let new_quantity = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE cart_items
            SET quantity = $3, updated_at = NOW()
            WHERE cart_id = $1 AND product_id = $2
            RETURNING quantity
            "#,
        )
            .bind(cart_id)
            .bind(product_id)
            .bind(quantity)
            .fetch_optional(executor)
            .await?;
        Ok(new_quantity)
    }

    /// Remove uma linha. `false` = não havia linha para esse produto.
    pub async fn delete_line<'e, E>(
        &self,
        executor: E,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Esvazia o carrinho (a linha de `carts` permanece).
    pub async fn clear<'e, E>(&self, executor: E, cart_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn touch<'e, E>(&self, executor: E, cart_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
