// src/models/cart.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// Cabeçalho do carrinho: exatamente um por (tenant, usuário).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Uma linha do carrinho já combinada com o produto atual (JOIN).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    #[serde(rename = "unitPrice")]
    pub price: Decimal,
    pub unit_price_snapshot: Option<Decimal>,
    pub quantity: i32,
    #[serde(skip)]
    pub stock: i32,
    #[serde(skip)]
    pub is_active: bool,
}

impl CartLine {
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartLineView>,
    pub total_items: i64,
    pub total_amount: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Monta a visão do carrinho; `lines` já vem em ordem de inserção.
    pub fn assemble(row: CartRow, lines: Vec<CartLine>) -> Self {
        let total_items: i64 = lines.iter().map(|l| l.quantity as i64).sum();
        let total_amount: Decimal = lines.iter().map(CartLine::subtotal).sum();
        let items = lines
            .into_iter()
            .map(|line| CartLineView {
                subtotal: line.subtotal(),
                line,
            })
            .collect();

        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            user_id: row.user_id,
            items,
            total_items,
            total_amount,
            updated_at: row.updated_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemPayload {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1."))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartItemPayload {
    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1. Use DELETE para remover o item."))]
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn line(price: &str, quantity: i32) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            name: "Produto".into(),
            price: Decimal::from_str(price).unwrap(),
            unit_price_snapshot: None,
            quantity,
            stock: 10,
            is_active: true,
        }
    }

    fn row() -> CartRow {
        CartRow {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn totals_follow_live_prices() {
        let cart = Cart::assemble(row(), vec![line("10.50", 2), line("3.00", 1)]);
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_amount, Decimal::from_str("24.00").unwrap());
        assert_eq!(cart.items[0].subtotal, Decimal::from_str("21.00").unwrap());
    }

    #[test]
    fn empty_cart_has_zero_totals() {
        let cart = Cart::assemble(row(), vec![]);
        assert!(cart.is_empty());
        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.total_amount, Decimal::ZERO);
    }

    #[test]
    fn line_serializes_live_price_as_unit_price() {
        let cart = Cart::assemble(row(), vec![line("5", 2)]);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["items"][0]["unitPrice"], 5.0);
        assert_eq!(json["items"][0]["subtotal"], 10.0);
        assert!(json["items"][0].get("stock").is_none());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(UpdateCartItemPayload { quantity: 0 }.validate().is_err());
        assert!(UpdateCartItemPayload { quantity: 1 }.validate().is_ok());
    }
}
