// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    /// pending -> paid -> shipped, e pending/paid -> cancelled.
    /// `shipped` e `cancelled` são terminais.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Cancelled) | (Paid, Shipped) | (Paid, Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Paypal,
    Cash,
    BankTransfer,
}

// --- Endereço (gravado como JSONB) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1, message = "Campo obrigatório."))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Campo obrigatório."))]
    pub street: String,
    #[validate(length(min = 1, message = "Campo obrigatório."))]
    pub city: String,
    #[validate(length(min = 1, message = "Campo obrigatório."))]
    pub state: String,
    #[validate(length(min = 1, message = "Campo obrigatório."))]
    pub zip_code: String,
    #[validate(length(min = 1, message = "Campo obrigatório."))]
    pub country: String,
    #[validate(length(min = 1, message = "Campo obrigatório."))]
    pub phone: String,
}

// --- Pedido ---

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[sqlx(json)]
    pub shipping_address: ShippingAddress,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Preenchido pelo repositório numa segunda consulta
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

// Snapshot congelado no checkout: não acompanha mudanças futuras do produto.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl OrderItem {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

pub fn order_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::subtotal).sum()
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub payment_method: PaymentMethod,

    #[validate(nested)]
    pub shipping_address: ShippingAddress,

    #[validate(length(max = 1000, message = "As observações devem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use super::OrderStatus::*;

    const ALL: [OrderStatus; 4] = [Pending, Paid, Shipped, Cancelled];

    #[test]
    fn only_documented_transitions_are_legal() {
        let legal = [(Pending, Paid), (Pending, Cancelled), (Paid, Shipped), (Paid, Cancelled)];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{} -> {}",
                    from.as_str(),
                    to.as_str()
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_exit() {
        for from in [Shipped, Cancelled] {
            assert!(ALL.iter().all(|to| !from.can_transition_to(*to)));
        }
        assert!(!Shipped.can_transition_to(Pending));
    }

    #[test]
    fn total_is_sum_of_lines() {
        let items = vec![
            OrderItem {
                product_id: Uuid::new_v4(),
                name: "Console".into(),
                unit_price: Decimal::from_str("1999.90").unwrap(),
                quantity: 2,
            },
            OrderItem {
                product_id: Uuid::new_v4(),
                name: "Jogo".into(),
                unit_price: Decimal::from_str("249.50").unwrap(),
                quantity: 1,
            },
        ];
        assert_eq!(order_total(&items), Decimal::from_str("4249.30").unwrap());
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn payload_requires_complete_address() {
        let json = serde_json::json!({
            "paymentMethod": "credit_card",
            "shippingAddress": {
                "fullName": "Ana Souza", "street": "", "city": "Recife", "state": "PE",
                "zipCode": "50000-000", "country": "BR", "phone": "+55 81 99999-0000"
            }
        });
        let payload: CreateOrderPayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.payment_method, PaymentMethod::CreditCard);
        assert!(payload.validate().is_err());
    }

    #[test]
    fn status_parses_lowercase() {
        let p: UpdateOrderStatusPayload = serde_json::from_str(r#"{"status":"shipped"}"#).unwrap();
        assert_eq!(p.status, Shipped);
        assert!(serde_json::from_str::<UpdateOrderStatusPayload>(r#"{"status":"lost"}"#).is_err());
    }
}
