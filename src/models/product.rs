// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Consoles,
    VideoGames,
    Accessories,
    BoardGames,
    Misc,
}

// O catálogo. `stock` é o único campo disputado entre usuários.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: ProductCategory,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    pub category: ProductCategory,

    pub brand: Option<String>,

    #[validate(length(min = 1, message = "O SKU não pode ser vazio."))]
    pub sku: Option<String>,

    pub image_url: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    #[serde(default)]
    pub stock: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, max = 200, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
}
