// src/models/tenancy.rs

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::auth::User;

// ---
// 1. Tenant (A "Loja")
// ---
// Partição isolada: todo Produto, Carrinho e Pedido pertence a exatamente um tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub domain: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Como o cliente identifica o tenant no cabeçalho X-Tenant-ID
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantIdentifier {
    Id(Uuid),
    Slug(String),
}

impl TenantIdentifier {
    /// UUID válido vira `Id`, qualquer outro texto vira `Slug`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match Uuid::parse_str(raw) {
            Ok(id) => Some(Self::Id(id)),
            Err(_) => Some(Self::Slug(raw.to_lowercase())),
        }
    }
}

// ---
// 3. Payload de criação
// ---
pub(crate) fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !well_formed {
        let mut err = ValidationError::new("slug");
        err.message = Some("O slug deve conter apenas letras minúsculas, números e hífens.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantPayload {
    #[validate(length(min = 1, max = 120, message = "O nome da loja é obrigatório."))]
    pub name: String,

    #[validate(
        length(min = 2, max = 63, message = "O slug deve ter entre 2 e 63 caracteres."),
        custom(function = "validate_slug")
    )]
    pub slug: String,

    pub domain: Option<String>,

    #[validate(length(min = 1, message = "O nome do administrador não pode ser vazio."))]
    pub admin_name: Option<String>,

    #[validate(email(message = "O e-mail do administrador é inválido."))]
    pub admin_email: Option<String>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub admin_password: Option<String>,
}

/// Dados do admin inicial, quando o payload os traz.
#[derive(Debug, Clone)]
pub struct AdminInfo {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl CreateTenantPayload {
    /// E-mail e senha do admin vêm juntos ou não vêm.
    pub fn admin_info(&self) -> Result<Option<AdminInfo>, ValidationError> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Ok(Some(AdminInfo {
                name: self
                    .admin_name
                    .clone()
                    .unwrap_or_else(|| "Administrador".to_string()),
                email: email.trim().to_lowercase(),
                password: password.clone(),
            })),
            (None, None) => Ok(None),
            _ => {
                let mut err = ValidationError::new("admin");
                err.message =
                    Some("adminEmail e adminPassword devem ser informados juntos.".into());
                Err(err)
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TenantCreated {
    pub tenant: Tenant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(slug: &str) -> CreateTenantPayload {
        CreateTenantPayload {
            name: "Loja Gamer".into(),
            slug: slug.into(),
            domain: None,
            admin_name: None,
            admin_email: None,
            admin_password: None,
        }
    }

    #[test]
    fn identifier_accepts_uuid_or_slug() {
        let id = Uuid::new_v4();
        assert_eq!(TenantIdentifier::parse(&id.to_string()), Some(TenantIdentifier::Id(id)));
        assert_eq!(
            TenantIdentifier::parse(" Loja-Centro "),
            Some(TenantIdentifier::Slug("loja-centro".into()))
        );
        assert_eq!(TenantIdentifier::parse("   "), None);
    }

    #[test]
    fn slug_rules() {
        assert!(payload("loja-gamer-2").validate().is_ok());
        assert!(payload("Loja").validate().is_err());
        assert!(payload("-loja").validate().is_err());
        assert!(payload("loja gamer").validate().is_err());
    }

    #[test]
    fn admin_fields_are_all_or_nothing() {
        let mut p = payload("loja");
        assert!(p.admin_info().unwrap().is_none());

        p.admin_email = Some("Admin@Loja.com".into());
        assert!(p.admin_info().is_err());

        p.admin_password = Some("segredo123".into());
        let admin = p.admin_info().unwrap().unwrap();
        assert_eq!(admin.email, "admin@loja.com");
        assert_eq!(admin.name, "Administrador");
    }
}
