// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

// Códigos SQLSTATE do Postgres que indicam falha temporária (o cliente pode repetir)
const PG_QUERY_CANCELED: &str = "57014";
const PG_SERIALIZATION_FAILURE: &str = "40001";
const PG_DEADLOCK_DETECTED: &str = "40P01";

// Nosso tipo de erro: uma enum fechada, traduzida para HTTP num único lugar.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    // Regra de negócio violada (estoque insuficiente, transição inválida, carrinho vazio...)
    #[error("{0}")]
    Validation(String),

    // Payload rejeitado pelo `validator`
    #[error("Erro de validação")]
    InvalidInput(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Status HTTP e o "tipo" exposto no envelope.
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
            AppError::Validation(_) | AppError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, "ValidationError")
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            AppError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "ServiceUnavailable"),
            AppError::DatabaseError(e) if is_retryable(e) => {
                (StatusCode::SERVICE_UNAVAILABLE, "ServiceUnavailable")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        }
    }
}

/// Timeout de statement, pool esgotado, conflito de serialização ou deadlock.
fn is_retryable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some(PG_QUERY_CANCELED) | Some(PG_SERIALIZATION_FAILURE) | Some(PG_DEADLOCK_DETECTED)
        ),
        _ => false,
    }
}

// Achata erros aninhados: `shippingAddress.street`, `items[0].quantity`...
fn collect_field_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<Value>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for e in field_errors {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    out.push(json!({ "field": path, "message": message }));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();

        let body = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::InvalidInput(errors) => {
                let mut details = Vec::new();
                collect_field_errors(errors, "", &mut details);
                json!({
                    "success": false,
                    "message": "Um ou mais campos são inválidos.",
                    "error": kind,
                    "errors": details,
                })
            }
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::ServiceUnavailable(msg) => {
                json!({ "success": false, "message": msg, "error": kind })
            }
            e if status == StatusCode::SERVICE_UNAVAILABLE => {
                tracing::warn!("Falha temporária de armazenamento: {}", e);
                json!({
                    "success": false,
                    "message": "Serviço temporariamente indisponível. Tente novamente.",
                    "error": kind,
                })
            }
            // Todos os outros erros viram 500. O detalhe vai para o log, nunca para o cliente.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                json!({
                    "success": false,
                    "message": "Ocorreu um erro inesperado.",
                    "error": kind,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn domain_errors_map_to_their_status() {
        let cases = [
            (AppError::not_found("x"), StatusCode::NOT_FOUND),
            (AppError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (AppError::forbidden("x"), StatusCode::FORBIDDEN),
            (AppError::validation("x"), StatusCode::BAD_REQUEST),
            (AppError::conflict("x"), StatusCode::CONFLICT),
            (AppError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_and_kind().0, status);
        }
    }

    #[test]
    fn pool_timeout_is_retryable() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_and_kind().0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unexpected_errors_do_not_leak_details() {
        let err = AppError::from(anyhow::anyhow!("connection string postgres://secret"));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "InternalError");
        assert!(!body["message"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn validation_envelope_carries_message() {
        let res = AppError::validation("Estoque insuficiente").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = body_json(res).await;
        assert_eq!(body["error"], "ValidationError");
        assert_eq!(body["message"], "Estoque insuficiente");
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(range(min = 1, message = "quantidade mínima é 1"))]
        quantity: i32,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(nested)]
        inner: Probe,
    }

    #[tokio::test]
    async fn nested_errors_carry_their_path() {
        let errors = Outer { inner: Probe { quantity: 0 } }.validate().unwrap_err();
        let body = body_json(AppError::from(errors).into_response()).await;
        assert_eq!(body["errors"][0]["field"], "inner.quantity");
    }

    #[tokio::test]
    async fn invalid_input_lists_fields() {
        let errors = Probe { quantity: 0 }.validate().unwrap_err();
        let res = AppError::from(errors).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = body_json(res).await;
        assert_eq!(body["errors"][0]["field"], "quantity");
        assert_eq!(body["errors"][0]["message"], "quantidade mínima é 1");
    }
}
