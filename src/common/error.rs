use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
// Los rechazos de negocio (transiciones, candados de documento, paso bloqueado)
// llevan el mensaje en español tal cual lo muestra el cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("El correo ya existe")]
    EmailYaExiste,

    #[error("Credenciales inválidas")]
    CredencialesInvalidas,

    #[error("Token inválido")]
    TokenInvalido,

    #[error("Acceso denegado: {0}")]
    AccesoDenegado(String),

    #[error("Obra no encontrada")]
    ObraNoEncontrada,

    #[error("{0} no encontrado")]
    RegistroNoEncontrado(&'static str),

    // Rechazo del ciclo de vida: el estado actual se preserva, sin cambio parcial.
    #[error("Transición rechazada: {0}")]
    TransicionRechazada(String),

    // Gate de pasos del expediente, ahora verificado del lado del servidor.
    #[error("Paso bloqueado: {0}")]
    PasoBloqueado(String),

    // Alerta administrativa vigente para (obra, tipo de documento).
    #[error("Documento bloqueado: {0}")]
    DocumentoBloqueado(String),

    // UNIQUE (obra_id, tipo_documento): una alerta por documento y obra.
    #[error("La alerta ya existe")]
    AlertaYaExiste,

    #[error("El documento aún no está disponible para esta obra")]
    DocumentoNoDisponible,

    #[error("Un concepto de nivel Abuelo no puede cobrarse directamente")]
    ConceptoNoCobrable,

    // Variante para errores de base de datos (sqlx)
    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para cualquier otro error inesperado.
    // `anyhow::Error` es ideal para capturar el contexto del error.
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Fuente no encontrada: {0}")]
    FontNotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolvemos todos los detalles de la validación, campo por campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::EmailYaExiste => {
                (StatusCode::CONFLICT, "Este correo ya está en uso.".to_string())
            }
            AppError::CredencialesInvalidas => (
                StatusCode::UNAUTHORIZED,
                "Correo o contraseña inválidos.".to_string(),
            ),
            AppError::TokenInvalido => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticación inválido o ausente.".to_string(),
            ),
            AppError::AccesoDenegado(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ObraNoEncontrada => {
                (StatusCode::NOT_FOUND, "Obra no encontrada.".to_string())
            }
            AppError::RegistroNoEncontrado(que) => {
                (StatusCode::NOT_FOUND, format!("{} no encontrado.", que))
            }

            // Rechazos de negocio: el cliente muestra el mensaje tal cual.
            AppError::TransicionRechazada(msg)
            | AppError::PasoBloqueado(msg)
            | AppError::DocumentoBloqueado(msg) => (StatusCode::CONFLICT, msg),
            AppError::AlertaYaExiste => (
                StatusCode::CONFLICT,
                "La obra ya tiene una alerta para ese tipo de documento.".to_string(),
            ),
            AppError::DocumentoNoDisponible => (
                StatusCode::CONFLICT,
                "El documento aún no está disponible para esta obra.".to_string(),
            ),
            AppError::ConceptoNoCobrable => (
                StatusCode::CONFLICT,
                "Un concepto de nivel Abuelo no puede cobrarse directamente.".to_string(),
            ),

            // Todo lo demás (DatabaseError, InternalServerError...) es un 500.
            // `tracing` registra el detalle que `thiserror` nos da.
            ref e => {
                tracing::error!("Error interno del servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.".to_string(),
                )
            }
        };

        // Respuesta estándar para errores que solo llevan un mensaje.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn la_alerta_duplicada_responde_409() {
        let respuesta = AppError::AlertaYaExiste.into_response();
        assert_eq!(respuesta.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn los_rechazos_de_negocio_responden_409() {
        let respuesta =
            AppError::TransicionRechazada("La obra tiene alertas vigentes.".to_string())
                .into_response();
        assert_eq!(respuesta.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn la_obra_inexistente_responde_404() {
        let respuesta = AppError::ObraNoEncontrada.into_response();
        assert_eq!(respuesta.status(), StatusCode::NOT_FOUND);
    }
}
