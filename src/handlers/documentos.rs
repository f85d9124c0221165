// src/handlers/documentos.rs
//
// Emisión de los documentos oficiales en PDF. El slug de la URL
// ("alineamiento", "licencia", "habitabilidad") se traduce al tipo;
// el guard de emisión corre en el servicio.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::{common::error::AppError, config::AppState, models::alerta::TipoDocumento};

// GET /api/obras/{id}/documentos/{tipo}
#[utoipa::path(
    get,
    path = "/api/obras/{id}/documentos/{tipo}",
    tag = "Documentos",
    responses(
        (status = 200, description = "PDF del documento", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "La obra o el tipo de documento no existen"),
        (status = 409, description = "El documento no está disponible o tiene una alerta vigente")
    ),
    params(
        ("id" = i64, Path, description = "ID de la obra"),
        ("tipo" = String, Path, description = "alineamiento | licencia | habitabilidad")
    ),
    security(("api_jwt" = []))
)]
pub async fn generar_documento(
    State(app_state): State<AppState>,
    Path((id, slug)): Path<(i64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tipo = TipoDocumento::from_slug(&slug)
        .ok_or(AppError::RegistroNoEncontrado("Tipo de documento"))?;

    let pdf = app_state.documento_service.generar_pdf(id, tipo).await?;

    let nombre_archivo = format!("obra-{}-{}.pdf", id, slug);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", nombre_archivo),
            ),
        ],
        pdf,
    ))
}
