// src/handlers/alertas.rs
//
// Candados administrativos sobre la emisión de documentos.
// Cualquier usuario autenticado las consulta; solo ADMIN las muta.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::UsuarioAutenticado,
        rbac::{RequiereRol, RolAdmin},
    },
    models::alerta::{Alerta, TipoDocumento},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrearAlertaPayload {
    #[schema(example = "Licencia de Construcción")]
    pub tipo_documento: TipoDocumento,
    #[validate(length(min = 1, message = "El mensaje es obligatorio."))]
    pub mensaje: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarAlertaPayload {
    #[validate(length(min = 1, message = "El mensaje es obligatorio."))]
    pub mensaje: String,
}

// ---
// Handlers
// ---

// GET /api/obras/{id}/alertas
#[utoipa::path(
    get,
    path = "/api/obras/{id}/alertas",
    tag = "Alertas",
    responses(
        (status = 200, description = "Alertas vigentes de la obra", body = [Alerta])
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn listar_alertas(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Alerta>>, AppError> {
    app_state.obra_service.get_obra(id).await?;
    let alertas = app_state.alerta_repo.listar_por_obra(id).await?;
    Ok(Json(alertas))
}

// POST /api/obras/{id}/alertas
#[utoipa::path(
    post,
    path = "/api/obras/{id}/alertas",
    tag = "Alertas",
    request_body = CrearAlertaPayload,
    responses(
        (status = 201, description = "Alerta creada", body = Alerta),
        (status = 403, description = "Se requiere rol ADMIN"),
        (status = 404, description = "La obra no existe")
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn crear_alerta(
    State(app_state): State<AppState>,
    UsuarioAutenticado(usuario): UsuarioAutenticado,
    _guard: RequiereRol<RolAdmin>,
    Path(id): Path<i64>,
    Json(payload): Json<CrearAlertaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // 404 antes que un error de llave foránea
    app_state.obra_service.get_obra(id).await?;

    let alerta = app_state
        .alerta_repo
        .crear(id, payload.tipo_documento, &payload.mensaje, usuario.id)
        .await?;

    tracing::info!(
        "🚨 Obra {}: alerta creada sobre \"{}\" por {}",
        id,
        payload.tipo_documento,
        usuario.email
    );
    Ok((StatusCode::CREATED, Json(alerta)))
}

// PUT /api/alertas/{id}
#[utoipa::path(
    put,
    path = "/api/alertas/{id}",
    tag = "Alertas",
    request_body = ActualizarAlertaPayload,
    responses(
        (status = 200, description = "Mensaje actualizado", body = Alerta),
        (status = 403, description = "Se requiere rol ADMIN"),
        (status = 404, description = "La alerta no existe")
    ),
    params(("id" = i64, Path, description = "ID de la alerta")),
    security(("api_jwt" = []))
)]
pub async fn actualizar_alerta(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Path(id): Path<i64>,
    Json(payload): Json<ActualizarAlertaPayload>,
) -> Result<Json<Alerta>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let alerta = app_state
        .alerta_repo
        .actualizar_mensaje(id, &payload.mensaje)
        .await?
        .ok_or(AppError::RegistroNoEncontrado("Alerta"))?;
    Ok(Json(alerta))
}

// DELETE /api/alertas/{id}
#[utoipa::path(
    delete,
    path = "/api/alertas/{id}",
    tag = "Alertas",
    responses(
        (status = 204, description = "Alerta retirada; el documento vuelve a emitirse"),
        (status = 403, description = "Se requiere rol ADMIN"),
        (status = 404, description = "La alerta no existe")
    ),
    params(("id" = i64, Path, description = "ID de la alerta")),
    security(("api_jwt" = []))
)]
pub async fn eliminar_alerta(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !app_state.alerta_repo.eliminar(id).await? {
        return Err(AppError::RegistroNoEncontrado("Alerta"));
    }
    Ok(StatusCode::NO_CONTENT)
}
