// src/handlers/obras.rs
//
// El expediente completo: captura (paso 1), trámite/consecutivo,
// verificación y pago (paso 3), transiciones de estado, pasos habilitados
// y lugares recibidos.

use axum::{
    extract::{Path, Query, State},
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
    middleware::rbac::{RequiereRol, RolSupervisor},
    models::obra::{
        EstadoObra, LugaresRecibidos, Obra, ObraCalle, ObraDatosPayload, PaginaObras, SiNo,
        VerificacionPayload,
    },
    services::lifecycle::PasosHabilitados,
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AsignarTramitePayload {
    #[schema(example = 3)]
    pub tramite_id: i64,
}

// El destino viene del cliente pero la regla de transición corre completa
// en el servidor; este payload es solo la intención.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CambioEstadoPayload {
    #[schema(example = "Enviado a Firmas")]
    pub estado: EstadoObra,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LugaresPayload {
    pub secretaria: SiNo,
    pub presidencia: SiNo,
    pub padron: SiNo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListadoQuery {
    pub propietario: Option<String>,
    pub estado: Option<EstadoObra>,
    pub colonia_id: Option<i64>,
    pub pagina: Option<i64>,
    pub por_pagina: Option<i64>,
}

// ---
// Paso 1: captura
// ---

// POST /api/obras
#[utoipa::path(
    post,
    path = "/api/obras",
    tag = "Obras",
    request_body = ObraDatosPayload,
    responses(
        (status = 201, description = "Expediente creado en 'En Proceso'", body = Obra)
    ),
    security(("api_jwt" = []))
)]
pub async fn crear_obra(
    State(app_state): State<AppState>,
    Json(payload): Json<ObraDatosPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let obra = app_state.obra_service.crear_obra(&payload).await?;
    Ok((StatusCode::CREATED, Json(obra)))
}

// PUT /api/obras/{id}
#[utoipa::path(
    put,
    path = "/api/obras/{id}",
    tag = "Obras",
    request_body = ObraDatosPayload,
    responses(
        (status = 200, description = "Datos de captura actualizados", body = Obra),
        (status = 404, description = "La obra no existe")
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn actualizar_obra(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ObraDatosPayload>,
) -> Result<Json<Obra>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let obra = app_state.obra_service.actualizar_obra(id, &payload).await?;
    Ok(Json(obra))
}

// GET /api/obras/{id}
#[utoipa::path(
    get,
    path = "/api/obras/{id}",
    tag = "Obras",
    responses(
        (status = 200, description = "Expediente", body = Obra),
        (status = 404, description = "La obra no existe")
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn get_obra(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Obra>, AppError> {
    let obra = app_state.obra_service.get_obra(id).await?;
    Ok(Json(obra))
}

// GET /api/obras/{id}/calles
#[utoipa::path(
    get,
    path = "/api/obras/{id}/calles",
    tag = "Obras",
    responses(
        (status = 200, description = "Calles y números oficiales", body = [ObraCalle])
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn get_calles(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ObraCalle>>, AppError> {
    // 404 explícito si el expediente no existe
    app_state.obra_service.get_obra(id).await?;
    let calles = app_state.obra_service.get_calles(id).await?;
    Ok(Json(calles))
}

// GET /api/obras
#[utoipa::path(
    get,
    path = "/api/obras",
    tag = "Obras",
    responses(
        (status = 200, description = "Listado paginado y filtrado", body = PaginaObras)
    ),
    params(
        ("propietario" = Option<String>, Query, description = "Filtro por nombre del propietario (subcadena)"),
        ("estado" = Option<String>, Query, description = "Filtro por estado de la obra"),
        ("coloniaId" = Option<i64>, Query, description = "Filtro por colonia"),
        ("pagina" = Option<i64>, Query, description = "Página (desde 1)"),
        ("porPagina" = Option<i64>, Query, description = "Tamaño de página (máx. 100)")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_obras(
    State(app_state): State<AppState>,
    Query(q): Query<ListadoQuery>,
) -> Result<Json<PaginaObras>, AppError> {
    let pagina = app_state
        .obra_service
        .listar(
            q.propietario.as_deref(),
            q.estado,
            q.colonia_id,
            q.pagina.unwrap_or(1),
            q.por_pagina.unwrap_or(20),
        )
        .await?;
    Ok(Json(pagina))
}

// ---
// Trámite y consecutivo
// ---

// PUT /api/obras/{id}/tramite
#[utoipa::path(
    put,
    path = "/api/obras/{id}/tramite",
    tag = "Obras",
    request_body = AsignarTramitePayload,
    responses(
        (status = 200, description = "Trámite asignado; consecutivo y siembra aplicados", body = Obra),
        (status = 404, description = "La obra o el trámite no existen")
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn asignar_tramite(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AsignarTramitePayload>,
) -> Result<Json<Obra>, AppError> {
    let obra = app_state
        .obra_service
        .asignar_tramite(id, payload.tramite_id)
        .await?;
    Ok(Json(obra))
}

// ---
// Paso 3: verificación y pago
// ---

// PUT /api/obras/{id}/verificacion
#[utoipa::path(
    put,
    path = "/api/obras/{id}/verificacion",
    tag = "Obras",
    request_body = VerificacionPayload,
    responses(
        (status = 200, description = "Verificación guardada; estados recalculados", body = Obra),
        (status = 409, description = "El paso 2 no está completo")
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn guardar_verificacion(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<VerificacionPayload>,
) -> Result<Json<Obra>, AppError> {
    let obra = app_state
        .obra_service
        .guardar_verificacion(id, &payload)
        .await?;
    Ok(Json(obra))
}

// ---
// Transiciones de estado
// ---

// PUT /api/obras/{id}/estado
#[utoipa::path(
    put,
    path = "/api/obras/{id}/estado",
    tag = "Obras",
    request_body = CambioEstadoPayload,
    responses(
        (status = 200, description = "Transición aplicada", body = Obra),
        (status = 403, description = "Se requiere rol SUPERVISOR"),
        (status = 409, description = "Transición rechazada por las reglas del expediente")
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn cambiar_estado(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolSupervisor>,
    Path(id): Path<i64>,
    Json(payload): Json<CambioEstadoPayload>,
) -> Result<Json<Obra>, AppError> {
    let obra = app_state
        .obra_service
        .cambiar_estado(id, payload.estado)
        .await?;
    Ok(Json(obra))
}

// GET /api/obras/{id}/destinos
#[utoipa::path(
    get,
    path = "/api/obras/{id}/destinos",
    tag = "Obras",
    responses(
        (status = 200, description = "Estados destino que el expediente ofrece", body = [EstadoObra])
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn destinos(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<EstadoObra>>, AppError> {
    let destinos = app_state.obra_service.destinos(id).await?;
    Ok(Json(destinos))
}

// ---
// Gate de pasos
// ---

// GET /api/obras/{id}/pasos
#[utoipa::path(
    get,
    path = "/api/obras/{id}/pasos",
    tag = "Obras",
    responses(
        (status = 200, description = "Pasos del asistente habilitados", body = PasosHabilitados)
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn pasos(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PasosHabilitados>, AppError> {
    let pasos = app_state.obra_service.pasos(id).await?;
    Ok(Json(pasos))
}

// ---
// Lugares recibidos
// ---

// GET /api/obras/{id}/lugares
#[utoipa::path(
    get,
    path = "/api/obras/{id}/lugares-recibidos",
    tag = "Obras",
    responses(
        (status = 200, description = "Lugares que recibieron el expediente", body = LugaresRecibidos)
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn get_lugares(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LugaresRecibidos>, AppError> {
    let lugares = app_state.obra_service.get_lugares(id).await?;
    Ok(Json(lugares))
}

// PUT /api/obras/{id}/lugares
#[utoipa::path(
    put,
    path = "/api/obras/{id}/lugares-recibidos",
    tag = "Obras",
    request_body = LugaresPayload,
    responses(
        (status = 200, description = "Lugares actualizados", body = LugaresRecibidos)
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn actualizar_lugares(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LugaresPayload>,
) -> Result<Json<LugaresRecibidos>, AppError> {
    let lugares = app_state
        .obra_service
        .actualizar_lugares(id, payload.secretaria, payload.presidencia, payload.padron)
        .await?;
    Ok(Json(lugares))
}
