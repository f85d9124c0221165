// src/handlers/catalogos.rs
//
// Colonias, directores de obra y trámites. CRUD sencillo:
// lectura para cualquier usuario autenticado, mutación solo ADMIN.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequiereRol, RolAdmin},
    models::{
        catalogo::{Colonia, DirectorObra, Tramite},
        concepto::TramiteConcepto,
    },
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColoniaPayload {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub nombre: String,
    pub codigo_postal: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectorPayload {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub nombre: String,
    #[validate(length(min = 1, message = "El número de registro es obligatorio."))]
    pub numero_registro: String,
    pub vigencia: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TramitePayload {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub nombre: String,
    // Una sola letra; forma el consecutivo "{letra}-{id}".
    #[validate(length(equal = 1, message = "La letra debe ser un solo carácter."))]
    #[schema(example = "L")]
    pub letra: String,
}

// ---
// Colonias
// ---

// GET /api/catalogos/colonias
#[utoipa::path(
    get,
    path = "/api/catalogos/colonias",
    tag = "Catálogos",
    responses((status = 200, description = "Colonias", body = [Colonia])),
    security(("api_jwt" = []))
)]
pub async fn listar_colonias(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Colonia>>, AppError> {
    Ok(Json(app_state.catalogo_repo.listar_colonias().await?))
}

// POST /api/catalogos/colonias
#[utoipa::path(
    post,
    path = "/api/catalogos/colonias",
    tag = "Catálogos",
    request_body = ColoniaPayload,
    responses((status = 201, description = "Colonia creada", body = Colonia)),
    security(("api_jwt" = []))
)]
pub async fn crear_colonia(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Json(payload): Json<ColoniaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let colonia = app_state
        .catalogo_repo
        .crear_colonia(&payload.nombre, payload.codigo_postal.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(colonia)))
}

// PUT /api/catalogos/colonias/{id}
#[utoipa::path(
    put,
    path = "/api/catalogos/colonias/{id}",
    tag = "Catálogos",
    request_body = ColoniaPayload,
    responses((status = 200, description = "Colonia actualizada", body = Colonia)),
    params(("id" = i64, Path, description = "ID de la colonia")),
    security(("api_jwt" = []))
)]
pub async fn actualizar_colonia(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Path(id): Path<i64>,
    Json(payload): Json<ColoniaPayload>,
) -> Result<Json<Colonia>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let colonia = app_state
        .catalogo_repo
        .actualizar_colonia(id, &payload.nombre, payload.codigo_postal.as_deref())
        .await?
        .ok_or(AppError::RegistroNoEncontrado("Colonia"))?;
    Ok(Json(colonia))
}

// DELETE /api/catalogos/colonias/{id}
#[utoipa::path(
    delete,
    path = "/api/catalogos/colonias/{id}",
    tag = "Catálogos",
    responses((status = 204, description = "Colonia eliminada")),
    params(("id" = i64, Path, description = "ID de la colonia")),
    security(("api_jwt" = []))
)]
pub async fn eliminar_colonia(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !app_state.catalogo_repo.eliminar_colonia(id).await? {
        return Err(AppError::RegistroNoEncontrado("Colonia"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Directores de obra
// ---

// GET /api/catalogos/directores
#[utoipa::path(
    get,
    path = "/api/catalogos/directores",
    tag = "Catálogos",
    responses((status = 200, description = "Directores de obra", body = [DirectorObra])),
    security(("api_jwt" = []))
)]
pub async fn listar_directores(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<DirectorObra>>, AppError> {
    Ok(Json(app_state.catalogo_repo.listar_directores().await?))
}

// POST /api/catalogos/directores
#[utoipa::path(
    post,
    path = "/api/catalogos/directores",
    tag = "Catálogos",
    request_body = DirectorPayload,
    responses((status = 201, description = "Director registrado", body = DirectorObra)),
    security(("api_jwt" = []))
)]
pub async fn crear_director(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Json(payload): Json<DirectorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let director = app_state
        .catalogo_repo
        .crear_director(&payload.nombre, &payload.numero_registro, payload.vigencia)
        .await?;
    Ok((StatusCode::CREATED, Json(director)))
}

// PUT /api/catalogos/directores/{id}
#[utoipa::path(
    put,
    path = "/api/catalogos/directores/{id}",
    tag = "Catálogos",
    request_body = DirectorPayload,
    responses((status = 200, description = "Director actualizado", body = DirectorObra)),
    params(("id" = i64, Path, description = "ID del director")),
    security(("api_jwt" = []))
)]
pub async fn actualizar_director(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Path(id): Path<i64>,
    Json(payload): Json<DirectorPayload>,
) -> Result<Json<DirectorObra>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let director = app_state
        .catalogo_repo
        .actualizar_director(id, &payload.nombre, &payload.numero_registro, payload.vigencia)
        .await?
        .ok_or(AppError::RegistroNoEncontrado("Director de obra"))?;
    Ok(Json(director))
}

// DELETE /api/catalogos/directores/{id}
#[utoipa::path(
    delete,
    path = "/api/catalogos/directores/{id}",
    tag = "Catálogos",
    responses((status = 204, description = "Director eliminado")),
    params(("id" = i64, Path, description = "ID del director")),
    security(("api_jwt" = []))
)]
pub async fn eliminar_director(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !app_state.catalogo_repo.eliminar_director(id).await? {
        return Err(AppError::RegistroNoEncontrado("Director de obra"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Trámites
// ---

// GET /api/catalogos/tramites
#[utoipa::path(
    get,
    path = "/api/catalogos/tramites",
    tag = "Catálogos",
    responses((status = 200, description = "Trámites", body = [Tramite])),
    security(("api_jwt" = []))
)]
pub async fn listar_tramites(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Tramite>>, AppError> {
    Ok(Json(app_state.catalogo_repo.listar_tramites().await?))
}

// POST /api/catalogos/tramites
#[utoipa::path(
    post,
    path = "/api/catalogos/tramites",
    tag = "Catálogos",
    request_body = TramitePayload,
    responses((status = 201, description = "Trámite creado", body = Tramite)),
    security(("api_jwt" = []))
)]
pub async fn crear_tramite(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Json(payload): Json<TramitePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let tramite = app_state
        .catalogo_repo
        .crear_tramite(&payload.nombre, &payload.letra)
        .await?;
    Ok((StatusCode::CREATED, Json(tramite)))
}

// PUT /api/catalogos/tramites/{id}
#[utoipa::path(
    put,
    path = "/api/catalogos/tramites/{id}",
    tag = "Catálogos",
    request_body = TramitePayload,
    responses((status = 200, description = "Trámite actualizado", body = Tramite)),
    params(("id" = i64, Path, description = "ID del trámite")),
    security(("api_jwt" = []))
)]
pub async fn actualizar_tramite(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Path(id): Path<i64>,
    Json(payload): Json<TramitePayload>,
) -> Result<Json<Tramite>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let tramite = app_state
        .catalogo_repo
        .actualizar_tramite(id, &payload.nombre, &payload.letra)
        .await?
        .ok_or(AppError::RegistroNoEncontrado("Trámite"))?;
    Ok(Json(tramite))
}

// DELETE /api/catalogos/tramites/{id}
#[utoipa::path(
    delete,
    path = "/api/catalogos/tramites/{id}",
    tag = "Catálogos",
    responses((status = 204, description = "Trámite eliminado")),
    params(("id" = i64, Path, description = "ID del trámite")),
    security(("api_jwt" = []))
)]
pub async fn eliminar_tramite(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !app_state.catalogo_repo.eliminar_tramite(id).await? {
        return Err(AppError::RegistroNoEncontrado("Trámite"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/catalogos/tramites/{id}/conceptos
#[utoipa::path(
    get,
    path = "/api/catalogos/tramites/{id}/conceptos",
    tag = "Catálogos",
    responses(
        (status = 200, description = "Conceptos semilla del trámite", body = [TramiteConcepto])
    ),
    params(("id" = i64, Path, description = "ID del trámite")),
    security(("api_jwt" = []))
)]
pub async fn conceptos_de_tramite(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<TramiteConcepto>>, AppError> {
    let semillas = app_state.concepto_service.conceptos_de_tramite(id).await?;
    Ok(Json(semillas))
}
