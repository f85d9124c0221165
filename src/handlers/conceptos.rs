// src/handlers/conceptos.rs
//
// Catálogo jerárquico de conceptos y ledger de conceptos por obra.
// Toda mutación del ledger regresa el total recalculado para que el
// cliente no tenga que sumar nada.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequiereRol, RolAdmin},
    models::concepto::{
        Concepto, ConceptoArbol, NivelConcepto, ObraConcepto, ObraConceptoDetalle,
    },
};

// ---
// Validación custom
// ---
fn validate_positivo(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("El valor debe ser mayor a cero.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrearConceptoPayload {
    pub parent_id: Option<i64>,
    #[schema(example = "Padre")]
    pub nivel: NivelConcepto,
    pub clave: Option<String>,
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub nombre: String,
    pub unidad: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineaPayload {
    pub concepto_id: i64,

    #[validate(custom(function = "validate_positivo"))]
    #[schema(example = 150.50)]
    pub costo_unitario: Decimal,

    #[validate(custom(function = "validate_positivo"))]
    #[schema(example = 2)]
    pub cantidad: Decimal,

    pub medicion: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HijosQuery {
    pub parent_id: Option<i64>,
}

// ---
// Respuestas
// ---

// La línea recién insertada más el total vigente del expediente.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineaCreada {
    pub linea: ObraConcepto,
    pub total_conceptos: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalConceptos {
    pub total_conceptos: Decimal,
}

// ---
// Catálogo
// ---

// GET /api/conceptos/arbol
#[utoipa::path(
    get,
    path = "/api/conceptos/arbol",
    tag = "Conceptos",
    responses(
        (status = 200, description = "Catálogo completo en forma de árbol", body = [ConceptoArbol])
    ),
    security(("api_jwt" = []))
)]
pub async fn arbol(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ConceptoArbol>>, AppError> {
    let arbol = app_state.concepto_service.arbol().await?;
    Ok(Json(arbol))
}

// GET /api/conceptos
#[utoipa::path(
    get,
    path = "/api/conceptos",
    tag = "Conceptos",
    responses(
        (status = 200, description = "Hijos directos del nodo (o raíces sin parentId)", body = [Concepto])
    ),
    params(
        ("parentId" = Option<i64>, Query, description = "Nodo padre; omitir para las raíces")
    ),
    security(("api_jwt" = []))
)]
pub async fn hijos(
    State(app_state): State<AppState>,
    Query(q): Query<HijosQuery>,
) -> Result<Json<Vec<Concepto>>, AppError> {
    let hijos = app_state.concepto_service.hijos(q.parent_id).await?;
    Ok(Json(hijos))
}

// POST /api/conceptos
#[utoipa::path(
    post,
    path = "/api/conceptos",
    tag = "Conceptos",
    request_body = CrearConceptoPayload,
    responses(
        (status = 201, description = "Concepto agregado al catálogo", body = Concepto),
        (status = 403, description = "Se requiere rol ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn crear_concepto(
    State(app_state): State<AppState>,
    _guard: RequiereRol<RolAdmin>,
    Json(payload): Json<CrearConceptoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let concepto = app_state
        .concepto_service
        .crear_concepto(
            payload.parent_id,
            payload.nivel,
            payload.clave.as_deref(),
            &payload.nombre,
            payload.unidad.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(concepto)))
}

// ---
// Ledger por obra
// ---

// GET /api/obras/{id}/conceptos
#[utoipa::path(
    get,
    path = "/api/obras/{id}/conceptos",
    tag = "Conceptos",
    responses(
        (status = 200, description = "Líneas del ledger con nombre y unidad", body = [ObraConceptoDetalle]),
        (status = 404, description = "La obra no existe")
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn listar_lineas(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ObraConceptoDetalle>>, AppError> {
    let lineas = app_state.concepto_service.listar_lineas(id).await?;
    Ok(Json(lineas))
}

// POST /api/obras/{id}/conceptos
#[utoipa::path(
    post,
    path = "/api/obras/{id}/conceptos",
    tag = "Conceptos",
    request_body = LineaPayload,
    responses(
        (status = 201, description = "Línea agregada; total recalculado", body = LineaCreada),
        (status = 409, description = "El concepto no es cobrable")
    ),
    params(("id" = i64, Path, description = "ID de la obra")),
    security(("api_jwt" = []))
)]
pub async fn agregar_linea(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LineaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (linea, total_conceptos) = app_state
        .concepto_service
        .agregar_linea(
            id,
            payload.concepto_id,
            payload.costo_unitario,
            payload.cantidad,
            payload.medicion.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LineaCreada {
            linea,
            total_conceptos,
        }),
    ))
}

// DELETE /api/conceptos/lineas/{id}
#[utoipa::path(
    delete,
    path = "/api/conceptos/lineas/{id}",
    tag = "Conceptos",
    responses(
        (status = 200, description = "Línea eliminada; total recalculado", body = TotalConceptos),
        (status = 404, description = "La línea no existe")
    ),
    params(("id" = i64, Path, description = "ID de la línea del ledger")),
    security(("api_jwt" = []))
)]
pub async fn eliminar_linea(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TotalConceptos>, AppError> {
    let total_conceptos = app_state.concepto_service.eliminar_linea(id).await?;
    Ok(Json(TotalConceptos { total_conceptos }))
}
