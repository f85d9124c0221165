// src/models/concepto.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// Jerarquía de 4 niveles del catálogo de conceptos.
// Solo los niveles distintos de 'Abuelo' pueden cobrarse directamente.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "nivel_concepto")]
pub enum NivelConcepto {
    Abuelo,
    Padre,
    Hijo,
    Nieto,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Concepto {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub nivel: NivelConcepto,
    pub clave: Option<String>,
    pub nombre: String,
    pub unidad: Option<String>,
}

// Nodo del árbol de conceptos que consume el selector en cascada.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConceptoArbol {
    pub id: i64,
    pub nivel: NivelConcepto,
    pub clave: Option<String>,
    pub nombre: String,
    pub unidad: Option<String>,
    pub hijos: Vec<ConceptoArbol>,
}

// Línea del ledger de conceptos de una obra.
// `total` es columna generada en Postgres: costo_unitario × cantidad.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObraConcepto {
    pub id: i64,
    pub obra_id: i64,
    pub concepto_id: i64,
    pub costo_unitario: Decimal,
    pub cantidad: Decimal,
    pub medicion: Option<String>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

// Línea del ledger con el nombre del concepto, para listados y documentos.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObraConceptoDetalle {
    pub id: i64,
    pub obra_id: i64,
    pub concepto_id: i64,
    pub concepto_nombre: String,
    pub unidad: Option<String>,
    pub costo_unitario: Decimal,
    pub cantidad: Decimal,
    pub medicion: Option<String>,
    pub total: Decimal,
}

// Concepto predefinido de un trámite, con el que se siembra el ledger.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TramiteConcepto {
    pub id: i64,
    pub tramite_id: i64,
    pub concepto_id: i64,
    pub costo_unitario: Decimal,
    pub cantidad: Decimal,
}
