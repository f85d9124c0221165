// src/models/catalogo.rs
// Catálogos de referencia: se editan en pantallas propias y las obras
// los referencian por llave foránea.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Colonia {
    pub id: i64,
    pub nombre: String,
    pub codigo_postal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectorObra {
    pub id: i64,
    pub nombre: String,
    pub numero_registro: String,
    pub vigencia: Option<NaiveDate>,
}

// Tipo de procedimiento. La letra (una sola) forma el consecutivo de la obra.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tramite {
    pub id: i64,
    pub nombre: String,
    pub letra: String,
}
