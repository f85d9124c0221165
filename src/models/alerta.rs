// src/models/alerta.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Los tres documentos oficiales que emite la dirección.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "tipo_documento")]
pub enum TipoDocumento {
    #[sqlx(rename = "Alineamiento y Número Oficial")]
    #[serde(rename = "Alineamiento y Número Oficial")]
    AlineamientoNumeroOficial,
    #[sqlx(rename = "Licencia de Construcción")]
    #[serde(rename = "Licencia de Construcción")]
    LicenciaConstruccion,
    #[sqlx(rename = "Certificado de Habitabilidad")]
    #[serde(rename = "Certificado de Habitabilidad")]
    CertificadoHabitabilidad,
}

impl TipoDocumento {
    // Slug que viaja en la URL (/documentos/{tipo}).
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "alineamiento" => Some(Self::AlineamientoNumeroOficial),
            "licencia" => Some(Self::LicenciaConstruccion),
            "habitabilidad" => Some(Self::CertificadoHabitabilidad),
            _ => None,
        }
    }

    pub fn titulo(&self) -> &'static str {
        match self {
            Self::AlineamientoNumeroOficial => "Alineamiento y Número Oficial",
            Self::LicenciaConstruccion => "Licencia de Construcción",
            Self::CertificadoHabitabilidad => "Certificado de Habitabilidad",
        }
    }
}

impl std::fmt::Display for TipoDocumento {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.titulo())
    }
}

// Candado administrativo: mientras exista, el documento (obra, tipo)
// no puede emitirse. Solo un ADMIN la crea, edita o quita.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alerta {
    pub id: i64,
    pub obra_id: i64,
    pub tipo_documento: TipoDocumento,
    pub mensaje: String,
    pub creada_por: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
