// src/models/obra.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// --- Estado del expediente ---
// Los literales con espacios son el formato histórico del sistema;
// los conservamos en la base y en el JSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "estado_obra")]
pub enum EstadoObra {
    #[sqlx(rename = "En Proceso")]
    #[serde(rename = "En Proceso")]
    EnProceso,
    #[sqlx(rename = "Verificado")]
    #[serde(rename = "Verificado")]
    Verificado,
    #[sqlx(rename = "Enviado a Firmas")]
    #[serde(rename = "Enviado a Firmas")]
    EnviadoAFirmas,
    #[sqlx(rename = "Enviado a Pago")]
    #[serde(rename = "Enviado a Pago")]
    EnviadoAPago,
    #[sqlx(rename = "Concluido")]
    #[serde(rename = "Concluido")]
    Concluido,
}

impl std::fmt::Display for EstadoObra {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EstadoObra::EnProceso => "En Proceso",
            EstadoObra::Verificado => "Verificado",
            EstadoObra::EnviadoAFirmas => "Enviado a Firmas",
            EstadoObra::EnviadoAPago => "Enviado a Pago",
            EstadoObra::Concluido => "Concluido",
        };
        write!(f, "{}", s)
    }
}

// Derivado del recibo de pago; el cliente nunca lo fija directamente.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "estado_pago")]
pub enum EstadoPago {
    #[sqlx(rename = "Sin Pagar")]
    #[serde(rename = "Sin Pagar")]
    SinPagar,
    #[sqlx(rename = "Pagado")]
    Pagado,
}

// "Si"/"No" del sistema original (normalizado sin acento).
// Se usa para la verificación, los servicios del predio y los lugares recibidos.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "si_no")]
pub enum SiNo {
    Si,
    No,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "tipo_propietario")]
pub enum TipoPropietario {
    Fisica,
    Moral,
}

// --- Obra (expediente de permiso de construcción) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Obra {
    pub id: i64,
    // Vacío hasta que se asigna un trámite: "{letra}-{id}".
    pub consecutivo: Option<String>,
    pub tramite_id: Option<i64>,

    // Propietario
    pub propietario: String,
    pub tipo_propietario: TipoPropietario,
    pub representante_legal: Option<String>,
    pub identificacion: Option<String>,
    pub domicilio_propietario: Option<String>,
    pub telefono: Option<String>,

    // Ubicación del predio
    pub colonia_id: Option<i64>,
    pub manzana: Option<String>,
    pub lote: Option<String>,
    pub etapa: Option<String>,
    pub condominio: Option<String>,

    // Proyecto
    pub destino_actual: String,
    pub destino_propuesto: String,
    pub descripcion_proyecto: Option<String>,
    pub agua_potable: SiNo,
    pub drenaje: SiNo,
    pub energia_electrica: SiNo,
    pub servidumbre_frente: Option<Decimal>,
    pub servidumbre_lateral: Option<Decimal>,
    pub servidumbre_fondo: Option<Decimal>,
    pub cos: Option<Decimal>,
    pub cus: Option<Decimal>,

    // Estado
    pub estado_obra: EstadoObra,
    pub estado_pago: EstadoPago,

    // Verificación (paso 3)
    pub estado_verificacion: SiNo,
    pub fecha_inspeccion: Option<NaiveDate>,
    pub notas_inspeccion: Option<String>,
    pub director_id: Option<i64>,

    // Pago
    pub recibo_de_pago: Option<String>,
    pub folio_pago: Option<String>,
    pub fecha_pago: Option<NaiveDate>,

    pub total_conceptos: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Par (calle, número oficial); una obra puede tener varios.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObraCalle {
    pub id: i64,
    pub obra_id: i64,
    pub calle: String,
    pub numero_oficial: String,
}

// Los tres "lugares que recibieron" que condicionan la conclusión.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LugaresRecibidos {
    pub obra_id: i64,
    pub secretaria: SiNo,
    pub presidencia: SiNo,
    pub padron: SiNo,
}

impl LugaresRecibidos {
    pub fn todos_recibidos(&self) -> bool {
        self.secretaria == SiNo::Si && self.presidencia == SiNo::Si && self.padron == SiNo::Si
    }
}

// --- Payloads del asistente ---
// Viven junto al modelo porque bajan completos hasta el repositorio.

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallePayload {
    #[validate(length(min = 1, message = "La calle es obligatoria."))]
    pub calle: String,
    #[validate(length(min = 1, message = "El número oficial es obligatorio."))]
    pub numero_oficial: String,
}

// Paso 1: captura de datos del propietario, el predio y el proyecto.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObraDatosPayload {
    #[validate(length(min = 1, message = "El nombre del propietario es obligatorio."))]
    pub propietario: String,
    pub tipo_propietario: TipoPropietario,
    pub representante_legal: Option<String>,
    pub identificacion: Option<String>,
    pub domicilio_propietario: Option<String>,
    pub telefono: Option<String>,

    pub colonia_id: Option<i64>,
    pub manzana: Option<String>,
    pub lote: Option<String>,
    pub etapa: Option<String>,
    pub condominio: Option<String>,
    #[validate(nested)]
    pub calles: Vec<CallePayload>,

    #[validate(length(min = 1, message = "El destino actual es obligatorio."))]
    pub destino_actual: String,
    #[validate(length(min = 1, message = "El destino propuesto es obligatorio."))]
    pub destino_propuesto: String,
    pub descripcion_proyecto: Option<String>,
    #[serde(default = "si_no_default")]
    pub agua_potable: SiNo,
    #[serde(default = "si_no_default")]
    pub drenaje: SiNo,
    #[serde(default = "si_no_default")]
    pub energia_electrica: SiNo,
    pub servidumbre_frente: Option<Decimal>,
    pub servidumbre_lateral: Option<Decimal>,
    pub servidumbre_fondo: Option<Decimal>,
    pub cos: Option<Decimal>,
    pub cus: Option<Decimal>,
}

fn si_no_default() -> SiNo {
    SiNo::No
}

// Paso 3: verificación de inspección y datos de pago.
// No trae estadoObra ni estadoPago: ambos se recalculan en el servidor.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificacionPayload {
    pub estado_verificacion: SiNo,
    pub fecha_inspeccion: Option<NaiveDate>,
    pub notas_inspeccion: Option<String>,
    pub director_id: Option<i64>,
    pub recibo_de_pago: Option<String>,
    pub folio_pago: Option<String>,
    pub fecha_pago: Option<NaiveDate>,
}

// Página de resultados del listado filtrado.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginaObras {
    pub items: Vec<Obra>,
    pub total: i64,
    pub pagina: i64,
    pub por_pagina: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datos_base() -> ObraDatosPayload {
        ObraDatosPayload {
            propietario: "María Pérez".to_string(),
            tipo_propietario: TipoPropietario::Fisica,
            representante_legal: None,
            identificacion: None,
            domicilio_propietario: None,
            telefono: None,
            colonia_id: None,
            manzana: None,
            lote: None,
            etapa: None,
            condominio: None,
            calles: vec![CallePayload {
                calle: "Av. Juárez".to_string(),
                numero_oficial: "123".to_string(),
            }],
            destino_actual: "Baldío".to_string(),
            destino_propuesto: "Casa habitación".to_string(),
            descripcion_proyecto: None,
            agua_potable: SiNo::Si,
            drenaje: SiNo::Si,
            energia_electrica: SiNo::No,
            servidumbre_frente: None,
            servidumbre_lateral: None,
            servidumbre_fondo: None,
            cos: None,
            cus: None,
        }
    }

    #[test]
    fn el_payload_completo_pasa_la_validacion() {
        assert!(datos_base().validate().is_ok());
    }

    // La validación baja hasta cada calle anidada.
    #[test]
    fn una_calle_vacia_invalida_el_payload() {
        let mut datos = datos_base();
        datos.calles.push(CallePayload {
            calle: String::new(),
            numero_oficial: "5".to_string(),
        });

        let errores = datos.validate().unwrap_err();
        assert!(errores.to_string().contains("calle") || !errores.errors().is_empty());
    }

    #[test]
    fn el_propietario_es_obligatorio() {
        let mut datos = datos_base();
        datos.propietario = String::new();
        assert!(datos.validate().is_err());
    }
}
