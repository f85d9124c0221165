// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Obras ---
        handlers::obras::crear_obra,
        handlers::obras::actualizar_obra,
        handlers::obras::get_obra,
        handlers::obras::get_calles,
        handlers::obras::listar_obras,
        handlers::obras::asignar_tramite,
        handlers::obras::guardar_verificacion,
        handlers::obras::cambiar_estado,
        handlers::obras::destinos,
        handlers::obras::pasos,
        handlers::obras::get_lugares,
        handlers::obras::actualizar_lugares,

        // --- Conceptos ---
        handlers::conceptos::arbol,
        handlers::conceptos::hijos,
        handlers::conceptos::crear_concepto,
        handlers::conceptos::listar_lineas,
        handlers::conceptos::agregar_linea,
        handlers::conceptos::eliminar_linea,

        // --- Alertas ---
        handlers::alertas::listar_alertas,
        handlers::alertas::crear_alerta,
        handlers::alertas::actualizar_alerta,
        handlers::alertas::eliminar_alerta,

        // --- Catálogos ---
        handlers::catalogos::listar_colonias,
        handlers::catalogos::crear_colonia,
        handlers::catalogos::actualizar_colonia,
        handlers::catalogos::eliminar_colonia,
        handlers::catalogos::listar_directores,
        handlers::catalogos::crear_director,
        handlers::catalogos::actualizar_director,
        handlers::catalogos::eliminar_director,
        handlers::catalogos::listar_tramites,
        handlers::catalogos::crear_tramite,
        handlers::catalogos::actualizar_tramite,
        handlers::catalogos::eliminar_tramite,
        handlers::catalogos::conceptos_de_tramite,

        // --- Documentos ---
        handlers::documentos::generar_documento,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::RolUsuario,
            models::auth::Usuario,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Obras ---
            models::obra::EstadoObra,
            models::obra::EstadoPago,
            models::obra::SiNo,
            models::obra::TipoPropietario,
            models::obra::Obra,
            models::obra::ObraCalle,
            models::obra::LugaresRecibidos,
            models::obra::CallePayload,
            models::obra::ObraDatosPayload,
            models::obra::VerificacionPayload,
            models::obra::PaginaObras,
            services::lifecycle::PasosHabilitados,

            // --- Conceptos ---
            models::concepto::NivelConcepto,
            models::concepto::Concepto,
            models::concepto::ConceptoArbol,
            models::concepto::ObraConcepto,
            models::concepto::ObraConceptoDetalle,
            models::concepto::TramiteConcepto,

            // --- Alertas ---
            models::alerta::TipoDocumento,
            models::alerta::Alerta,

            // --- Catálogos ---
            models::catalogo::Colonia,
            models::catalogo::DirectorObra,
            models::catalogo::Tramite,

            // --- Payloads de handlers ---
            handlers::obras::AsignarTramitePayload,
            handlers::obras::CambioEstadoPayload,
            handlers::obras::LugaresPayload,
            handlers::conceptos::CrearConceptoPayload,
            handlers::conceptos::LineaPayload,
            handlers::conceptos::LineaCreada,
            handlers::conceptos::TotalConceptos,
            handlers::alertas::CrearAlertaPayload,
            handlers::alertas::ActualizarAlertaPayload,
            handlers::catalogos::ColoniaPayload,
            handlers::catalogos::DirectorPayload,
            handlers::catalogos::TramitePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticación y registro"),
        (name = "Obras", description = "Expedientes de permiso de construcción"),
        (name = "Conceptos", description = "Catálogo de conceptos y ledger por obra"),
        (name = "Alertas", description = "Candados administrativos sobre documentos"),
        (name = "Catálogos", description = "Colonias, directores de obra y trámites"),
        (name = "Documentos", description = "Emisión de documentos oficiales en PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
