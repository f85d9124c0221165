// src/services/lifecycle.rs
//
// Ciclo de vida del expediente, como función pura.
// Una sola función de transición (estado, destino, contexto) -> Result,
// probada sin UI y sin base de datos.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    models::obra::{EstadoObra, EstadoPago, LugaresRecibidos, SiNo},
};

// Lo que la transición necesita saber además del estado actual.
// El servicio lo arma leyendo lugares_recibidos y alertas dentro de la
// misma transacción que aplica el cambio.
#[derive(Debug, Clone, Copy)]
pub struct ContextoTransicion {
    pub lugares: LugaresRecibidos,
    pub alertas_activas: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RechazoTransicion {
    #[error("No se permite pasar de \"{de}\" a \"{a}\".")]
    DestinoNoPermitido { de: EstadoObra, a: EstadoObra },

    #[error(
        "No se puede concluir la obra: los tres lugares (Secretaría, Presidencia y Padrón) deben haber recibido el expediente."
    )]
    LugaresIncompletos,

    #[error("No se puede concluir la obra: tiene {0} alerta(s) vigente(s). Un administrador debe quitarlas primero.")]
    AlertasVigentes(usize),
}

impl From<RechazoTransicion> for AppError {
    fn from(r: RechazoTransicion) -> Self {
        AppError::TransicionRechazada(r.to_string())
    }
}

/// Transiciones explícitas (botón "enviar a firmas", el dropdown de destinos
/// y el regreso de Concluido). El guardado del paso 3 NO pasa por aquí:
/// usa `estado_tras_guardado`.
pub fn transicion_estado(
    actual: EstadoObra,
    destino: EstadoObra,
    ctx: &ContextoTransicion,
) -> Result<EstadoObra, RechazoTransicion> {
    use EstadoObra::*;

    match (actual, destino) {
        (Verificado, EnviadoAFirmas) => Ok(EnviadoAFirmas),

        (EnviadoAFirmas, EnviadoAPago) => Ok(EnviadoAPago),

        // Concluir desde Firmas exige los tres lugares Y cero alertas.
        // Si algo falla no hay cambio parcial: el estado actual se conserva.
        (EnviadoAFirmas, Concluido) => {
            if !ctx.lugares.todos_recibidos() {
                return Err(RechazoTransicion::LugaresIncompletos);
            }
            if ctx.alertas_activas > 0 {
                return Err(RechazoTransicion::AlertasVigentes(ctx.alertas_activas));
            }
            Ok(Concluido)
        }

        // Desde Pago solo aplica el candado de alertas.
        (EnviadoAPago, Concluido) => {
            if ctx.alertas_activas > 0 {
                return Err(RechazoTransicion::AlertasVigentes(ctx.alertas_activas));
            }
            Ok(Concluido)
        }

        // Regreso para correcciones; siempre permitido.
        (Concluido, EnviadoAFirmas) => Ok(EnviadoAFirmas),

        (de, a) => Err(RechazoTransicion::DestinoNoPermitido { de, a }),
    }
}

/// Destinos que el dropdown puede ofrecer desde cada estado
/// (solo hacia adelante, más el regreso Concluido → Enviado a Firmas).
pub fn destinos_disponibles(actual: EstadoObra) -> Vec<EstadoObra> {
    use EstadoObra::*;
    match actual {
        EnProceso => vec![],
        Verificado => vec![EnviadoAFirmas],
        EnviadoAFirmas => vec![EnviadoAPago, Concluido],
        EnviadoAPago => vec![Concluido],
        Concluido => vec![EnviadoAFirmas],
    }
}

/// Regla del guardado del paso 3. Una vez que el expediente llegó a Firmas,
/// Pago o Concluido, guardar la verificación ya no puede regresarlo, aunque
/// estadoVerificacion vuelva a "No".
pub fn estado_tras_guardado(actual: EstadoObra, verificacion: SiNo) -> EstadoObra {
    use EstadoObra::*;
    match actual {
        EnviadoAFirmas | EnviadoAPago | Concluido => actual,
        EnProceso | Verificado => match verificacion {
            SiNo::Si => Verificado,
            SiNo::No => EnProceso,
        },
    }
}

/// estadoPago nunca lo fija el cliente: se deriva del recibo en cada
/// guardado del paso 3.
pub fn derivar_estado_pago(recibo: Option<&str>) -> EstadoPago {
    match recibo {
        Some(r) if !r.trim().is_empty() => EstadoPago::Pagado,
        _ => EstadoPago::SinPagar,
    }
}

/// Un documento solo se ofrece cuando el expediente ya salió a firmas.
pub fn documento_disponible(estado: EstadoObra) -> bool {
    use EstadoObra::*;
    matches!(estado, EnviadoAFirmas | EnviadoAPago | Concluido)
}

// --- Gate de pasos del asistente ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasoExpediente {
    Captura,
    Conceptos,
    VerificacionPago,
    Impresion,
}

// Lo mínimo que hay que saber de la obra para decidir los pasos.
#[derive(Debug, Clone, Copy)]
pub struct ResumenExpediente {
    pub existe: bool,
    pub num_conceptos: i64,
    pub estado_verificacion: SiNo,
}

pub fn paso_habilitado(paso: PasoExpediente, resumen: &ResumenExpediente) -> bool {
    match paso {
        PasoExpediente::Captura => true,
        PasoExpediente::Conceptos => resumen.existe,
        PasoExpediente::VerificacionPago => resumen.existe && resumen.num_conceptos > 0,
        PasoExpediente::Impresion => {
            resumen.existe
                && resumen.num_conceptos > 0
                && resumen.estado_verificacion == SiNo::Si
        }
    }
}

// Respuesta del endpoint de pasos; el cliente la usa para habilitar botones,
// pero el servidor vuelve a verificar en cada operación.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasosHabilitados {
    pub captura: bool,
    pub conceptos: bool,
    pub verificacion_pago: bool,
    pub impresion: bool,
}

pub fn pasos_habilitados(resumen: &ResumenExpediente) -> PasosHabilitados {
    PasosHabilitados {
        captura: paso_habilitado(PasoExpediente::Captura, resumen),
        conceptos: paso_habilitado(PasoExpediente::Conceptos, resumen),
        verificacion_pago: paso_habilitado(PasoExpediente::VerificacionPago, resumen),
        impresion: paso_habilitado(PasoExpediente::Impresion, resumen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EstadoObra::*;

    fn lugares(secretaria: SiNo, presidencia: SiNo, padron: SiNo) -> LugaresRecibidos {
        LugaresRecibidos {
            obra_id: 42,
            secretaria,
            presidencia,
            padron,
        }
    }

    fn ctx_limpio() -> ContextoTransicion {
        ContextoTransicion {
            lugares: lugares(SiNo::Si, SiNo::Si, SiNo::Si),
            alertas_activas: 0,
        }
    }

    // --- estadoPago derivado ---

    #[test]
    fn recibo_con_texto_deriva_pagado() {
        assert_eq!(derivar_estado_pago(Some("REC-00123")), EstadoPago::Pagado);
    }

    #[test]
    fn recibo_vacio_o_ausente_deriva_sin_pagar() {
        assert_eq!(derivar_estado_pago(None), EstadoPago::SinPagar);
        assert_eq!(derivar_estado_pago(Some("")), EstadoPago::SinPagar);
        assert_eq!(derivar_estado_pago(Some("   ")), EstadoPago::SinPagar);
    }

    // --- guardado del paso 3 ---

    #[test]
    fn verificacion_si_avanza_a_verificado() {
        assert_eq!(estado_tras_guardado(EnProceso, SiNo::Si), Verificado);
        assert_eq!(estado_tras_guardado(Verificado, SiNo::Si), Verificado);
    }

    #[test]
    fn verificacion_no_regresa_a_en_proceso_solo_en_estados_bajos() {
        assert_eq!(estado_tras_guardado(EnProceso, SiNo::No), EnProceso);
        assert_eq!(estado_tras_guardado(Verificado, SiNo::No), EnProceso);
    }

    #[test]
    fn guardado_nunca_regresa_estados_altos() {
        for alto in [EnviadoAFirmas, EnviadoAPago, Concluido] {
            assert_eq!(estado_tras_guardado(alto, SiNo::No), alto);
            assert_eq!(estado_tras_guardado(alto, SiNo::Si), alto);
        }
    }

    // --- transiciones explícitas ---

    #[test]
    fn verificado_puede_enviarse_a_firmas() {
        assert_eq!(
            transicion_estado(Verificado, EnviadoAFirmas, &ctx_limpio()),
            Ok(EnviadoAFirmas)
        );
    }

    #[test]
    fn firmas_puede_pasar_a_pago() {
        assert_eq!(
            transicion_estado(EnviadoAFirmas, EnviadoAPago, &ctx_limpio()),
            Ok(EnviadoAPago)
        );
    }

    #[test]
    fn concluir_desde_firmas_exige_los_tres_lugares() {
        // Obra 42: Secretaría Si, Presidencia Si, Padrón No.
        let ctx = ContextoTransicion {
            lugares: lugares(SiNo::Si, SiNo::Si, SiNo::No),
            alertas_activas: 0,
        };
        let rechazo = transicion_estado(EnviadoAFirmas, Concluido, &ctx).unwrap_err();
        assert_eq!(rechazo, RechazoTransicion::LugaresIncompletos);
        // El mensaje menciona "lugares" y el estado no cambió.
        assert!(rechazo.to_string().contains("lugares"));
    }

    #[test]
    fn concluir_desde_firmas_con_todo_en_orden() {
        assert_eq!(
            transicion_estado(EnviadoAFirmas, Concluido, &ctx_limpio()),
            Ok(Concluido)
        );
    }

    #[test]
    fn alertas_bloquean_la_conclusion_aunque_los_lugares_esten_completos() {
        let ctx = ContextoTransicion {
            lugares: lugares(SiNo::Si, SiNo::Si, SiNo::Si),
            alertas_activas: 2,
        };
        assert_eq!(
            transicion_estado(EnviadoAFirmas, Concluido, &ctx),
            Err(RechazoTransicion::AlertasVigentes(2))
        );
        assert_eq!(
            transicion_estado(EnviadoAPago, Concluido, &ctx),
            Err(RechazoTransicion::AlertasVigentes(2))
        );
    }

    #[test]
    fn pago_puede_concluir_sin_revisar_lugares() {
        // El requisito de lugares solo aplica viniendo de Firmas.
        let ctx = ContextoTransicion {
            lugares: lugares(SiNo::No, SiNo::No, SiNo::No),
            alertas_activas: 0,
        };
        assert_eq!(transicion_estado(EnviadoAPago, Concluido, &ctx), Ok(Concluido));
    }

    #[test]
    fn concluido_puede_regresar_a_firmas() {
        // Regreso para correcciones, siempre permitido.
        let ctx = ContextoTransicion {
            lugares: lugares(SiNo::No, SiNo::No, SiNo::No),
            alertas_activas: 3,
        };
        assert_eq!(
            transicion_estado(Concluido, EnviadoAFirmas, &ctx),
            Ok(EnviadoAFirmas)
        );
    }

    #[test]
    fn destinos_fuera_de_la_tabla_se_rechazan() {
        let ctx = ctx_limpio();
        for (de, a) in [
            (EnProceso, Verificado),
            (EnProceso, Concluido),
            (Verificado, EnviadoAPago),
            (Verificado, Concluido),
            (EnviadoAPago, EnviadoAFirmas),
            (Concluido, EnProceso),
            (Concluido, EnviadoAPago),
        ] {
            assert_eq!(
                transicion_estado(de, a, &ctx),
                Err(RechazoTransicion::DestinoNoPermitido { de, a })
            );
        }
    }

    #[test]
    fn el_dropdown_solo_ofrece_destinos_hacia_adelante() {
        assert_eq!(destinos_disponibles(EnProceso), vec![]);
        assert_eq!(destinos_disponibles(Verificado), vec![EnviadoAFirmas]);
        assert_eq!(
            destinos_disponibles(EnviadoAFirmas),
            vec![EnviadoAPago, Concluido]
        );
        assert_eq!(destinos_disponibles(EnviadoAPago), vec![Concluido]);
        assert_eq!(destinos_disponibles(Concluido), vec![EnviadoAFirmas]);
    }

    // --- gate de pasos ---

    #[test]
    fn sin_obra_solo_se_puede_capturar() {
        let resumen = ResumenExpediente {
            existe: false,
            num_conceptos: 0,
            estado_verificacion: SiNo::No,
        };
        assert!(paso_habilitado(PasoExpediente::Captura, &resumen));
        assert!(!paso_habilitado(PasoExpediente::Conceptos, &resumen));
        assert!(!paso_habilitado(PasoExpediente::VerificacionPago, &resumen));
        assert!(!paso_habilitado(PasoExpediente::Impresion, &resumen));
    }

    #[test]
    fn sin_conceptos_no_hay_paso_3() {
        let resumen = ResumenExpediente {
            existe: true,
            num_conceptos: 0,
            estado_verificacion: SiNo::No,
        };
        assert!(paso_habilitado(PasoExpediente::Conceptos, &resumen));
        assert!(!paso_habilitado(PasoExpediente::VerificacionPago, &resumen));
    }

    #[test]
    fn la_impresion_exige_verificacion() {
        let mut resumen = ResumenExpediente {
            existe: true,
            num_conceptos: 2,
            estado_verificacion: SiNo::No,
        };
        assert!(paso_habilitado(PasoExpediente::VerificacionPago, &resumen));
        assert!(!paso_habilitado(PasoExpediente::Impresion, &resumen));

        resumen.estado_verificacion = SiNo::Si;
        assert!(paso_habilitado(PasoExpediente::Impresion, &resumen));
    }

    #[test]
    fn documento_solo_disponible_desde_firmas() {
        assert!(!documento_disponible(EnProceso));
        assert!(!documento_disponible(Verificado));
        assert!(documento_disponible(EnviadoAFirmas));
        assert!(documento_disponible(EnviadoAPago));
        assert!(documento_disponible(Concluido));
    }
}
