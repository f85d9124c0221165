// src/services/obra_service.rs
//
// Orquesta el expediente: captura, trámite/consecutivo, guardado del paso 3
// y transiciones de estado. Las reglas puras viven en lifecycle.rs; aquí solo
// se leen los datos dentro de una transacción y se aplica el resultado.

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{AlertaRepository, CatalogoRepository, ConceptoRepository, ObraRepository},
    models::{
        concepto::NivelConcepto,
        obra::{
            EstadoObra, LugaresRecibidos, Obra, ObraCalle, ObraDatosPayload, PaginaObras, SiNo,
            VerificacionPayload,
        },
    },
    services::lifecycle::{
        self, ContextoTransicion, PasosHabilitados, ResumenExpediente,
    },
};

#[derive(Clone)]
pub struct ObraService {
    obra_repo: ObraRepository,
    concepto_repo: ConceptoRepository,
    alerta_repo: AlertaRepository,
    catalogo_repo: CatalogoRepository,
    pool: PgPool,
}

impl ObraService {
    pub fn new(
        obra_repo: ObraRepository,
        concepto_repo: ConceptoRepository,
        alerta_repo: AlertaRepository,
        catalogo_repo: CatalogoRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            obra_repo,
            concepto_repo,
            alerta_repo,
            catalogo_repo,
            pool,
        }
    }

    // --- PASO 1: CAPTURA ---

    // Obra + calles + fila de lugares recibidos nacen en UNA transacción:
    // una falla a la mitad no deja el expediente a medio configurar.
    pub async fn crear_obra(&self, datos: &ObraDatosPayload) -> Result<Obra, AppError> {
        let mut tx = self.pool.begin().await?;

        let obra = self.obra_repo.insert_obra(&mut *tx, datos).await?;

        let calles: Vec<(String, String)> = datos
            .calles
            .iter()
            .map(|c| (c.calle.clone(), c.numero_oficial.clone()))
            .collect();
        self.obra_repo
            .replace_calles(&mut *tx, obra.id, &calles)
            .await?;

        self.obra_repo.insert_lugares(&mut *tx, obra.id).await?;

        tx.commit().await?;

        tracing::info!("🏗️  Obra {} creada (En Proceso)", obra.id);
        Ok(obra)
    }

    pub async fn actualizar_obra(
        &self,
        obra_id: i64,
        datos: &ObraDatosPayload,
    ) -> Result<Obra, AppError> {
        let mut tx = self.pool.begin().await?;

        let obra = self
            .obra_repo
            .update_obra(&mut *tx, obra_id, datos)
            .await?
            .ok_or(AppError::ObraNoEncontrada)?;

        let calles: Vec<(String, String)> = datos
            .calles
            .iter()
            .map(|c| (c.calle.clone(), c.numero_oficial.clone()))
            .collect();
        self.obra_repo
            .replace_calles(&mut *tx, obra.id, &calles)
            .await?;

        tx.commit().await?;
        Ok(obra)
    }

    pub async fn get_obra(&self, obra_id: i64) -> Result<Obra, AppError> {
        self.obra_repo
            .get_obra(obra_id)
            .await?
            .ok_or(AppError::ObraNoEncontrada)
    }

    pub async fn get_calles(&self, obra_id: i64) -> Result<Vec<ObraCalle>, AppError> {
        self.obra_repo.get_calles(obra_id).await
    }

    pub async fn listar(
        &self,
        propietario: Option<&str>,
        estado: Option<EstadoObra>,
        colonia_id: Option<i64>,
        pagina: i64,
        por_pagina: i64,
    ) -> Result<PaginaObras, AppError> {
        let pagina = pagina.max(1);
        let por_pagina = por_pagina.clamp(1, 100);
        let offset = (pagina - 1) * por_pagina;

        let (items, total) = self
            .obra_repo
            .listar_filtrado(propietario, estado, colonia_id, por_pagina, offset)
            .await?;

        Ok(PaginaObras {
            items,
            total,
            pagina,
            por_pagina,
        })
    }

    // --- TRÁMITE Y CONSECUTIVO ---

    // Asigna el trámite, forma el consecutivo "{letra}-{id}" (solo la primera
    // vez) y, si el ledger está vacío, lo siembra con los conceptos
    // predefinidos del trámite. Todo o nada.
    pub async fn asignar_tramite(&self, obra_id: i64, tramite_id: i64) -> Result<Obra, AppError> {
        let mut tx = self.pool.begin().await?;

        self.obra_repo
            .get_obra_for_update(&mut *tx, obra_id)
            .await?
            .ok_or(AppError::ObraNoEncontrada)?;

        let tramite = self
            .catalogo_repo
            .get_tramite(&mut *tx, tramite_id)
            .await?
            .ok_or(AppError::RegistroNoEncontrado("Trámite"))?;

        let consecutivo = format!("{}-{}", tramite.letra, obra_id);
        let obra = self
            .obra_repo
            .asignar_tramite(&mut *tx, obra_id, tramite_id, &consecutivo)
            .await?
            .ok_or(AppError::ObraNoEncontrada)?;

        let num_lineas = self.concepto_repo.contar_lineas(&mut *tx, obra_id).await?;
        if num_lineas == 0 {
            let sembradas = self.sembrar_conceptos(&mut tx, obra_id, tramite_id).await?;
            if sembradas > 0 {
                self.concepto_repo.recalcular_total(&mut *tx, obra_id).await?;
                tracing::info!(
                    "🌱 Obra {}: {} conceptos sembrados del trámite {}",
                    obra_id,
                    sembradas,
                    tramite.letra
                );
            }
        }

        tx.commit().await?;
        Ok(obra)
    }

    // Un concepto 'Abuelo' del trámite se expande a sus hojas: los niveles
    // intermedios y finales sí se cobran, el Abuelo no.
    async fn sembrar_conceptos(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        obra_id: i64,
        tramite_id: i64,
    ) -> Result<usize, AppError> {
        let semillas = self
            .concepto_repo
            .conceptos_de_tramite(&mut **tx, tramite_id)
            .await?;

        let mut insertadas = 0;
        for semilla in semillas {
            let concepto = self
                .concepto_repo
                .get_concepto(&mut **tx, semilla.concepto_id)
                .await?
                .ok_or(AppError::RegistroNoEncontrado("Concepto"))?;

            if concepto.nivel == NivelConcepto::Abuelo {
                let hojas = self
                    .concepto_repo
                    .descendientes_hoja(&mut **tx, concepto.id)
                    .await?;
                for hoja in hojas {
                    self.concepto_repo
                        .insertar_linea(
                            &mut **tx,
                            obra_id,
                            hoja.id,
                            semilla.costo_unitario,
                            semilla.cantidad,
                            hoja.unidad.as_deref(),
                        )
                        .await?;
                    insertadas += 1;
                }
            } else {
                self.concepto_repo
                    .insertar_linea(
                        &mut **tx,
                        obra_id,
                        concepto.id,
                        semilla.costo_unitario,
                        semilla.cantidad,
                        concepto.unidad.as_deref(),
                    )
                    .await?;
                insertadas += 1;
            }
        }

        Ok(insertadas)
    }

    // --- PASO 3: VERIFICACIÓN Y PAGO ---

    // El estado se recalcula con la regla pura sobre el estado PERSISTIDO
    // (la fila queda bloqueada con FOR UPDATE): un guardado tardío no puede
    // regresar un expediente que ya salió a firmas.
    pub async fn guardar_verificacion(
        &self,
        obra_id: i64,
        datos: &VerificacionPayload,
    ) -> Result<Obra, AppError> {
        let mut tx = self.pool.begin().await?;

        let obra = self
            .obra_repo
            .get_obra_for_update(&mut *tx, obra_id)
            .await?
            .ok_or(AppError::ObraNoEncontrada)?;

        // Gate del paso 3: sin conceptos no hay verificación.
        let num_lineas = self.concepto_repo.contar_lineas(&mut *tx, obra_id).await?;
        if num_lineas == 0 {
            return Err(AppError::PasoBloqueado(
                "La obra no tiene conceptos asignados; complete el paso 2 antes de la verificación."
                    .to_string(),
            ));
        }

        let nuevo_estado =
            lifecycle::estado_tras_guardado(obra.estado_obra, datos.estado_verificacion);
        let estado_pago = lifecycle::derivar_estado_pago(datos.recibo_de_pago.as_deref());

        let obra = self
            .obra_repo
            .guardar_verificacion(&mut *tx, obra_id, datos, nuevo_estado, estado_pago)
            .await?;

        tx.commit().await?;
        Ok(obra)
    }

    // --- TRANSICIONES DE ESTADO ---

    pub async fn cambiar_estado(
        &self,
        obra_id: i64,
        destino: EstadoObra,
    ) -> Result<Obra, AppError> {
        let mut tx = self.pool.begin().await?;

        let obra = self
            .obra_repo
            .get_obra_for_update(&mut *tx, obra_id)
            .await?
            .ok_or(AppError::ObraNoEncontrada)?;

        let lugares = self
            .obra_repo
            .get_lugares(&mut *tx, obra_id)
            .await?
            .unwrap_or(LugaresRecibidos {
                obra_id,
                secretaria: SiNo::No,
                presidencia: SiNo::No,
                padron: SiNo::No,
            });
        let alertas_activas = self.alerta_repo.contar_por_obra(&mut *tx, obra_id).await?;

        let ctx = ContextoTransicion {
            lugares,
            alertas_activas: alertas_activas as usize,
        };

        // Si la transición se rechaza, la transacción se descarta:
        // el estado persistido queda intacto.
        let anterior = obra.estado_obra;
        let nuevo = lifecycle::transicion_estado(anterior, destino, &ctx)?;

        let obra = self.obra_repo.actualizar_estado(&mut *tx, obra_id, nuevo).await?;
        tx.commit().await?;

        tracing::info!("📋 Obra {}: {} -> {}", obra_id, anterior, nuevo);
        Ok(obra)
    }

    pub async fn destinos(&self, obra_id: i64) -> Result<Vec<EstadoObra>, AppError> {
        let obra = self.get_obra(obra_id).await?;
        Ok(lifecycle::destinos_disponibles(obra.estado_obra))
    }

    // --- GATE DE PASOS ---

    pub async fn pasos(&self, obra_id: i64) -> Result<PasosHabilitados, AppError> {
        let obra = self.get_obra(obra_id).await?;
        let num_conceptos = self
            .concepto_repo
            .contar_lineas(&self.pool, obra_id)
            .await?;

        let resumen = ResumenExpediente {
            existe: true,
            num_conceptos,
            estado_verificacion: obra.estado_verificacion,
        };
        Ok(lifecycle::pasos_habilitados(&resumen))
    }

    // --- LUGARES RECIBIDOS ---

    pub async fn get_lugares(&self, obra_id: i64) -> Result<LugaresRecibidos, AppError> {
        self.obra_repo
            .get_lugares(&self.pool, obra_id)
            .await?
            .ok_or(AppError::ObraNoEncontrada)
    }

    pub async fn actualizar_lugares(
        &self,
        obra_id: i64,
        secretaria: SiNo,
        presidencia: SiNo,
        padron: SiNo,
    ) -> Result<LugaresRecibidos, AppError> {
        self.obra_repo
            .update_lugares(&self.pool, obra_id, secretaria, presidencia, padron)
            .await?
            .ok_or(AppError::ObraNoEncontrada)
    }
}
