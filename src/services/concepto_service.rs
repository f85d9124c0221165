// src/services/concepto_service.rs
//
// Ledger de conceptos. Cada mutación y el recálculo del total de la obra
// van en la MISMA transacción: el total nunca puede quedar desfasado del
// contenido del ledger.

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::{
    common::error::AppError,
    db::{ConceptoRepository, ObraRepository},
    models::concepto::{
        Concepto, ConceptoArbol, NivelConcepto, ObraConcepto, ObraConceptoDetalle,
        TramiteConcepto,
    },
};

#[derive(Clone)]
pub struct ConceptoService {
    concepto_repo: ConceptoRepository,
    obra_repo: ObraRepository,
    pool: PgPool,
}

impl ConceptoService {
    pub fn new(concepto_repo: ConceptoRepository, obra_repo: ObraRepository, pool: PgPool) -> Self {
        Self {
            concepto_repo,
            obra_repo,
            pool,
        }
    }

    // --- CATÁLOGO ---

    pub async fn arbol(&self) -> Result<Vec<ConceptoArbol>, AppError> {
        let conceptos = self.concepto_repo.listar_todos().await?;
        Ok(armar_arbol(conceptos))
    }

    pub async fn hijos(&self, parent_id: Option<i64>) -> Result<Vec<Concepto>, AppError> {
        self.concepto_repo.hijos(parent_id).await
    }

    // La jerarquía es estricta: Abuelo en la raíz y cada nivel cuelga
    // del inmediato superior.
    pub async fn crear_concepto(
        &self,
        parent_id: Option<i64>,
        nivel: NivelConcepto,
        clave: Option<&str>,
        nombre: &str,
        unidad: Option<&str>,
    ) -> Result<Concepto, AppError> {
        match parent_id {
            None => {
                if nivel != NivelConcepto::Abuelo {
                    return Err(AppError::ValidationError(error_de_campo(
                        "parentId",
                        "Solo un concepto Abuelo puede ir en la raíz.",
                    )));
                }
            }
            Some(pid) => {
                let padre = self
                    .concepto_repo
                    .get_concepto(&self.pool, pid)
                    .await?
                    .ok_or(AppError::RegistroNoEncontrado("Concepto padre"))?;
                if nivel_esperado(padre.nivel) != Some(nivel) {
                    return Err(AppError::ValidationError(error_de_campo(
                        "nivel",
                        "El nivel no corresponde al del concepto padre.",
                    )));
                }
            }
        }

        self.concepto_repo
            .crear_concepto(parent_id, nivel, clave, nombre, unidad)
            .await
    }

    pub async fn conceptos_de_tramite(
        &self,
        tramite_id: i64,
    ) -> Result<Vec<TramiteConcepto>, AppError> {
        self.concepto_repo
            .conceptos_de_tramite(&self.pool, tramite_id)
            .await
    }

    // --- LEDGER ---

    pub async fn listar_lineas(&self, obra_id: i64) -> Result<Vec<ObraConceptoDetalle>, AppError> {
        // 404 explícito en lugar de una lista vacía engañosa
        self.obra_repo
            .get_obra(obra_id)
            .await?
            .ok_or(AppError::ObraNoEncontrada)?;
        self.concepto_repo.listar_lineas(obra_id).await
    }

    pub async fn agregar_linea(
        &self,
        obra_id: i64,
        concepto_id: i64,
        costo_unitario: Decimal,
        cantidad: Decimal,
        medicion: Option<&str>,
    ) -> Result<(ObraConcepto, Decimal), AppError> {
        // El validator del handler ya revisó > 0; esta es la última línea
        // de defensa antes del CHECK de la base.
        if total_linea(costo_unitario, cantidad).is_none() {
            return Err(AppError::ValidationError(error_de_campo(
                "costoUnitario",
                "El costo unitario y la cantidad deben ser mayores a cero.",
            )));
        }

        let mut tx = self.pool.begin().await?;

        self.obra_repo
            .get_obra_for_update(&mut *tx, obra_id)
            .await?
            .ok_or(AppError::ObraNoEncontrada)?;

        let concepto = self
            .concepto_repo
            .get_concepto(&mut *tx, concepto_id)
            .await?
            .ok_or(AppError::RegistroNoEncontrado("Concepto"))?;
        if concepto.nivel == NivelConcepto::Abuelo {
            return Err(AppError::ConceptoNoCobrable);
        }

        let linea = self
            .concepto_repo
            .insertar_linea(&mut *tx, obra_id, concepto_id, costo_unitario, cantidad, medicion)
            .await?;
        let total = self.concepto_repo.recalcular_total(&mut *tx, obra_id).await?;

        tx.commit().await?;
        Ok((linea, total))
    }

    pub async fn eliminar_linea(&self, linea_id: i64) -> Result<Decimal, AppError> {
        let mut tx = self.pool.begin().await?;

        let obra_id = self
            .concepto_repo
            .eliminar_linea(&mut *tx, linea_id)
            .await?
            .ok_or(AppError::RegistroNoEncontrado("Concepto de obra"))?;
        let total = self.concepto_repo.recalcular_total(&mut *tx, obra_id).await?;

        tx.commit().await?;
        Ok(total)
    }
}

// Total de una línea del ledger, la misma regla que la columna generada
// `total` de obra_conceptos: costo_unitario * cantidad, ambos > 0.
fn total_linea(costo_unitario: Decimal, cantidad: Decimal) -> Option<Decimal> {
    if costo_unitario <= Decimal::ZERO || cantidad <= Decimal::ZERO {
        return None;
    }
    Some(costo_unitario * cantidad)
}

// El siguiente nivel hacia abajo en la jerarquía; Nieto ya no tiene.
fn nivel_esperado(padre: NivelConcepto) -> Option<NivelConcepto> {
    match padre {
        NivelConcepto::Abuelo => Some(NivelConcepto::Padre),
        NivelConcepto::Padre => Some(NivelConcepto::Hijo),
        NivelConcepto::Hijo => Some(NivelConcepto::Nieto),
        NivelConcepto::Nieto => None,
    }
}

fn error_de_campo(campo: &'static str, mensaje: &'static str) -> validator::ValidationErrors {
    let mut err = validator::ValidationError::new("invalido");
    err.message = Some(mensaje.into());
    let mut errors = validator::ValidationErrors::new();
    errors.add(campo.into(), err);
    errors
}

// Arma el árbol completo a partir de la lista plana del catálogo.
fn armar_arbol(conceptos: Vec<Concepto>) -> Vec<ConceptoArbol> {
    let mut por_padre: HashMap<Option<i64>, Vec<Concepto>> = HashMap::new();
    for c in conceptos {
        por_padre.entry(c.parent_id).or_default().push(c);
    }

    fn construir(
        parent: Option<i64>,
        por_padre: &HashMap<Option<i64>, Vec<Concepto>>,
    ) -> Vec<ConceptoArbol> {
        por_padre
            .get(&parent)
            .map(|hijos| {
                hijos
                    .iter()
                    .map(|c| ConceptoArbol {
                        id: c.id,
                        nivel: c.nivel,
                        clave: c.clave.clone(),
                        nombre: c.nombre.clone(),
                        unidad: c.unidad.clone(),
                        hijos: construir(Some(c.id), por_padre),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    construir(None, &por_padre)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concepto(id: i64, parent_id: Option<i64>, nivel: NivelConcepto) -> Concepto {
        Concepto {
            id,
            parent_id,
            nivel,
            clave: None,
            nombre: format!("Concepto {}", id),
            unidad: None,
        }
    }

    #[test]
    fn el_arbol_respeta_la_jerarquia() {
        let planos = vec![
            concepto(1, None, NivelConcepto::Abuelo),
            concepto(2, Some(1), NivelConcepto::Padre),
            concepto(3, Some(2), NivelConcepto::Hijo),
            concepto(4, Some(2), NivelConcepto::Hijo),
            concepto(5, None, NivelConcepto::Abuelo),
        ];

        let arbol = armar_arbol(planos);
        assert_eq!(arbol.len(), 2);
        assert_eq!(arbol[0].hijos.len(), 1);
        assert_eq!(arbol[0].hijos[0].hijos.len(), 2);
        assert!(arbol[1].hijos.is_empty());
    }

    #[test]
    fn el_total_de_la_linea_es_el_producto() {
        assert_eq!(
            total_linea(Decimal::from(100), Decimal::from(3)),
            Some(Decimal::from(300))
        );
        assert_eq!(
            total_linea(Decimal::new(1550, 2), Decimal::from(2)),
            Some(Decimal::new(3100, 2))
        );
    }

    #[test]
    fn costo_o_cantidad_no_positivos_se_rechazan() {
        assert_eq!(total_linea(Decimal::ZERO, Decimal::from(3)), None);
        assert_eq!(total_linea(Decimal::from(100), Decimal::ZERO), None);
        assert_eq!(total_linea(Decimal::from(-5), Decimal::from(1)), None);
    }

    #[test]
    fn nieto_no_puede_tener_hijos() {
        assert_eq!(nivel_esperado(NivelConcepto::Nieto), None);
        assert_eq!(
            nivel_esperado(NivelConcepto::Abuelo),
            Some(NivelConcepto::Padre)
        );
    }
}
