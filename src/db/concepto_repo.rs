// src/db/concepto_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::concepto::{
        Concepto, NivelConcepto, ObraConcepto, ObraConceptoDetalle, TramiteConcepto,
    },
};

const CONCEPTO_COLS: &str = "id, parent_id, nivel, clave, nombre, unidad";

const LINEA_COLS: &str =
    "id, obra_id, concepto_id, costo_unitario, cantidad, medicion, total, created_at";

#[derive(Clone)]
pub struct ConceptoRepository {
    pool: PgPool,
}

impl ConceptoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATÁLOGO (jerarquía de 4 niveles)
    // =========================================================================

    pub async fn listar_todos(&self) -> Result<Vec<Concepto>, AppError> {
        let sql = format!("SELECT {CONCEPTO_COLS} FROM conceptos ORDER BY parent_id NULLS FIRST, id");
        let conceptos = sqlx::query_as::<_, Concepto>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(conceptos)
    }

    // Hijos directos; parent_id = NULL devuelve los 'Abuelo' raíz.
    pub async fn hijos(&self, parent_id: Option<i64>) -> Result<Vec<Concepto>, AppError> {
        let sql = format!(
            r#"
            SELECT {CONCEPTO_COLS} FROM conceptos
            WHERE ($1::bigint IS NULL AND parent_id IS NULL) OR parent_id = $1
            ORDER BY id
            "#
        );
        let conceptos = sqlx::query_as::<_, Concepto>(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(conceptos)
    }

    pub async fn get_concepto<'e, E>(
        &self,
        executor: E,
        concepto_id: i64,
    ) -> Result<Option<Concepto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CONCEPTO_COLS} FROM conceptos WHERE id = $1");
        let concepto = sqlx::query_as::<_, Concepto>(&sql)
            .bind(concepto_id)
            .fetch_optional(executor)
            .await?;
        Ok(concepto)
    }

    // Descendientes hoja de un concepto (para expandir un 'Abuelo' al sembrar:
    // solo las hojas pueden cobrarse).
    pub async fn descendientes_hoja<'e, E>(
        &self,
        executor: E,
        concepto_id: i64,
    ) -> Result<Vec<Concepto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conceptos = sqlx::query_as::<_, Concepto>(
            r#"
            WITH RECURSIVE rama AS (
                SELECT id, parent_id, nivel, clave, nombre, unidad
                FROM conceptos WHERE id = $1
                UNION ALL
                SELECT c.id, c.parent_id, c.nivel, c.clave, c.nombre, c.unidad
                FROM conceptos c JOIN rama r ON c.parent_id = r.id
            )
            SELECT id, parent_id, nivel, clave, nombre, unidad FROM rama
            WHERE id <> $1
              AND NOT EXISTS (SELECT 1 FROM conceptos h WHERE h.parent_id = rama.id)
            ORDER BY id
            "#,
        )
        .bind(concepto_id)
        .fetch_all(executor)
        .await?;
        Ok(conceptos)
    }

    pub async fn crear_concepto(
        &self,
        parent_id: Option<i64>,
        nivel: NivelConcepto,
        clave: Option<&str>,
        nombre: &str,
        unidad: Option<&str>,
    ) -> Result<Concepto, AppError> {
        let sql = format!(
            r#"
            INSERT INTO conceptos (parent_id, nivel, clave, nombre, unidad)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CONCEPTO_COLS}
            "#
        );
        let concepto = sqlx::query_as::<_, Concepto>(&sql)
            .bind(parent_id)
            .bind(nivel)
            .bind(clave)
            .bind(nombre)
            .bind(unidad)
            .fetch_one(&self.pool)
            .await?;
        Ok(concepto)
    }

    // =========================================================================
    //  LEDGER DE UNA OBRA
    // =========================================================================

    pub async fn insertar_linea<'e, E>(
        &self,
        executor: E,
        obra_id: i64,
        concepto_id: i64,
        costo_unitario: Decimal,
        cantidad: Decimal,
        medicion: Option<&str>,
    ) -> Result<ObraConcepto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO obra_conceptos (obra_id, concepto_id, costo_unitario, cantidad, medicion)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {LINEA_COLS}
            "#
        );
        let linea = sqlx::query_as::<_, ObraConcepto>(&sql)
            .bind(obra_id)
            .bind(concepto_id)
            .bind(costo_unitario)
            .bind(cantidad)
            .bind(medicion)
            .fetch_one(executor)
            .await?;
        Ok(linea)
    }

    // Devuelve el obra_id de la línea borrada para recalcular su total.
    pub async fn eliminar_linea<'e, E>(
        &self,
        executor: E,
        linea_id: i64,
    ) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let obra_id: Option<i64> =
            sqlx::query_scalar("DELETE FROM obra_conceptos WHERE id = $1 RETURNING obra_id")
                .bind(linea_id)
                .fetch_optional(executor)
                .await?;
        Ok(obra_id)
    }

    pub async fn listar_lineas(&self, obra_id: i64) -> Result<Vec<ObraConceptoDetalle>, AppError> {
        let lineas = sqlx::query_as::<_, ObraConceptoDetalle>(
            r#"
            SELECT
                oc.id, oc.obra_id, oc.concepto_id,
                c.nombre AS concepto_nombre, c.unidad,
                oc.costo_unitario, oc.cantidad, oc.medicion, oc.total
            FROM obra_conceptos oc
            JOIN conceptos c ON c.id = oc.concepto_id
            WHERE oc.obra_id = $1
            ORDER BY oc.id
            "#,
        )
        .bind(obra_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lineas)
    }

    pub async fn contar_lineas<'e, E>(&self, executor: E, obra_id: i64) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM obra_conceptos WHERE obra_id = $1")
                .bind(obra_id)
                .fetch_one(executor)
                .await?;
        Ok(total)
    }

    // Recalcula y actualiza en UNA sola query, dentro de la misma transacción
    // que mutó el ledger. El total de la obra no puede quedar desfasado.
    pub async fn recalcular_total<'e, E>(
        &self,
        executor: E,
        obra_id: i64,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: Decimal = sqlx::query_scalar(
            r#"
            UPDATE obras
            SET total_conceptos = (
                SELECT COALESCE(SUM(total), 0)
                FROM obra_conceptos
                WHERE obra_conceptos.obra_id = obras.id
            ),
            updated_at = NOW()
            WHERE id = $1
            RETURNING total_conceptos
            "#,
        )
        .bind(obra_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    // =========================================================================
    //  CONCEPTOS PREDEFINIDOS DE UN TRÁMITE
    // =========================================================================

    pub async fn conceptos_de_tramite<'e, E>(
        &self,
        executor: E,
        tramite_id: i64,
    ) -> Result<Vec<TramiteConcepto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let semillas = sqlx::query_as::<_, TramiteConcepto>(
            r#"
            SELECT id, tramite_id, concepto_id, costo_unitario, cantidad
            FROM tramites_conceptos
            WHERE tramite_id = $1
            ORDER BY id
            "#,
        )
        .bind(tramite_id)
        .fetch_all(executor)
        .await?;
        Ok(semillas)
    }
}
