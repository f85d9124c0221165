// src/db/alerta_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::alerta::{Alerta, TipoDocumento},
};

const ALERTA_COLS: &str = "id, obra_id, tipo_documento, mensaje, creada_por, created_at";

#[derive(Clone)]
pub struct AlertaRepository {
    pool: PgPool,
}

impl AlertaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn crear(
        &self,
        obra_id: i64,
        tipo_documento: TipoDocumento,
        mensaje: &str,
        creada_por: Uuid,
    ) -> Result<Alerta, AppError> {
        let sql = format!(
            r#"
            INSERT INTO alertas (obra_id, tipo_documento, mensaje, creada_por)
            VALUES ($1, $2, $3, $4)
            RETURNING {ALERTA_COLS}
            "#
        );
        let alerta = sqlx::query_as::<_, Alerta>(&sql)
            .bind(obra_id)
            .bind(tipo_documento)
            .bind(mensaje)
            .bind(creada_por)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                // La restricción UNIQUE (obra_id, tipo_documento) se traduce a un 409 claro.
                sqlx::Error::Database(db) if db.is_unique_violation() => AppError::AlertaYaExiste,
                _ => AppError::DatabaseError(e),
            })?;
        Ok(alerta)
    }

    pub async fn actualizar_mensaje(
        &self,
        alerta_id: i64,
        mensaje: &str,
    ) -> Result<Option<Alerta>, AppError> {
        let sql = format!(
            "UPDATE alertas SET mensaje = $1 WHERE id = $2 RETURNING {ALERTA_COLS}"
        );
        let alerta = sqlx::query_as::<_, Alerta>(&sql)
            .bind(mensaje)
            .bind(alerta_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(alerta)
    }

    pub async fn eliminar(&self, alerta_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM alertas WHERE id = $1")
            .bind(alerta_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn listar_por_obra(&self, obra_id: i64) -> Result<Vec<Alerta>, AppError> {
        let sql = format!("SELECT {ALERTA_COLS} FROM alertas WHERE obra_id = $1 ORDER BY id");
        let alertas = sqlx::query_as::<_, Alerta>(&sql)
            .bind(obra_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(alertas)
    }

    // El candado puntual: ¿hay alerta para (obra, tipo de documento)?
    pub async fn buscar<'e, E>(
        &self,
        executor: E,
        obra_id: i64,
        tipo_documento: TipoDocumento,
    ) -> Result<Option<Alerta>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {ALERTA_COLS} FROM alertas WHERE obra_id = $1 AND tipo_documento = $2"
        );
        let alerta = sqlx::query_as::<_, Alerta>(&sql)
            .bind(obra_id)
            .bind(tipo_documento)
            .fetch_optional(executor)
            .await?;
        Ok(alerta)
    }

    // Cuántas alertas vigentes tiene la obra (cualquier tipo de documento);
    // la conclusión se rechaza mientras sea > 0.
    pub async fn contar_por_obra<'e, E>(&self, executor: E, obra_id: i64) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alertas WHERE obra_id = $1")
            .bind(obra_id)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }
}
