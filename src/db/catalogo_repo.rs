// src/db/catalogo_repo.rs
// Catálogos de referencia: colonias, directores de obra y trámites.
// Lectura frecuente, escritura ocasional desde pantallas de administración.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::catalogo::{Colonia, DirectorObra, Tramite},
};

#[derive(Clone)]
pub struct CatalogoRepository {
    pool: PgPool,
}

impl CatalogoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- COLONIAS ---

    pub async fn crear_colonia(
        &self,
        nombre: &str,
        codigo_postal: Option<&str>,
    ) -> Result<Colonia, AppError> {
        let colonia = sqlx::query_as::<_, Colonia>(
            r#"
            INSERT INTO colonias (nombre, codigo_postal)
            VALUES ($1, $2)
            RETURNING id, nombre, codigo_postal
            "#,
        )
        .bind(nombre)
        .bind(codigo_postal)
        .fetch_one(&self.pool)
        .await?;
        Ok(colonia)
    }

    pub async fn listar_colonias(&self) -> Result<Vec<Colonia>, AppError> {
        let colonias = sqlx::query_as::<_, Colonia>(
            "SELECT id, nombre, codigo_postal FROM colonias ORDER BY nombre",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(colonias)
    }

    pub async fn actualizar_colonia(
        &self,
        id: i64,
        nombre: &str,
        codigo_postal: Option<&str>,
    ) -> Result<Option<Colonia>, AppError> {
        let colonia = sqlx::query_as::<_, Colonia>(
            r#"
            UPDATE colonias SET nombre = $1, codigo_postal = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, nombre, codigo_postal
            "#,
        )
        .bind(nombre)
        .bind(codigo_postal)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(colonia)
    }

    pub async fn eliminar_colonia(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM colonias WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- DIRECTORES DE OBRA ---

    pub async fn crear_director(
        &self,
        nombre: &str,
        numero_registro: &str,
        vigencia: Option<NaiveDate>,
    ) -> Result<DirectorObra, AppError> {
        let director = sqlx::query_as::<_, DirectorObra>(
            r#"
            INSERT INTO directores_obra (nombre, numero_registro, vigencia)
            VALUES ($1, $2, $3)
            RETURNING id, nombre, numero_registro, vigencia
            "#,
        )
        .bind(nombre)
        .bind(numero_registro)
        .bind(vigencia)
        .fetch_one(&self.pool)
        .await?;
        Ok(director)
    }

    pub async fn listar_directores(&self) -> Result<Vec<DirectorObra>, AppError> {
        let directores = sqlx::query_as::<_, DirectorObra>(
            "SELECT id, nombre, numero_registro, vigencia FROM directores_obra ORDER BY nombre",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(directores)
    }

    pub async fn actualizar_director(
        &self,
        id: i64,
        nombre: &str,
        numero_registro: &str,
        vigencia: Option<NaiveDate>,
    ) -> Result<Option<DirectorObra>, AppError> {
        let director = sqlx::query_as::<_, DirectorObra>(
            r#"
            UPDATE directores_obra
            SET nombre = $1, numero_registro = $2, vigencia = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, nombre, numero_registro, vigencia
            "#,
        )
        .bind(nombre)
        .bind(numero_registro)
        .bind(vigencia)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(director)
    }

    pub async fn eliminar_director(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM directores_obra WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- TRÁMITES ---

    pub async fn crear_tramite(&self, nombre: &str, letra: &str) -> Result<Tramite, AppError> {
        let tramite = sqlx::query_as::<_, Tramite>(
            r#"
            INSERT INTO tramites (nombre, letra)
            VALUES ($1, $2)
            RETURNING id, nombre, letra
            "#,
        )
        .bind(nombre)
        .bind(letra)
        .fetch_one(&self.pool)
        .await?;
        Ok(tramite)
    }

    pub async fn listar_tramites(&self) -> Result<Vec<Tramite>, AppError> {
        let tramites = sqlx::query_as::<_, Tramite>(
            "SELECT id, nombre, letra FROM tramites ORDER BY letra",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tramites)
    }

    pub async fn actualizar_tramite(
        &self,
        id: i64,
        nombre: &str,
        letra: &str,
    ) -> Result<Option<Tramite>, AppError> {
        let tramite = sqlx::query_as::<_, Tramite>(
            r#"
            UPDATE tramites SET nombre = $1, letra = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, nombre, letra
            "#,
        )
        .bind(nombre)
        .bind(letra)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tramite)
    }

    pub async fn eliminar_tramite(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tramites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_tramite<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<Tramite>, AppError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let tramite =
            sqlx::query_as::<_, Tramite>("SELECT id, nombre, letra FROM tramites WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(tramite)
    }

    pub async fn get_director(&self, id: i64) -> Result<Option<DirectorObra>, AppError> {
        let director = sqlx::query_as::<_, DirectorObra>(
            "SELECT id, nombre, numero_registro, vigencia FROM directores_obra WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(director)
    }

    pub async fn get_colonia(&self, id: i64) -> Result<Option<Colonia>, AppError> {
        let colonia = sqlx::query_as::<_, Colonia>(
            "SELECT id, nombre, codigo_postal FROM colonias WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(colonia)
    }
}
