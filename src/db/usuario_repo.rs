// src/db/usuario_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{RolUsuario, Usuario},
};

const USUARIO_COLS: &str = "id, nombre, email, password_hash, rol, created_at";

#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn crear_usuario(
        &self,
        nombre: &str,
        email: &str,
        password_hash: &str,
        rol: RolUsuario,
    ) -> Result<Usuario, AppError> {
        let sql = format!(
            r#"
            INSERT INTO usuarios (nombre, email, password_hash, rol)
            VALUES ($1, $2, $3, $4)
            RETURNING {USUARIO_COLS}
            "#
        );
        let usuario = sqlx::query_as::<_, Usuario>(&sql)
            .bind(nombre)
            .bind(email)
            .bind(password_hash)
            .bind(rol)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                // La restricción UNIQUE de email se traduce a un 409 claro.
                sqlx::Error::Database(db) if db.is_unique_violation() => AppError::EmailYaExiste,
                _ => AppError::DatabaseError(e),
            })?;
        Ok(usuario)
    }

    pub async fn buscar_por_email(&self, email: &str) -> Result<Option<Usuario>, AppError> {
        let sql = format!("SELECT {USUARIO_COLS} FROM usuarios WHERE email = $1");
        let usuario = sqlx::query_as::<_, Usuario>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }

    pub async fn buscar_por_id(&self, id: Uuid) -> Result<Option<Usuario>, AppError> {
        let sql = format!("SELECT {USUARIO_COLS} FROM usuarios WHERE id = $1");
        let usuario = sqlx::query_as::<_, Usuario>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }
}
