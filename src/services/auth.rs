// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UsuarioRepository,
    models::auth::{Claims, RolUsuario, Usuario},
};

#[derive(Clone)]
pub struct AuthService {
    usuario_repo: UsuarioRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(usuario_repo: UsuarioRepository, jwt_secret: String) -> Self {
        Self {
            usuario_repo,
            jwt_secret,
        }
    }

    pub async fn register_user(
        &self,
        nombre: &str,
        email: &str,
        password: &str,
        rol: RolUsuario,
    ) -> Result<Usuario, AppError> {
        // El hashing es costoso: va a un thread aparte para no bloquear el runtime.
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falla en la task de hashing: {}", e))??;

        let usuario = self
            .usuario_repo
            .crear_usuario(nombre, email, &hashed_password, rol)
            .await?;

        tracing::info!("👤 Usuario registrado: {} ({:?})", usuario.email, usuario.rol);
        Ok(usuario)
    }

    pub async fn login_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, RolUsuario), AppError> {
        let usuario = self
            .usuario_repo
            .buscar_por_email(email)
            .await?
            .ok_or(AppError::CredencialesInvalidas)?;

        let password_clone = password.to_owned();
        let password_hash_clone = usuario.password_hash.clone();

        // La verificación también corre en un thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falla en la task de verificación: {}", e))??;

        if !is_password_valid {
            return Err(AppError::CredencialesInvalidas);
        }

        let token = self.create_token(&usuario)?;
        Ok((token, usuario.rol))
    }

    // El rol autoritativo se relee de la base en cada petición:
    // un token viejo no conserva privilegios que ya se quitaron.
    pub async fn validate_token(&self, token: &str) -> Result<Usuario, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::TokenInvalido)?;

        self.usuario_repo
            .buscar_por_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::RegistroNoEncontrado("Usuario"))
    }

    fn create_token(&self, usuario: &Usuario) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(12);

        let claims = Claims {
            sub: usuario.id,
            rol: usuario.rol,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
