// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::UsuarioAutenticado,
    models::auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, RolUsuario, Usuario},
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuario registrado", body = Usuario),
        (status = 409, description = "El correo ya está registrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // Sin rol explícito se registra como CAPTURISTA, el menos privilegiado.
    let rol = payload.rol.unwrap_or(RolUsuario::Capturista);

    let usuario = app_state
        .auth_service
        .register_user(&payload.nombre, &payload.email, &payload.password, rol)
        .await?;

    Ok((StatusCode::CREATED, Json(usuario)))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Sesión iniciada", body = AuthResponse),
        (status = 401, description = "Credenciales inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (token, rol) = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token, rol }))
}

// GET /api/usuarios/me
#[utoipa::path(
    get,
    path = "/api/usuarios/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuario autenticado", body = Usuario)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(UsuarioAutenticado(usuario): UsuarioAutenticado) -> Json<Usuario> {
    Json(usuario)
}
