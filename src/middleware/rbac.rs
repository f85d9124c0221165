// src/middleware/rbac.rs
//
// El rol se verifica en el SERVIDOR con el usuario que dejó auth_guard en
// los extensions. El cliente puede pintar u ocultar botones como quiera;
// la autorización real vive aquí.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{RolUsuario, Usuario},
};

/// 1. El trait que define un requisito de rol
pub trait RolRequerido: Send + Sync + 'static {
    fn permite(rol: RolUsuario) -> bool;
    fn nombre() -> &'static str;
}

/// 2. El extractor (guardián)
pub struct RequiereRol<T>(pub PhantomData<T>);

// 3. Implementación del FromRequestParts

impl<T, S> FromRequestParts<S> for RequiereRol<T>
where
    T: RolRequerido,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrae el usuario que dejó el auth_guard
        let usuario = parts
            .extensions
            .get::<Usuario>()
            .ok_or(AppError::TokenInvalido)?;

        // B. Verifica el rol
        if !T::permite(usuario.rol) {
            return Err(AppError::AccesoDenegado(format!(
                "Esta acción requiere el rol {}.",
                T::nombre()
            )));
        }

        Ok(RequiereRol(PhantomData))
    }
}

// ---
// DEFINICIÓN DE LOS REQUISITOS (TIPOS)
// ---

// ADMIN puede todo lo que puede un SUPERVISOR.

pub struct RolAdmin;
impl RolRequerido for RolAdmin {
    fn permite(rol: RolUsuario) -> bool {
        rol == RolUsuario::Admin
    }
    fn nombre() -> &'static str {
        "ADMIN"
    }
}

pub struct RolSupervisor;
impl RolRequerido for RolSupervisor {
    fn permite(rol: RolUsuario) -> bool {
        matches!(rol, RolUsuario::Admin | RolUsuario::Supervisor)
    }
    fn nombre() -> &'static str {
        "SUPERVISOR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_pasa_los_dos_requisitos() {
        assert!(RolAdmin::permite(RolUsuario::Admin));
        assert!(RolSupervisor::permite(RolUsuario::Admin));
    }

    #[test]
    fn capturista_no_pasa_ninguno() {
        assert!(!RolAdmin::permite(RolUsuario::Capturista));
        assert!(!RolSupervisor::permite(RolUsuario::Capturista));
    }

    #[test]
    fn supervisor_no_es_admin() {
        assert!(!RolAdmin::permite(RolUsuario::Supervisor));
        assert!(RolSupervisor::permite(RolUsuario::Supervisor));
    }
}
