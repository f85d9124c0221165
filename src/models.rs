pub mod alerta;
pub mod auth;
pub mod catalogo;
pub mod concepto;
pub mod obra;
