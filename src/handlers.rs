pub mod alertas;
pub mod auth;
pub mod catalogos;
pub mod conceptos;
pub mod documentos;
pub mod obras;
