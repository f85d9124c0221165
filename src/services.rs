pub mod auth;
pub use auth::AuthService;
pub mod concepto_service;
pub use concepto_service::ConceptoService;
pub mod documento_service;
pub use documento_service::DocumentoService;
pub mod lifecycle;
pub mod obra_service;
pub use obra_service::ObraService;
