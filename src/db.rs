pub mod alerta_repo;
pub use alerta_repo::AlertaRepository;
pub mod catalogo_repo;
pub use catalogo_repo::CatalogoRepository;
pub mod concepto_repo;
pub use concepto_repo::ConceptoRepository;
pub mod obra_repo;
pub use obra_repo::ObraRepository;
pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
