// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        AlertaRepository, CatalogoRepository, ConceptoRepository, ObraRepository,
        UsuarioRepository,
    },
    services::{AuthService, ConceptoService, DocumentoService, ObraService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub obra_service: ObraService,
    pub concepto_service: ConceptoService,
    pub documento_service: DocumentoService,
    // Repositorios de acceso directo desde los handlers delgados
    pub alerta_repo: AlertaRepository,
    pub catalogo_repo: CatalogoRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida");

        // --- Arma el grafo de dependencias ---
        let usuario_repo = UsuarioRepository::new(db_pool.clone());
        let obra_repo = ObraRepository::new(db_pool.clone());
        let concepto_repo = ConceptoRepository::new(db_pool.clone());
        let alerta_repo = AlertaRepository::new(db_pool.clone());
        let catalogo_repo = CatalogoRepository::new(db_pool.clone());

        let auth_service = AuthService::new(usuario_repo, jwt_secret);
        let obra_service = ObraService::new(
            obra_repo.clone(),
            concepto_repo.clone(),
            alerta_repo.clone(),
            catalogo_repo.clone(),
            db_pool.clone(),
        );
        let concepto_service = ConceptoService::new(
            concepto_repo.clone(),
            obra_repo.clone(),
            db_pool.clone(),
        );
        let documento_service = DocumentoService::new(
            obra_repo,
            concepto_repo,
            alerta_repo.clone(),
            catalogo_repo.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            auth_service,
            obra_service,
            concepto_service,
            documento_service,
            alerta_repo,
            catalogo_repo,
        })
    }
}
