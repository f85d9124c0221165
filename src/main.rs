//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() está bien aquí: si la configuración falla, la aplicación
    // no debe arrancar.
    let app_state = AppState::new()
        .await
        .expect("Falla al inicializar el estado de la aplicación.");

    // Corre las migraciones de SQLx al arrancar
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falla al correr las migraciones de la base de datos.");

    tracing::info!("✅ Migraciones de la base de datos ejecutadas");

    // Rutas de autenticación (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let usuario_routes = Router::new().route("/me", get(handlers::auth::get_me));

    // El expediente completo cuelga de /api/obras
    let obra_routes = Router::new()
        .route(
            "/",
            post(handlers::obras::crear_obra).get(handlers::obras::listar_obras),
        )
        .route(
            "/{id}",
            get(handlers::obras::get_obra).put(handlers::obras::actualizar_obra),
        )
        .route("/{id}/calles", get(handlers::obras::get_calles))
        .route("/{id}/tramite", put(handlers::obras::asignar_tramite))
        .route(
            "/{id}/verificacion",
            put(handlers::obras::guardar_verificacion),
        )
        .route("/{id}/estado", put(handlers::obras::cambiar_estado))
        .route("/{id}/destinos", get(handlers::obras::destinos))
        .route("/{id}/pasos", get(handlers::obras::pasos))
        .route(
            "/{id}/lugares-recibidos",
            get(handlers::obras::get_lugares).put(handlers::obras::actualizar_lugares),
        )
        .route(
            "/{id}/conceptos",
            get(handlers::conceptos::listar_lineas).post(handlers::conceptos::agregar_linea),
        )
        .route(
            "/{id}/alertas",
            get(handlers::alertas::listar_alertas).post(handlers::alertas::crear_alerta),
        )
        .route(
            "/{id}/documentos/{tipo}",
            get(handlers::documentos::generar_documento),
        );

    let concepto_routes = Router::new()
        .route(
            "/",
            get(handlers::conceptos::hijos).post(handlers::conceptos::crear_concepto),
        )
        .route("/arbol", get(handlers::conceptos::arbol))
        .route("/lineas/{id}", delete(handlers::conceptos::eliminar_linea));

    let alerta_routes = Router::new().route(
        "/{id}",
        put(handlers::alertas::actualizar_alerta).delete(handlers::alertas::eliminar_alerta),
    );

    let catalogo_routes = Router::new()
        .route(
            "/colonias",
            get(handlers::catalogos::listar_colonias).post(handlers::catalogos::crear_colonia),
        )
        .route(
            "/colonias/{id}",
            put(handlers::catalogos::actualizar_colonia)
                .delete(handlers::catalogos::eliminar_colonia),
        )
        .route(
            "/directores",
            get(handlers::catalogos::listar_directores).post(handlers::catalogos::crear_director),
        )
        .route(
            "/directores/{id}",
            put(handlers::catalogos::actualizar_director)
                .delete(handlers::catalogos::eliminar_director),
        )
        .route(
            "/tramites",
            get(handlers::catalogos::listar_tramites).post(handlers::catalogos::crear_tramite),
        )
        .route(
            "/tramites/{id}",
            put(handlers::catalogos::actualizar_tramite)
                .delete(handlers::catalogos::eliminar_tramite),
        )
        .route(
            "/tramites/{id}/conceptos",
            get(handlers::catalogos::conceptos_de_tramite),
        );

    // Todo lo que no es login/registro pasa por el auth_guard
    let protected = Router::new()
        .nest("/api/usuarios", usuario_routes)
        .nest("/api/obras", obra_routes)
        .nest("/api/conceptos", concepto_routes)
        .nest("/api/alertas", alerta_routes)
        .nest("/api/catalogos", catalogo_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falla al iniciar el listener TCP");
    tracing::info!("🚀 Servidor escuchando en {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Error en el servidor Axum");
}
