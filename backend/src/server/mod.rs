//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::AppSettings;

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite, time::Duration};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use smartpark::Trace;
#[cfg(debug_assertions)]
use smartpark::doc::ApiDoc;
use smartpark::inbound::http::admin::{login, logout};
use smartpark::inbound::http::admin_distances::{
    MAX_UPLOAD_BYTES, materialize_distances, stage_distances,
};
use smartpark::inbound::http::admin_tables::{
    delete_row, insert_row, list_tables, table_form, table_keys, table_rows, table_schema,
    update_row,
};
use smartpark::inbound::http::catalogue::{list_buildings, list_permits, lots_preview};
use smartpark::inbound::http::health::{HealthState, live, ready};
use smartpark::inbound::http::recommendations::recommend_lots;
use smartpark::inbound::http::state::HttpState;
use smartpark::inbound::http::validation::{json_config, query_config};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

/// Signed, encrypted cookie session holding the admin login for two hours.
fn session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(Duration::hours(2)))
        .build()
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session_middleware(key, cookie_secure, same_site))
        .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .app_data(json_config())
        .app_data(query_config())
        .service(list_buildings)
        .service(list_permits)
        .service(lots_preview)
        .service(recommend_lots)
        .service(login)
        .service(logout)
        .service(list_tables)
        .service(table_schema)
        .service(table_form)
        .service(table_rows)
        .service(table_keys)
        .service(insert_row)
        .service(update_row)
        .service(delete_row)
        .service(stage_distances)
        .service(materialize_distances);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        database_url: _,
        staging_plan: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
