//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::AppSettings;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use campussphere::Trace;
#[cfg(debug_assertions)]
use campussphere::doc::ApiDoc;
use campussphere::inbound::http::accounts::{login, register};
use campussphere::inbound::http::communities::{
    create_community, get_community, join_community, list_communities,
};
use campussphere::inbound::http::content::{
    create_comment, create_post, list_comments, list_posts,
};
use campussphere::inbound::http::error::{json_error_handler, path_error_handler};
use campussphere::inbound::http::health::{HealthState, live, ready};
use campussphere::inbound::http::state::HttpState;
use campussphere::inbound::http::votes::submit_vote;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Assemble the application: `/api/v1` routes, health checks, tracing, and docs.
pub(crate) fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(register)
        .service(login)
        .service(list_communities)
        .service(create_community)
        .service(get_community)
        .service(join_community)
        .service(list_posts)
        .service(create_post)
        .service(list_comments)
        .service(create_comment)
        .service(submit_vote);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when the security adapters reject their
/// configuration or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;

    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(actix_web::middleware::Condition::from_option(
            prometheus.clone(),
        ));

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
