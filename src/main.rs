use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use ielts_mock_server::{
    app_state::AppState, config::Config, graphql::create_schema, handlers,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if let Err(err) = config.validate_for_production() {
        log::warn!("{}", err);
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let allowed_origin = config.cors_allowed_origin.clone();

    let state = AppState::new(config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let schema = create_schema(state.clone());

    log::info!("Starting HTTP server on {}:{}", host, port);
    log::info!("GraphiQL playground: http://{}:{}/graphiql", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(schema.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
