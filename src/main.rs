use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use sqlx::postgres::PgPoolOptions;

use ticketdesk::auth::AuthMiddleware;
use ticketdesk::config::{Config, API_PREFIX};
use ticketdesk::repository::PgRepository;
use ticketdesk::routes;
use ticketdesk::state::AppState;

fn cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);

    if allowed_origins.is_empty() {
        return cors.allow_any_origin();
    }
    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            io::Error::new(io::ErrorKind::Other, e)
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            error!("Failed to apply migrations: {}", e);
            io::Error::new(io::ErrorKind::Other, e)
        })?;

    let state = web::Data::new(AppState::new(PgRepository::new(pool), config.jwt.clone()));
    let allowed_origins = config.allowed_origins.clone();

    info!("Starting ticketdesk API at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(&allowed_origins))
            .wrap(Logger::default())
            .service(
                web::scope(API_PREFIX)
                    .wrap(AuthMiddleware::new(API_PREFIX))
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
