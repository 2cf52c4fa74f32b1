use actix_web::{middleware, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::time::Duration;

use comic_collection_backend::app_config::AppConfig;
use comic_collection_backend::auth::ServerKey;
use comic_collection_backend::{api, json_config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config =
        AppConfig::from_env().map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let pool = PgPoolOptions::new()
        .max_connections(50)
        .min_connections(10)
        .max_lifetime(Duration::from_secs(3600))
        .connect(&config.database_url)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let server_key = ServerKey::from_secret(&config.jwt_secret);

    log::info!("listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(server_key.clone()))
            .app_data(json_config())
            .wrap(middleware::Logger::default())
            .configure(api::routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
