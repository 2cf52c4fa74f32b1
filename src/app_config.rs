use anyhow::Context;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<AppConfig> {
        let host = env::var("HOST").unwrap_or_else(|_| "localhost".to_owned());
        let port = env::var("PORT")
            .map(|x| x.parse::<u16>())
            .unwrap_or(Ok(3000))
            .context("PORT")?;
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET")?;

        Ok(AppConfig {
            host,
            port,
            database_url,
            jwt_secret,
        })
    }
}
