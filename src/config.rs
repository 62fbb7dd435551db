use std::env;

/// Application configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8081);

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://music_catalogue.db?mode=rwc".into());

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET is required"))?;

        let spotify_client_id = env::var("SPOTIFY_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("SPOTIFY_CLIENT_ID is required"))?;

        let spotify_client_secret = env::var("SPOTIFY_CLIENT_SECRET")
            .map_err(|_| anyhow::anyhow!("SPOTIFY_CLIENT_SECRET is required"))?;

        Ok(Self {
            port,
            database_url,
            jwt_secret,
            spotify_client_id,
            spotify_client_secret,
        })
    }
}
