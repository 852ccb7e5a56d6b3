use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub storage: StorageConfig,
}

/// Zone-based object storage endpoint (files land at
/// `{endpoint}/{zone}/{path}` and are served from `{public_base_url}/{path}`).
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub api_key: String,
    pub zone: String,
    pub endpoint: String,
    pub public_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let storage = StorageConfig {
            api_key: env::var("STORAGE_API_KEY")?,
            zone: env::var("STORAGE_ZONE")?,
            endpoint: env::var("STORAGE_ENDPOINT")?,
            public_base_url: env::var("STORAGE_PUBLIC_URL")?,
        };
        Ok(Self {
            database_url,
            jwt_secret,
            host,
            port,
            storage,
        })
    }
}
