use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret. `None` does not block startup, but every token
    /// operation fails until it is set; startup logs this loudly.
    pub token_secret: Option<String>,
    pub token_expiry_secs: i64,
}

/// Optional bootstrap admin, applied only when the users table is empty.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3001".to_string())
                    .parse()?,
            },
            database: DatabaseConfig {
                path: env::var("DATABASE_PATH").unwrap_or_else(|_| "keyplan.db".to_string()),
            },
            auth: AuthConfig {
                token_secret: env::var("ACCESS_TOKEN_SECRET").ok(),
                token_expiry_secs: env::var("TOKEN_EXPIRY_SECS")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()?,
            },
            seed: SeedConfig {
                admin_email: env::var("ADMIN_EMAIL").ok(),
                admin_password: env::var("ADMIN_PASSWORD").ok(),
            },
        })
    }
}
