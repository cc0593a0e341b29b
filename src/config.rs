use crate::services::auth_service::JwtSettings;
use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_ttl_secs: i64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Campus parking-spot management API")]
pub struct Args {
    /// Host to bind to (overrides PARKING_API_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PARKING_API_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides PARKING_API_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Token signing secret (overrides PARKING_API_JWT_SECRET)
    #[arg(long)]
    pub jwt_secret: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("PARKING_API_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PARKING_API_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PARKING_API_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading PARKING_API_PORT"),
        };
        let env_db = env::var("PARKING_API_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/parking_api.db".into());
        let env_secret =
            env::var("PARKING_API_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
        let jwt_issuer =
            env::var("PARKING_API_JWT_ISSUER").unwrap_or_else(|_| "parking-api".into());
        let jwt_audience = env::var("PARKING_API_JWT_AUDIENCE")
            .unwrap_or_else(|_| "parking-api-clients".into());
        let token_ttl_secs = match env::var("PARKING_API_TOKEN_TTL_SECS") {
            Ok(value) => value
                .parse::<i64>()
                .with_context(|| format!("parsing PARKING_API_TOKEN_TTL_SECS value `{}`", value))?,
            Err(env::VarError::NotPresent) => 7200,
            Err(err) => return Err(err).context("reading PARKING_API_TOKEN_TTL_SECS"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            jwt_secret: args.jwt_secret.unwrap_or(env_secret),
            jwt_issuer,
            jwt_audience,
            token_ttl_secs,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn jwt(&self) -> JwtSettings {
        JwtSettings {
            secret: self.jwt_secret.clone(),
            issuer: self.jwt_issuer.clone(),
            audience: self.jwt_audience.clone(),
            token_ttl_secs: self.token_ttl_secs,
        }
    }
}
