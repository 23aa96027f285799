use std::{env, time::Duration};

use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

const DEV_JWT_SECRET: &str = "dev_secret_key_change_in_production";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub autosave_interval_secs: u64,
    pub cors_allowed_origin: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "ielts-mock-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            ),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            autosave_interval_secs: env::var("AUTOSAVE_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|s: &u64| *s > 0)
                .unwrap_or(30),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    /// Rejects configuration that must never reach production.
    pub fn validate_for_production(&self) -> AppResult<()> {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEV_JWT_SECRET {
            return Err(AppError::ValidationError(
                "JWT_SECRET is using the development default".to_string(),
            ));
        }

        if jwt_secret.len() < 32 {
            return Err(AppError::ValidationError(format!(
                "JWT_SECRET is too short ({}); at least 32 characters are required",
                jwt_secret.len()
            )));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "ielts-mock-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            autosave_interval_secs: 1,
            cors_allowed_origin: "http://localhost:3000".to_string(),
        }
    }
}
