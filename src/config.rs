use std::env;
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,

    /// Directory tracing-appender writes its rolling daily log into.
    pub log_dir: String,
    pub log_file: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "app.log".to_string()),
        }
    }
}
