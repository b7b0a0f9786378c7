use envconfig::Envconfig;
use lazy_static::lazy_static;

/// Listen port used when `PORT` is unset or empty.
pub const DEFAULT_PORT: &str = "8080";

#[derive(Debug, Envconfig)]
pub struct Config {
    /// Raw value of `PORT`; use [`Config::resolved_port`] instead of reading
    /// this directly, the push transport leaves it empty on some platforms.
    #[envconfig(from = "PORT", default = "")]
    pub port: String,
    #[envconfig(from = "AUTOLOAD_HOST", default = "0.0.0.0")]
    pub host: String,
    #[envconfig(from = "AUTOLOAD_LOG_LEVEL", default = "info")]
    pub log_level: String,
    /// Base URL of the load engine; point at an emulator in development.
    #[envconfig(from = "BIGQUERY_ENDPOINT", default = "https://bigquery.googleapis.com")]
    pub engine_endpoint: String,
    /// Static bearer token attached to engine requests when non-empty.
    /// Credential acquisition is owned by the deployment environment.
    #[envconfig(from = "BIGQUERY_ACCESS_TOKEN", default = "")]
    pub access_token: String,
}

impl Config {
    pub fn init() -> Config {
        Config::init_from_env().expect("Failed to load config")
    }

    /// `PORT` with the unset-or-empty fallback applied.
    pub fn resolved_port(&self) -> &str {
        if self.port.is_empty() {
            DEFAULT_PORT
        } else {
            &self.port
        }
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::init();
}
