use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDB { database_url: String },
    /// Process-local documents, lost on restart
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailgunConfig {
    pub base_url: String,
    pub domain: String,
    pub api_key: String,
    pub from: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    /// None logs mails instead of sending them
    pub mailgun: Option<MailgunConfig>,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from the environment (and `.env` when present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port_raw = var("PORT").unwrap_or_else(|| "5000".to_string());
        let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "PORT",
            value: port_raw.clone(),
        })?;

        let store = match var("STORE_BACKEND").as_deref().unwrap_or("mongodb") {
            "mongodb" => StoreBackend::MongoDB {
                database_url: var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let mailgun = match (var("MAILGUN_API_KEY"), var("MAILGUN_DOMAIN")) {
            (Some(api_key), Some(domain)) => Some(MailgunConfig {
                base_url: var("MAILGUN_BASE_URL").unwrap_or_else(|| "https://api.mailgun.net".to_string()),
                from: var("MAIL_FROM").unwrap_or_else(|| format!("Warsjawa <noreply@{}>", domain)),
                domain,
                api_key,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("MAILGUN_DOMAIN")),
            (None, Some(_)) => return Err(ConfigError::Missing("MAILGUN_API_KEY")),
        };

        let cors_origins = var("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            store,
            mailgun,
            cors_origins,
        })
    }
}
