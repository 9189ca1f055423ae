use serde::Deserialize;

/// Credential blob for the identity provider, supplied as JSON in
/// `SERVICE_ACCOUNT_KEY`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub port: u16,
    pub production: bool,
    pub service_account: Option<ServiceAccount>,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);
        let production = std::env::var("APP_ENV")
            .map(|env| env == "production")
            .unwrap_or(false);

        let service_account = match std::env::var("SERVICE_ACCOUNT_KEY") {
            Ok(raw) => parse_service_account(&raw),
            Err(_) => {
                tracing::warn!(
                    "SERVICE_ACCOUNT_KEY is not set; session login, sign-in and dashboard access are disabled"
                );
                None
            }
        };

        Config {
            database_url,
            app_url,
            port,
            production,
            service_account,
        }
    }
}

pub fn parse_service_account(raw: &str) -> Option<ServiceAccount> {
    match serde_json::from_str::<ServiceAccount>(raw) {
        Ok(account) if !account.private_key.is_empty() => Some(account),
        Ok(_) => {
            tracing::warn!("SERVICE_ACCOUNT_KEY has an empty private_key; identity features disabled");
            None
        }
        Err(e) => {
            tracing::warn!("SERVICE_ACCOUNT_KEY is not valid JSON ({}); identity features disabled", e);
            None
        }
    }
}
