use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub gateway_url: String,
    pub gateway_token: String,
    pub gateway_callback_url: String,
    pub registry_url: String,
    pub credentials_ttl_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let gateway_url = env::var("APPYPAY_URL")
            .unwrap_or_else(|_| "https://gpo.appypay.co.ao/v1".to_string());
        let gateway_token = env::var("APPYPAY_TOKEN").unwrap_or_default();
        let gateway_callback_url = env::var("APPYPAY_CALLBACK_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/webhooks/appypay".to_string());
        let registry_url = env::var("NIF_REGISTRY_URL")
            .unwrap_or_else(|_| "https://consulta.minfin.gov.ao".to_string());
        let credentials_ttl_secs = env::var("GATEWAY_CREDENTIALS_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(3300);
        Ok(Self {
            port,
            database_url,
            host,
            gateway_url,
            gateway_token,
            gateway_callback_url,
            registry_url,
            credentials_ttl_secs,
        })
    }
}
