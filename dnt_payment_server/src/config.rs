use std::env;

use log::*;
use omise_tools::OmiseConfig;

const DEFAULT_DNT_HOST: &str = "127.0.0.1";
const DEFAULT_DNT_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Public base URL of this server, used to build the gateway return URLs. Must be reachable
    /// by the user's browser, not just by the gateway.
    pub public_url: String,
    /// Seller details printed on receipts.
    pub company: CompanyInfo,
    pub omise: OmiseConfig,
}

#[derive(Clone, Debug)]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
    /// Thai VAT registration (tax payer) id.
    pub tax_id: String,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        Self {
            name: "Daily News Thailand Co., Ltd.".to_string(),
            address: "Bangkok, Thailand".to_string(),
            tax_id: "0000000000000".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DNT_HOST.to_string(),
            port: DEFAULT_DNT_PORT,
            database_url: String::default(),
            public_url: format!("http://{DEFAULT_DNT_HOST}:{DEFAULT_DNT_PORT}"),
            company: CompanyInfo::default(),
            omise: OmiseConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("DNT_HOST").ok().unwrap_or_else(|| DEFAULT_DNT_HOST.into());
        let port = env::var("DNT_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for DNT_PORT. {e} Using the default, {DEFAULT_DNT_PORT}, instead."
                    );
                    DEFAULT_DNT_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_DNT_PORT);
        let database_url = env::var("DNT_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ DNT_DATABASE_URL is not set. Please set it to the URL for the DNT database.");
            String::default()
        });
        let public_url = env::var("DNT_PUBLIC_URL").ok().unwrap_or_else(|| {
            let url = format!("http://{host}:{port}");
            warn!("🪛️ DNT_PUBLIC_URL is not set. Defaulting to {url}. Gateway redirects will not work from outside.");
            url
        });
        let company = CompanyInfo {
            name: env::var("DNT_COMPANY_NAME").ok().unwrap_or_else(|| CompanyInfo::default().name),
            address: env::var("DNT_COMPANY_ADDRESS").ok().unwrap_or_else(|| CompanyInfo::default().address),
            tax_id: env::var("DNT_COMPANY_TAX_ID").ok().unwrap_or_else(|| CompanyInfo::default().tax_id),
        };
        let omise = OmiseConfig::new_from_env_or_default();
        Self { host, port, database_url, public_url, company, omise }
    }
}
