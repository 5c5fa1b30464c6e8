//! Process configuration, read once from the environment (and `.env`).

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub cache_namespace: String,
    pub cache_sweep_interval: Duration,
    pub store_cors: Vec<String>,
    pub admin_cors: Vec<String>,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub otp: OtpConfig,
    pub smsc: Option<SmscConfig>,
    pub default_region: String,
    pub geo_country_header: String,
    pub region_refresh_interval: Duration,
    pub nats_url: Option<String>,
    pub admin_api_key: Option<String>,
    pub swagger_static_path: Option<String>,
}

#[derive(Clone, Debug)]
pub struct OtpConfig {
    pub ttl: Duration,
    pub code_length: usize,
    pub test_mode: bool,
    pub test_code: String,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self { ttl: Duration::from_secs(300), code_length: 6, test_mode: false, test_code: "123456".into() }
    }
}

#[derive(Clone, Debug)]
pub struct SmscConfig {
    pub base_url: String,
    pub login: String,
    pub password: String,
    pub sender: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "supersecret".to_string()
        });

        let smsc = match (var("SMSC_LOGIN"), var("SMSC_PASSWORD")) {
            (Some(login), Some(password)) => Some(SmscConfig {
                base_url: var("SMSC_BASE_URL").unwrap_or_else(|| "https://smsc.ru".into()),
                login,
                password,
                sender: var("SMSC_SENDER"),
            }),
            _ => None,
        };

        Ok(Self {
            port: parse_or(&var, "PORT", 9000)?,
            database_url: var("DATABASE_URL"),
            redis_url: var("REDIS_URL"),
            cache_namespace: var("CACHE_NAMESPACE").unwrap_or_else(|| "storefront".into()),
            cache_sweep_interval: Duration::from_secs(parse_or(&var, "CACHE_SWEEP_SECS", 60)?),
            store_cors: list(var("STORE_CORS")),
            admin_cors: list(var("ADMIN_CORS")),
            jwt_secret,
            jwt_ttl: Duration::from_secs(parse_or(&var, "JWT_TTL_SECS", 7 * 24 * 3600)?),
            otp: OtpConfig {
                ttl: Duration::from_secs(parse_or(&var, "OTP_TTL_SECS", 300)?),
                code_length: parse_or(&var, "OTP_CODE_LENGTH", 6)?,
                test_mode: parse_or(&var, "OTP_TEST_MODE", false)?,
                test_code: var("OTP_TEST_CODE").unwrap_or_else(|| "123456".into()),
            },
            smsc,
            default_region: var("DEFAULT_REGION").unwrap_or_else(|| "us".into()).to_lowercase(),
            geo_country_header: var("GEO_COUNTRY_HEADER").unwrap_or_else(|| "x-vercel-ip-country".into()).to_lowercase(),
            region_refresh_interval: Duration::from_secs(parse_or(&var, "REGION_REFRESH_SECS", 3600)?),
            nats_url: var("NATS_URL"),
            admin_api_key: var("ADMIN_API_KEY"),
            swagger_static_path: var("SWAGGER_STATIC_PATH"),
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw.parse().with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

fn list(raw: Option<String>) -> Vec<String> {
    raw.map(|r| r.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = load(&[]).unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.otp.ttl, Duration::from_secs(300));
        assert_eq!(c.otp.code_length, 6);
        assert!(!c.otp.test_mode);
        assert_eq!(c.default_region, "us");
        assert_eq!(c.geo_country_header, "x-vercel-ip-country");
        assert_eq!(c.region_refresh_interval, Duration::from_secs(3600));
        assert!(c.smsc.is_none());
    }

    #[test]
    fn test_overrides() {
        let c = load(&[("PORT", "8080"), ("OTP_TEST_MODE", "true"), ("STORE_CORS", "http://a.com, http://b.com,"), ("SMSC_LOGIN", "shop"), ("SMSC_PASSWORD", "pw"), ("DEFAULT_REGION", "DE")]).unwrap();
        assert_eq!(c.port, 8080);
        assert!(c.otp.test_mode);
        assert_eq!(c.store_cors, vec!["http://a.com", "http://b.com"]);
        assert_eq!(c.smsc.unwrap().base_url, "https://smsc.ru");
        assert_eq!(c.default_region, "de");
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = load(&[("OTP_TTL_SECS", "five")]).unwrap_err();
        assert!(err.to_string().contains("OTP_TTL_SECS"));
    }
}
