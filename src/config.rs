use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const UPSTREAM_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL";
pub const LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DB_PATH: &str = "./database/database.db";
pub const SERVICE_URL: &str = "http://localhost:8080/cotacao";
pub const OUTPUT_PATH: &str = "cotacao.txt";

/// Budget for the outbound quote call, nested under the inbound deadline.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(2);
/// Budget for a single row insert. Always a fresh deadline.
pub const SAVE_TIMEOUT: Duration = Duration::from_millis(10);
/// Budget for the whole client round trip.
pub const CLIENT_TIMEOUT: Duration = Duration::from_millis(300);

/// Runtime configuration for the quote service.
/// Addresses and paths may come from the environment; stage timeouts are fixed.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub upstream_url: String,
    pub db_path: PathBuf,
    /// Inbound budget; `None` means requests carry no deadline. Never read
    /// from the environment.
    pub request_timeout: Option<Duration>,
    pub fetch_timeout: Duration,
    pub save_timeout: Duration,
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            upstream_url: UPSTREAM_URL.to_string(),
            db_path: PathBuf::from(DB_PATH),
            request_timeout: None,
            fetch_timeout: FETCH_TIMEOUT,
            save_timeout: SAVE_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - COTACAO_LISTEN_ADDR (default: 0.0.0.0:8080)
    /// - COTACAO_UPSTREAM_URL (default: awesomeapi USD-BRL endpoint)
    /// - COTACAO_DB_PATH (default: ./database/database.db)
    pub fn from_env() -> Result<Self, String> {
        let mut cfg = Self::default();

        if let Ok(addr) = env::var("COTACAO_LISTEN_ADDR") {
            cfg.listen_addr = addr
                .parse()
                .map_err(|e| format!("Invalid COTACAO_LISTEN_ADDR '{}': {}", addr, e))?;
        }
        if let Ok(u) = env::var("COTACAO_UPSTREAM_URL") {
            cfg.upstream_url = validate_url("COTACAO_UPSTREAM_URL", u)?;
        }
        if let Ok(p) = env::var("COTACAO_DB_PATH") {
            cfg.db_path = PathBuf::from(p);
        }
        Ok(cfg)
    }
}

/// Runtime configuration for the one-shot client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub service_url: String,
    pub output_path: PathBuf,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: SERVICE_URL.to_string(),
            output_path: PathBuf::from(OUTPUT_PATH),
            timeout: CLIENT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - COTACAO_SERVICE_URL (default: http://localhost:8080/cotacao)
    /// - COTACAO_OUTPUT_PATH (default: cotacao.txt)
    pub fn from_env() -> Result<Self, String> {
        let mut cfg = Self::default();
        if let Ok(u) = env::var("COTACAO_SERVICE_URL") {
            cfg.service_url = validate_url("COTACAO_SERVICE_URL", u)?;
        }
        if let Ok(p) = env::var("COTACAO_OUTPUT_PATH") {
            cfg.output_path = PathBuf::from(p);
        }
        Ok(cfg)
    }
}

fn validate_url(var: &str, raw: String) -> Result<String, String> {
    url::Url::parse(&raw).map_err(|e| format!("Invalid {} '{}': {}", var, raw, e))?;
    Ok(raw)
}

fn default_user_agent() -> String {
    format!("cotacao/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_constants() {
        let s = ServerConfig::default();
        assert_eq!(s.listen_addr.to_string(), LISTEN_ADDR);
        assert_eq!(s.fetch_timeout, Duration::from_secs(2));
        assert_eq!(s.save_timeout, Duration::from_millis(10));
        assert!(s.request_timeout.is_none());

        let c = ClientConfig::default();
        assert_eq!(c.service_url, SERVICE_URL);
        assert_eq!(c.output_path, PathBuf::from("cotacao.txt"));
        assert_eq!(c.timeout, Duration::from_millis(300));
    }

    #[test]
    fn request_timeout_is_not_read_from_env() {
        std::env::set_var("COTACAO_REQUEST_TIMEOUT_MS", "1");
        let cfg = ServerConfig::from_env().unwrap();
        std::env::remove_var("COTACAO_REQUEST_TIMEOUT_MS");
        assert!(cfg.request_timeout.is_none());
        assert_eq!(cfg.fetch_timeout, FETCH_TIMEOUT);
        assert_eq!(cfg.save_timeout, SAVE_TIMEOUT);
    }

    #[test]
    fn url_validation() {
        assert!(validate_url("X", "http://127.0.0.1:1/cotacao".into()).is_ok());
        let err = validate_url("X", "not a url".into()).unwrap_err();
        assert!(err.contains("Invalid X"));
    }
}
