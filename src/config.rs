use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

//Curve anchors, price in PROMPT per token
pub const P0: Decimal = dec!(0.00004);
pub const P1: Decimal = dec!(0.0003);

pub const TRADEABLE_CAP: Decimal = dec!(248000000);
pub const GRADUATION_THRESHOLD: Decimal = dec!(42160);

//5% of gross, half to the agent creator and half to the platform
pub const FEE_RATE: Decimal = dec!(0.05);
pub const CREATOR_FEE_SHARE: Decimal = dec!(0.5);

pub const PROMPT_DECIMALS: u32 = 9;
pub const TOKEN_DECIMALS: u32 = 6;

pub const MAX_SETTLE_RETRIES: u32 = 8;
pub const RETRY_BACKOFF_MS: (u64, u64) = (2, 20);

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const HOST_ENV_KEY: &str = "HOST";
pub const PORT_ENV_KEY: &str = "PORT";
pub const CERTIFICATE_DIR_ENV_KEY: &str = "CERTIFICATE_DIR";

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub certificate_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Reads `HOST`, `PORT` and `CERTIFICATE_DIR`, falling back to local defaults.
    /// Call `dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let host = env::var(HOST_ENV_KEY).unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var(PORT_ENV_KEY) {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{} must be a port number, got {:?}", PORT_ENV_KEY, raw))?,
            Err(_) => DEFAULT_PORT,
        };
        let certificate_dir = env::var(CERTIFICATE_DIR_ENV_KEY)
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self { host, port, certificate_dir })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

pub async fn setup_https_config(cert_dir: &Path) -> Result<RustlsConfig> {
    let cert_path = cert_dir.join("fullchain.pem");
    let key_path = cert_dir.join("privkey.pem");

    RustlsConfig::from_pem_file(&cert_path, &key_path)
        .await
        .with_context(|| format!("failed to load TLS material from {}", cert_dir.display()))
}
