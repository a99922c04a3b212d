use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Accepted one-time code lifetimes, in seconds (one day at most)
pub const CODE_TTL_RANGE: std::ops::RangeInclusive<i64> = 1..=86_400;

/// Certificate and key for serving HTTPS
#[derive(Debug, Clone, PartialEq)]
pub struct TlsPaths {
    /// Certificate PEM file (cert + CA bundle)
    pub cert_path: PathBuf,
    /// Private key PEM file (PKCS#8)
    pub key_path: PathBuf,
}

/// Runtime configuration, read from the environment and overridden by CLI flags
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// HTTPS is used only when both paths are set
    pub tls: Option<TlsPaths>,
    /// Optional event catalog file; the built-in demo catalog is used otherwise
    pub events_path: Option<String>,
    /// Lifetime of a one-time code
    pub code_ttl_secs: i64,
    /// How often expired codes are swept
    pub code_sweep_secs: u64,
    /// Entries kept for the operator log feed
    pub log_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            tls: None,
            events_path: None,
            code_ttl_secs: 300,
            code_sweep_secs: 60,
            log_buffer_size: 1000,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let tls = match (lookup("TLS_CERT_PATH"), lookup("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                warn!("Only one of TLS_CERT_PATH / TLS_KEY_PATH is set, serving plain HTTP");
                None
            }
        };

        Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr),
            port: parse_or(&lookup, "PORT", defaults.port),
            tls,
            events_path: lookup("EVENTS_PATH").filter(|p| !p.trim().is_empty()),
            code_ttl_secs: code_ttl_or(&lookup, defaults.code_ttl_secs),
            code_sweep_secs: parse_or(&lookup, "CODE_SWEEP_SECS", defaults.code_sweep_secs),
            log_buffer_size: parse_or(&lookup, "LOG_BUFFER_SIZE", defaults.log_buffer_size),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} value '{}', using default", key, raw);
            default
        }),
        None => default,
    }
}

fn code_ttl_or(lookup: &impl Fn(&str) -> Option<String>, default: i64) -> i64 {
    let ttl = parse_or(lookup, "OTP_TTL_SECS", default);
    if CODE_TTL_RANGE.contains(&ttl) {
        ttl
    } else {
        warn!(
            "OTP_TTL_SECS {} outside {}..={}, using default",
            ttl,
            CODE_TTL_RANGE.start(),
            CODE_TTL_RANGE.end()
        );
        default
    }
}
