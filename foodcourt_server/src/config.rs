use std::env;

use fcs_common::Secret;
use log::*;

const DEFAULT_FCS_HOST: &str = "127.0.0.1";
const DEFAULT_FCS_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/foodcourt.db";
/// Capacity of each event hook's mpsc channel.
const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The key shared with the payment gateway for signing payment callbacks. Never sent to clients.
    pub payment_hmac_secret: Secret<String>,
    pub event_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FCS_HOST.to_string(),
            port: DEFAULT_FCS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            payment_hmac_secret: Secret::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FCS_HOST").ok().unwrap_or_else(|| DEFAULT_FCS_HOST.into());
        let port = env::var("FCS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for FCS_PORT. {e} Using the default, {DEFAULT_FCS_PORT}, instead."
                    );
                    DEFAULT_FCS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_FCS_PORT);
        let database_url = env::var("FCS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ FCS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let payment_hmac_secret = env::var("FCS_PAYMENT_HMAC_SECRET").map(Secret::new).unwrap_or_else(|_| {
            warn!(
                "🪛️ FCS_PAYMENT_HMAC_SECRET is not set. Payment verification will reject every callback. Set this \
                 to the key shared with your payment gateway."
            );
            Secret::default()
        });
        let event_buffer_size = env::var("FCS_EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        Self { host, port, database_url, payment_hmac_secret, event_buffer_size }
    }
}
