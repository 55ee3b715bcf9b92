use crate::error::{PeerError, Result};
use crate::signaling::MailboxConfig;
use parley_core::IceServerConfig;
use parley_core::utils::{
    DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2, DEFAULT_STUN_ADDR_3, DEFAULT_STUN_ADDR_4,
};
use std::env;
use std::time::Duration;

pub const ENV_ICE_URLS: &str = "PARLEY_ICE_URLS";
pub const ENV_TURN_USERNAME: &str = "PARLEY_TURN_USERNAME";
pub const ENV_TURN_CREDENTIAL: &str = "PARLEY_TURN_CREDENTIAL";
pub const ENV_POLL_INTERVAL_MS: &str = "PARLEY_POLL_INTERVAL_MS";
pub const ENV_MAILBOX_RETENTION: &str = "PARLEY_MAILBOX_RETENTION";

/// Settings for one peer: ICE servers, mailbox polling and the chat channel.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub ice_servers: Vec<IceServerConfig>,
    pub poll_interval: Duration,
    pub mailbox: MailboxConfig,
    pub channel_label: String,
    pub channel_ordered: bool,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![
                IceServerConfig::stun(DEFAULT_STUN_ADDR),
                IceServerConfig::stun(DEFAULT_STUN_ADDR_2),
                IceServerConfig::stun(DEFAULT_STUN_ADDR_3),
                IceServerConfig::stun(DEFAULT_STUN_ADDR_4),
            ],
            poll_interval: Duration::from_millis(1000),
            mailbox: MailboxConfig::default(),
            channel_label: "chat".to_owned(),
            channel_ordered: true,
        }
    }
}

impl PeerConfig {
    /// Defaults overridden by `PARLEY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(urls) = lookup(ENV_ICE_URLS) {
            let urls: Vec<String> = urls
                .split(',')
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_owned)
                .collect();
            if urls.is_empty() {
                return Err(PeerError::Config(format!("{ENV_ICE_URLS} has no urls")));
            }
            config.ice_servers = vec![IceServerConfig {
                urls,
                username: lookup(ENV_TURN_USERNAME),
                credential: lookup(ENV_TURN_CREDENTIAL),
            }];
        }

        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            let ms: u64 = parse_number(ENV_POLL_INTERVAL_MS, &raw)?;
            if ms == 0 {
                return Err(PeerError::Config(format!(
                    "{ENV_POLL_INTERVAL_MS} must be positive"
                )));
            }
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup(ENV_MAILBOX_RETENTION) {
            let bound: usize = parse_number(ENV_MAILBOX_RETENTION, &raw)?;
            config.mailbox = MailboxConfig::new(bound, bound.div_ceil(2))?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| PeerError::Config(format!("{key} is not a number: {raw:?}")))
}
