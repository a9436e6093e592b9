//! Engine configuration resolved from the environment with built-in defaults.

use std::path::PathBuf;
use std::time::Duration;
use std::env;

use tracing::warn;

/// Default backend base URL when [`BASE_URL_ENV`] is unset.
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Environment variable overriding the backend base URL.
const BASE_URL_ENV: &str = "JUKEBOX_BACKEND_URL";
/// Environment variable overriding the pull cadence, in seconds.
const POLL_INTERVAL_ENV: &str = "JUKEBOX_POLL_INTERVAL_SECS";
/// Environment variable overriding where the guest identity is persisted.
const GUEST_ID_PATH_ENV: &str = "JUKEBOX_GUEST_ID_PATH";
/// Default location of the persisted guest identity.
const DEFAULT_GUEST_ID_PATH: &str = ".jukebox/guest-id";

/// Cadence of the pull channel.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Fixed delay between push-subscription reconnect attempts.
const DEFAULT_PUSH_RETRY_DELAY: Duration = Duration::from_secs(5);
/// How long the pending-vote marker stays visible after a response.
const DEFAULT_VOTE_COOLDOWN: Duration = Duration::from_secs(2);
/// Upper bound on every backend request except the push stream.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable engine settings shared by every component.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the jukebox backend.
    pub base_url: String,
    /// Cadence of the pull synchronizer.
    pub poll_interval: Duration,
    /// Delay between push reconnect attempts.
    pub push_retry_delay: Duration,
    /// Display cooldown applied to the pending-vote marker.
    pub vote_cooldown: Duration,
    /// Timeout applied to every non-streaming backend request.
    pub request_timeout: Duration,
    /// File where the guest identity is persisted.
    pub guest_id_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            push_retry_delay: DEFAULT_PUSH_RETRY_DELAY,
            vote_cooldown: DEFAULT_VOTE_COOLDOWN,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            guest_id_path: PathBuf::from(DEFAULT_GUEST_ID_PATH),
        }
    }
}

impl EngineConfig {
    /// Resolve the configuration from the environment, keeping defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(value) = env_var(BASE_URL_ENV) {
            config.base_url = value;
        }
        if let Some(value) = env_var(POLL_INTERVAL_ENV) {
            match value.parse::<u64>() {
                Ok(secs) if secs > 0 => config.poll_interval = Duration::from_secs(secs),
                _ => warn!(
                    value = %value,
                    "invalid poll interval override; keeping the default"
                ),
            }
        }
        if let Some(value) = env_var(GUEST_ID_PATH_ENV) {
            config.guest_id_path = PathBuf::from(value);
        }

        config
    }
}

/// Read a non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
