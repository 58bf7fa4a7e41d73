use once_cell::sync::Lazy;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;
use zeroize::{Zeroize, Zeroizing};

pub static CONF: Lazy<Config> = Lazy::new(|| Config::from_env().expect("Failed to load config"));

const DB_USERNAME_VAR: &str = "ENVELOPE_DB_USERNAME";
const DB_PASSWORD_VAR: &str = "ENVELOPE_DB_PASSWORD";
const DB_HOSTNAME_VAR: &str = "ENVELOPE_DB_HOSTNAME";
const DB_PORT_VAR: &str = "ENVELOPE_DB_PORT";
const DB_NAME_VAR: &str = "ENVELOPE_DB_NAME";
const DB_MAX_CONNECTIONS_VAR: &str = "ENVELOPE_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "ENVELOPE_DB_IDLE_TIMEOUT_SECS";

const HEALTH_ENDPOINT_KEY_VAR: &str = "ENVELOPE_HEALTH_ENDPOINT_KEY";

const ACTIX_WORKER_COUNT_VAR: &str = "ENVELOPE_ACTIX_WORKER_COUNT";

const LOG_LEVEL_VAR: &str = "ENVELOPE_LOG_LEVEL";

pub const TEST_HEALTH_ENDPOINT_KEY: &str = "test-health-endpoint-key";

#[derive(Zeroize)]
pub struct ConfigInner {
    pub db_username: String,
    pub db_password: String,
    pub db_hostname: String,
    #[zeroize(skip)]
    pub db_port: u16,
    pub db_name: String,
    #[zeroize(skip)]
    pub db_max_connections: u32,
    #[zeroize(skip)]
    pub db_idle_timeout: Duration,

    pub health_endpoint_key: String,

    #[zeroize(skip)]
    pub actix_worker_count: usize,

    #[zeroize(skip)]
    pub log_level: String,
}

pub struct Config {
    inner: UnsafeCell<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        // Safe as long as `unsafe Config::zeroize()` hasn't been called
        unsafe { &*self.inner.get() }
    }
}

// Safe to be shared across threads as long as `unsafe Config::zeroize()` hasn't been called
unsafe impl Sync for Config {}

impl ConfigInner {
    pub fn database_uri(&self) -> Zeroizing<String> {
        Zeroizing::new(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_username, self.db_password, self.db_hostname, self.db_port, self.db_name,
        ))
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let inner = ConfigInner {
            db_username: required_var(DB_USERNAME_VAR, String::from("postgres"))?,
            db_password: required_var(DB_PASSWORD_VAR, String::from("postgres"))?,
            db_hostname: required_var(DB_HOSTNAME_VAR, String::from("localhost"))?,
            db_port: required_var(DB_PORT_VAR, 5432)?,
            db_name: required_var(DB_NAME_VAR, String::from("envelope_test"))?,
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 48),
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),

            health_endpoint_key: required_var(
                HEALTH_ENDPOINT_KEY_VAR,
                String::from(TEST_HEALTH_ENDPOINT_KEY),
            )?,

            actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get()),

            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
        };

        Ok(Config {
            inner: UnsafeCell::new(inner),
        })
    }

    /// # Safety
    ///
    /// Safe only if the Config isn't being used by other threads or across an async
    /// boundary. Generally, this should only be used at the end of the main function once
    /// all threads have been joined.
    pub unsafe fn zeroize(&self) {
        unsafe {
            (*self.inner.get()).zeroize();
        }
    }
}

// Unit tests run without a deployment environment, so they get the fallback value
fn required_var<T: FromStr>(key: &'static str, test_fallback: T) -> Result<T, ConfigError> {
    if cfg!(test) {
        Ok(env_var_or(key, test_fallback))
    } else {
        env_var(key)
    }
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}
