//! Monitor configuration
//!
//! The config file is re-read at the start of every cycle, so operators can
//! change the URL list or notifier credentials without a restart.

pub mod loader;
pub mod types;

pub use loader::{
    check_config, validate_config, ConfigError, ConfigProvider, FileConfigProvider,
    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, REQUIRED_SECTIONS,
};
pub use types::{FcmConfig, MonitorConfig, SmtpConfig, DEFAULT_FCM_ENDPOINT};
