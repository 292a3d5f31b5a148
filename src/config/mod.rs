//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, DatabaseConfig, DatabaseEngine, LogFormat, LoggingConfig, MailConfig,
    RegistrationConfig, SmtpConfig, SparkpostConfig,
};
