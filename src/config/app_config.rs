use serde::Deserialize;

/// Application configuration
///
/// Loaded by the surrounding service at startup; the core only consults the
/// registration and mail sections, the rest is wired into the external
/// collaborators (storage driver, mail relay).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Public base URL, embedded in invitation links
    pub url: String,
    pub database: DatabaseConfig,
    pub registration: RegistrationConfig,
    pub mail: MailConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub dsn: String,
    pub engine: DatabaseEngine,
    pub max_conns: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    #[default]
    Postgresql,
    Cockroachdb,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RegistrationConfig {
    /// When set, only addresses with a pending invitation may register
    pub only_invited: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Sender address for invitation notices
    pub from: String,
    pub smtp: Option<SmtpConfig>,
    pub sparkpost: Option<SparkpostConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SparkpostConfig {
    pub key: String,
    #[serde(default)]
    pub eu: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            database: DatabaseConfig::default(),
            registration: RegistrationConfig::default(),
            mail: MailConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "postgres://localhost/teamvault".to_string(),
            engine: DatabaseEngine::default(),
            max_conns: 10,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: "vault@localhost".to_string(),
            smtp: None,
            sparkpost: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("TEAMVAULT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Cross-field checks serde cannot express
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.url.is_empty() {
            return Err(config::ConfigError::Message("url must not be empty".into()));
        }
        if self.database.dsn.is_empty() {
            return Err(config::ConfigError::Message(
                "database.dsn must not be empty".into(),
            ));
        }
        if self.mail.from.is_empty() {
            return Err(config::ConfigError::Message(
                "mail.from must not be empty".into(),
            ));
        }
        // Exactly one mail transport when any is configured at all
        if self.mail.smtp.is_some() && self.mail.sparkpost.is_some() {
            return Err(config::ConfigError::Message(
                "configure either mail.smtp or mail.sparkpost, not both".into(),
            ));
        }
        if let Some(smtp) = &self.mail.smtp {
            if smtp.server.is_empty() {
                return Err(config::ConfigError::Message(
                    "mail.smtp.server must not be empty".into(),
                ));
            }
        }
        if let Some(sparkpost) = &self.mail.sparkpost {
            if sparkpost.key.is_empty() {
                return Err(config::ConfigError::Message(
                    "mail.sparkpost.key must not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.database.engine, DatabaseEngine::Postgresql);
        assert!(!config.registration.only_invited);
    }

    #[test]
    fn test_rejects_both_mail_transports() {
        let mut config = AppConfig::default();
        config.mail.smtp = Some(SmtpConfig {
            server: "smtp.example.com".to_string(),
            user: String::new(),
            password: String::new(),
        });
        config.mail.sparkpost = Some(SparkpostConfig {
            key: "key".to_string(),
            eu: false,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_smtp_server() {
        let mut config = AppConfig::default();
        config.mail.smtp = Some(SmtpConfig {
            server: String::new(),
            user: String::new(),
            password: String::new(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_mail_from() {
        let mut config = AppConfig::default();
        config.mail.from = String::new();
        assert!(config.validate().is_err());
    }
}
