use thiserror::Error;

/// Default SMTP relay for the long-polling deployment.
pub const POLLING_SMTP_HOST: &str = "smtp.gmail.com";
/// Default SMTP relay for the webhook deployment.
pub const WEBHOOK_SMTP_HOST: &str = "smtp.yandex.ru";

const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Error)]
#[error("required environment variable {0} is not set")]
pub struct ConfigMissing(pub &'static str);

/// Process configuration, loaded once at startup and passed to the
/// components explicitly. Nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub email_from: String,
    pub email_password: String,
    pub email_to: String,
    pub smtp_server: String,
    pub smtp_port: u16,
}

impl Config {
    /// Load from the process environment. `default_smtp_host` differs per
    /// deployment shape (Gmail for polling, Yandex for webhook).
    pub fn from_env(default_smtp_host: &str) -> Result<Self, ConfigMissing> {
        Self::from_lookup(|key| std::env::var(key).ok(), default_smtp_host)
    }

    /// Same as [`Config::from_env`] but with an injectable variable lookup,
    /// so tests can feed a fake environment.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        default_smtp_host: &str,
    ) -> Result<Self, ConfigMissing> {
        // Empty values count as unset.
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigMissing(key));

        Ok(Self {
            bot_token: required("TELEGRAM_BOT_TOKEN")?,
            email_from: required("EMAIL_FROM")?,
            email_password: required("EMAIL_PASSWORD")?,
            email_to: required("EMAIL_TO")?,
            smtp_server: get("SMTP_SERVER").unwrap_or_else(|| default_smtp_host.to_string()),
            smtp_port: get("SMTP_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("EMAIL_FROM", "bot@example.com"),
            ("EMAIL_PASSWORD", "hunter2"),
            ("EMAIL_TO", "inbox@example.com"),
        ])
    }

    fn load(vars: &HashMap<String, String>) -> Result<Config, ConfigMissing> {
        Config::from_lookup(|key| vars.get(key).cloned(), POLLING_SMTP_HOST)
    }

    #[test]
    fn test_loads_with_defaults() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.email_to, "inbox@example.com");
        assert_eq!(config.smtp_server, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
    }

    #[test]
    fn test_missing_variable_is_named() {
        let mut vars = full_env();
        vars.remove("EMAIL_TO");
        let err = load(&vars).unwrap_err();
        assert_eq!(err.0, "EMAIL_TO");
        assert!(err.to_string().contains("EMAIL_TO"));
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let mut vars = full_env();
        vars.insert("EMAIL_PASSWORD".into(), "".into());
        let err = load(&vars).unwrap_err();
        assert_eq!(err.0, "EMAIL_PASSWORD");
    }

    #[test]
    fn test_explicit_smtp_settings_win() {
        let mut vars = full_env();
        vars.insert("SMTP_SERVER".into(), "mail.corp.example".into());
        vars.insert("SMTP_PORT".into(), "2525".into());
        let config = load(&vars).unwrap();
        assert_eq!(config.smtp_server, "mail.corp.example");
        assert_eq!(config.smtp_port, 2525);
    }

    #[test]
    fn test_unparseable_port_falls_back() {
        let mut vars = full_env();
        vars.insert("SMTP_PORT".into(), "not-a-port".into());
        assert_eq!(load(&vars).unwrap().smtp_port, 587);
    }

    #[test]
    fn test_webhook_default_host() {
        let vars = full_env();
        let config = Config::from_lookup(|k| vars.get(k).cloned(), WEBHOOK_SMTP_HOST).unwrap();
        assert_eq!(config.smtp_server, "smtp.yandex.ru");
    }
}
