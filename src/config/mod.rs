mod basic;
mod dispatch;
mod identity;

pub use basic::BasicConfig;
pub use dispatch::DispatchConfig;
pub use identity::IdentityConfig;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Trusted identity header and admin list (see `identity` table in config.toml).
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Number dispatch behavior (see `dispatch` table in config.toml).
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        }
    }

    /// Loads configuration by merging defaults and `config.toml` if present.
    ///
    /// Note: this does **not** validate required fields. Binaries should call
    /// `validate` before serving.
    pub fn from_optional_toml() -> Self {
        Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml): {err}")
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.identity.header.trim().is_empty() {
            return Err("identity.header must be set and non-empty".to_string());
        }
        if self.basic.database_url.trim().is_empty() {
            return Err("basic.database_url must be set and non-empty".to_string());
        }
        Ok(())
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::from_optional_toml);

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Toml;

    #[test]
    fn toml_tables_override_defaults() {
        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [basic]
                listen_port = 9000

                [identity]
                admin_emails = ["Boss@Example.org"]

                [dispatch]
                atomic_claim = false
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(cfg.basic.listen_port, 9000);
        assert_eq!(cfg.basic.database_url, "sqlite://phonebank.db");
        assert_eq!(cfg.identity.header, "x-auth-request-email");
        assert_eq!(cfg.identity.admin_emails, vec!["Boss@Example.org".to_string()]);
        assert!(!cfg.dispatch.atomic_claim);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn blank_identity_header_is_rejected() {
        let mut cfg = Config::default();
        cfg.identity.header = "  ".to_string();
        assert!(cfg.validate().is_err());
    }
}
