// ⚙️ Configuration - defaults → cpf-registry.toml → CPF_REGISTRY_* env
//
// Only the presentation surfaces read this. The core takes everything
// as explicit arguments.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "cpf-registry.toml";
pub const ENV_PREFIX: &str = "CPF_REGISTRY_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where the TUI drops exported reports
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, used when RUST_LOG is unset
    pub filter: String,

    /// Log file for the TUI (the terminal belongs to the UI)
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "cpf_registry=info".to_string(),
            file: PathBuf::from("cpf-registry.log"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn figment() -> Figment {
        Self::figment_from(DEFAULT_CONFIG_FILE)
    }

    pub fn figment_from(path: impl Into<PathBuf>) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path.into()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load from the default file (optional) and environment
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::figment().extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.export.directory, PathBuf::from("."));
        assert_eq!(config.logging.filter, "cpf_registry=info");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("does-not-exist.toml"))
            .extract()
            .unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_toml_overrides_partial_section() {
        let toml = r#"
            [server]
            port = 8080

            [export]
            directory = "/tmp/exports"
        "#;

        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.export.directory, PathBuf::from("/tmp/exports"));
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
