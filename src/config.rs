use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_MODEL_PATH: &str = "modelo_vinho_completo2.onnx";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub model_path: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; unset variables take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("PORT") {
            Some(value) => parse_positive("PORT", value)?,
            None => 8080,
        };
        let workers = match lookup("WORKERS") {
            Some(value) => parse_positive("WORKERS", value)?,
            None => num_cpus::get(),
        };
        let model_path = lookup("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        Ok(ServerConfig {
            host,
            port,
            workers,
            model_path,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_positive<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed != T::default() => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&'static str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<&str, String> = vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]).expect("defaults");
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert!(config.workers >= 1);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("WORKERS", "2"),
            ("MODEL_PATH", "/models/wine.onnx"),
        ])
        .expect("overrides");
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.workers, 2);
        assert_eq!(config.model_path, PathBuf::from("/models/wine.onnx"));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(matches!(
            config(&[("PORT", "http")]),
            Err(ConfigError::InvalidNumber { name: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("WORKERS", "0")]),
            Err(ConfigError::InvalidNumber { name: "WORKERS", .. })
        ));
    }
}
