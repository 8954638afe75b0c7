use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::shared::GITHUB_API_ROOT_ENDPOINT;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub server_bind_point: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timestamp_age_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_workflow: Option<GitHubWorkflowConfig>,
}

/// Target of the `create` and `destroy` commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GitHubWorkflowConfig {
    #[serde(default = "default_github_api_base_url")]
    pub api_base_url: String,
    pub repository: String,
    pub workflow_id: String,
    #[serde(default = "default_git_ref")]
    pub git_ref: String,
}

fn default_github_api_base_url() -> String {
    GITHUB_API_ROOT_ENDPOINT.to_string()
}

fn default_git_ref() -> String {
    "main".to_string()
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            server_bind_point: "0.0.0.0".into(),
            port: 8080,
            log_level: "DEBUG".into(),
            log_format: LogFormat::Pretty,
            max_timestamp_age_secs: None,
            github_workflow: None,
        }
    }
}

impl Configuration {
    /// Reads `$CONFIG_DIRECTORY/$CONFIG_FILE_NAME` when both are set, otherwise starts from the
    /// defaults. `LOG_LEVEL`, `SERVER_BIND_POINT` and `PORT` override whatever was loaded.
    pub fn load() -> anyhow::Result<Self> {
        let config = match (
            std::env::var("CONFIG_DIRECTORY"),
            std::env::var("CONFIG_FILE_NAME"),
        ) {
            (Ok(directory), Ok(file_name)) => {
                Self::load_from_config_file(Path::new(&directory), &file_name)?
            }
            _ => Configuration::default(),
        };

        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn load_from_config_file(config_directory: &Path, file_name: &str) -> anyhow::Result<Self> {
        if !config_directory.exists() {
            std::fs::create_dir_all(config_directory)?;
        }

        let configuration_path = config_directory.join(file_name);
        if !configuration_path.exists() {
            let new_config = Configuration::default();
            let serialized = toml::to_string_pretty(&new_config)?;
            std::fs::write(configuration_path, serialized)?;
            Ok(new_config)
        } else {
            let raw_config = std::fs::read_to_string(configuration_path)?;
            let deserialized: Configuration = toml::from_str(&raw_config)?;
            Ok(deserialized)
        }
    }

    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        if let Some(log_level) = lookup("LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(server_bind_point) = lookup("SERVER_BIND_POINT") {
            self.server_bind_point = server_bind_point;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT value `{port}`: {e}"))?;
        }

        Ok(self)
    }

    pub fn tracing_level(&self) -> Level {
        match self.log_level.to_uppercase().as_str() {
            "TRACE" => Level::TRACE,
            "INFO" => Level::INFO,
            "WARN" => Level::WARN,
            "ERROR" => Level::ERROR,
            _ => Level::DEBUG,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_bind_point, self.port)
    }

    pub fn max_timestamp_age(&self) -> Option<Duration> {
        self.max_timestamp_age_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn scratch_directory() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("discord-interaction-bot-{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn writes_defaults_when_the_file_is_missing() {
        let directory = scratch_directory();

        let config = Configuration::load_from_config_file(&directory, "config.toml").unwrap();

        assert_eq!(config, Configuration::default());
        let written = std::fs::read_to_string(directory.join("config.toml")).unwrap();
        assert!(written.contains("server_bind_point"));
        assert!(!written.contains("github_workflow"));

        std::fs::remove_dir_all(directory).unwrap();
    }

    #[test]
    fn reads_an_existing_file() {
        let directory = scratch_directory();
        std::fs::create_dir_all(&directory).unwrap();
        std::fs::write(
            directory.join("config.toml"),
            r#"
port = 3000
log_level = "INFO"
log_format = "json"
max_timestamp_age_secs = 300

[github_workflow]
repository = "someone/server-deployment"
workflow_id = "79678424"
"#,
        )
        .unwrap();

        let config = Configuration::load_from_config_file(&directory, "config.toml").unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.server_bind_point, "0.0.0.0");
        assert_eq!(config.tracing_level(), Level::INFO);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.max_timestamp_age(), Some(Duration::from_secs(300)));
        let workflow = config.github_workflow.unwrap();
        assert_eq!(workflow.api_base_url, GITHUB_API_ROOT_ENDPOINT);
        assert_eq!(workflow.git_ref, "main");

        std::fs::remove_dir_all(directory).unwrap();
    }

    #[test]
    fn environment_overrides_file_values() {
        let env = HashMap::from([("PORT", "9000"), ("LOG_LEVEL", "warn")]);

        let config = Configuration::default()
            .with_env_overrides(|key| env.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.tracing_level(), Level::WARN);
    }

    #[test]
    fn rejects_a_non_numeric_port() {
        let result = Configuration::default()
            .with_env_overrides(|key| (key == "PORT").then(|| "eighty".to_string()));

        assert!(result.is_err());
    }

    #[test]
    fn unknown_log_levels_default_to_debug() {
        let config = Configuration {
            log_level: "chatty".into(),
            ..Default::default()
        };
        assert_eq!(config.tracing_level(), Level::DEBUG);
    }
}
