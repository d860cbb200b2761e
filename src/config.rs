use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    /// Base URL used when building share links, e.g. `https://sql.example.com`
    pub public_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub backend: String, // "openai" or "ollama"
    pub model: String,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "pretty" or "json"
}

/// The account every API call acts on behalf of.
#[derive(Debug, Deserialize, Clone)]
pub struct DefaultUserConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
    pub default_user: DefaultUserConfig,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// LLM backend ("openai" or "ollama")
    #[arg(long)]
    pub llm_backend: Option<String>,

    /// Model identifier passed to the LLM backend
    #[arg(long)]
    pub model: Option<String>,

    /// Log output format ("pretty" or "json")
    #[arg(long)]
    pub log_format: Option<String>,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let mut config_builder = Config::builder()
            .set_default("web.host", defaults.web.host)?
            .set_default("web.port", defaults.web.port)?
            .set_default("llm.backend", defaults.llm.backend)?
            .set_default("llm.model", defaults.llm.model)?
            .set_default("llm.timeout_secs", defaults.llm.timeout_secs)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default("default_user.username", defaults.default_user.username)?
            .set_default("default_user.email", defaults.default_user.email)?
            .set_default("default_user.password", defaults.default_user.password)?;

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = [
                "config.toml",
                "config/config.toml",
                "/etc/nl-sql/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // NL_SQL__LLM__API_KEY=... maps to llm.api_key
        config_builder = config_builder.add_source(
            Environment::with_prefix("NL_SQL")
                .prefix_separator("__")
                .separator("__"),
        );

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;
        config.apply_args(args);

        Ok(config)
    }

    /// Command line flags win over every other source.
    fn apply_args(&mut self, args: &CliArgs) {
        if let Some(host) = &args.host {
            self.web.host = host.clone();
        }
        if let Some(port) = args.port {
            self.web.port = port;
        }
        if let Some(backend) = &args.llm_backend {
            self.llm.backend = backend.clone();
        }
        if let Some(model) = &args.model {
            self.llm.model = model.clone();
        }
        if let Some(format) = &args.log_format {
            self.logging.format = format.clone();
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

// Default implementation
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                public_url: None,
            },
            llm: LlmConfig {
                backend: "openai".to_string(),
                model: "gpt-4o".to_string(),
                api_key: None,
                api_url: None,
                timeout_secs: 60,
            },
            logging: LoggingConfig::default(),
            default_user: DefaultUserConfig {
                username: "developer".to_string(),
                email: "dev@example.com".to_string(),
                password: "password123".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_loaded_values() {
        let mut config = AppConfig::default();
        let args = CliArgs {
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
            llm_backend: Some("ollama".to_string()),
            model: Some("llama3".to_string()),
            log_format: Some("json".to_string()),
            ..CliArgs::default()
        };

        config.apply_args(&args);

        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.llm.backend, "ollama");
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.default_user.username, "developer");
    }

    #[test]
    fn missing_flags_leave_config_untouched() {
        let mut config = AppConfig::default();
        config.apply_args(&CliArgs::default());

        assert_eq!(config.web.port, 5000);
        assert_eq!(config.llm.backend, "openai");
        assert_eq!(config.llm.timeout_secs, 60);
    }
}
