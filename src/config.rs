use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the element tooling
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IleConfig {
    /// Backend API settings
    pub api: ApiConfig,
    /// Creation workflow behavior
    pub workflow: WorkflowConfig,
    /// Logging and metrics settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the library editor backend
    pub base_url: String,
    /// Per-request timeout enforced by the HTTP client
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// How responses that arrive out of order are applied to creation state
    pub stale_responses: StaleResponsePolicy,
}

/// Policy for applying a `create` outcome when other calls (or a reset)
/// happened while it was in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    /// Every completing call writes its outcome; the last write wins.
    #[default]
    LastWriteWins,
    /// Only the most recently issued call may write; reset invalidates all
    /// outstanding calls.
    LatestRequestOnly,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit logs as JSON instead of human readable lines
    pub json_logs: bool,
    /// Log creation metrics once a command finishes
    pub metrics_enabled: bool,
}

impl Default for IleConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout_seconds: 30,
            },
            workflow: WorkflowConfig {
                stale_responses: StaleResponsePolicy::LastWriteWins,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
                metrics_enabled: true,
            },
        }
    }
}

impl IleConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (ile.toml, .ile-rc) or an explicit file
    /// 3. Environment variables (prefixed with ILE_, nested with __)
    pub fn load() -> Result<Self> {
        Self::load_with_file(None)
    }

    pub fn load_with_file(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, Path::new("."), Self::environment())
    }

    /// Environment source for `ILE_` variables
    fn environment() -> Environment {
        Environment::with_prefix("ILE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_from(path: Option<&Path>, search_dir: &Path, env: Environment) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None => {
                let main_file = search_dir.join("ile.toml");
                if main_file.exists() {
                    builder = builder.add_source(File::from(main_file));
                }

                let rc_file = search_dir.join(".ile-rc");
                if rc_file.exists() {
                    builder = builder.add_source(File::from(rc_file).format(config::FileFormat::Toml));
                }
            }
        }

        // Override with environment variables
        builder = builder.add_source(env);

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<IleConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = IleConfig::load_env_file();
        IleConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static IleConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
