use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use ile_elements::{
    config, init_telemetry, CatalogDefaults, CatalogValidator, DefaultDataProvider,
    ElementCatalog, ElementCreationWorkflow, ElementData, ElementType, ElementValidator, IleConfig,
};

#[derive(Parser)]
#[command(name = "ile-elements")]
#[command(about = "Create and validate elements of threat-model library versions")]
#[command(long_about = "Validates element payloads locally and creates use cases, threats, \
                       weaknesses and controls inside a library version through the editor backend.")]
struct Cli {
    /// Configuration file to load instead of ile.toml / .ile-rc
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding configuration
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the element types the backend accepts
    Types,
    /// Print the blank payload for an element type
    Defaults {
        /// Element type tag (usecase, threat, weakness, control)
        element_type: String,
    },
    /// Check a payload without contacting the backend
    Validate {
        element_type: String,
        #[command(flatten)]
        payload: Payload,
    },
    /// Validate a payload and create the element in a version
    Create {
        element_type: String,
        /// Version the element is created in
        #[arg(long)]
        version: String,
        #[command(flatten)]
        payload: Payload,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Payload {
    /// Element data as a JSON object
    #[arg(long)]
    data: Option<String>,
    /// File holding the element data as a JSON object
    #[arg(long)]
    data_file: Option<PathBuf>,
}

impl Payload {
    fn read(&self) -> Result<ElementData> {
        let raw = match (&self.data, &self.data_file) {
            (Some(data), _) => data.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => bail!("Either --data or --data-file is required"),
        };

        match serde_json::from_str::<Value>(&raw).context("Element data is not valid JSON")? {
            Value::Object(map) => Ok(map),
            _ => bail!("Element data must be a JSON object"),
        }
    }
}

fn load_config(cli: &Cli) -> Result<IleConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            IleConfig::load_env_file()?;
            IleConfig::load_with_file(Some(path))?
        }
        None => config()?.clone(),
    };

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_telemetry(&config.observability)?;

    match &cli.command {
        Commands::Types => print_json(&ElementCatalog::standard().kinds()),
        Commands::Defaults { element_type } => {
            let data = CatalogDefaults::default().defaults_for(&ElementType::from(element_type.as_str()))?;
            print_json(&data)
        }
        Commands::Validate { element_type, payload } => {
            let data = payload.read()?;
            let result = CatalogValidator::default().validate(&ElementType::from(element_type.as_str()), &data);
            print_json(&result)?;
            if !result.is_valid() {
                bail!("Element data is invalid");
            }
            Ok(())
        }
        Commands::Create {
            element_type,
            version,
            payload,
        } => {
            let data = payload.read()?;
            tokio::runtime::Runtime::new()?.block_on(async {
                create_command(&config, element_type, version, &data).await
            })
        }
    }
}

async fn create_command(
    config: &IleConfig,
    element_type: &str,
    version: &str,
    data: &ElementData,
) -> Result<()> {
    let workflow = ElementCreationWorkflow::from_config(version, config)?;
    let result = workflow.create(&ElementType::from(element_type), data).await;

    if config.observability.metrics_enabled {
        workflow.metrics().log_stats();
    }

    let element = result.with_context(|| {
        format!("Failed to create {element_type} in version {version}")
    })?;
    print_json(&element)
}
