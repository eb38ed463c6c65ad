use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Path of the JSON data file holding all records
    #[serde(default = "default_data_file")]
    pub data_file: String,
    /// Directory invoice documents are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_data_file() -> String {
    "firmdesk.json".to_string()
}

fn default_output_dir() -> String {
    "invoices".to_string()
}

/// Command-line overrides for the environment-driven configuration
#[derive(Debug, Parser)]
#[command(name = "firmdesk", about = "Firm, client, invoice and expense books with GST")]
pub struct Cli {
    /// Use this data file instead of DATA_FILE / the default
    #[arg(long)]
    pub data_file: Option<String>,
    /// Write invoice documents here instead of OUTPUT_DIR / the default
    #[arg(long)]
    pub output_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Parse environment variables into Config struct
        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Apply command-line overrides on top of the environment values
    pub fn apply(mut self, cli: &Cli) -> Self {
        if let Some(data_file) = &cli.data_file {
            self.data_file = data_file.clone();
        }
        if let Some(output_dir) = &cli.output_dir {
            self.output_dir = output_dir.clone();
        }
        self
    }

    pub fn data_file(&self) -> &str {
        &self.data_file
    }

    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    // Ensure .env file is loaded
    dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load()?.apply(&cli);

    Ok(config)
}
