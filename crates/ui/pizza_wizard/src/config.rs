use std::time::Duration;
use std::{env, path::Path, path::PathBuf};

use directories::ProjectDirs;
use lazy_static::lazy_static;
use order_form::{DEFAULT_ORDER_ENDPOINT, ExecutorSettings, ToppingCatalog};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Cli;

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    /// URL the order is POSTed to.
    #[serde(default = "default_endpoint")]
    pub order_endpoint: String,
    #[serde(default)]
    pub validation_delay_ms: u64,
    /// Catalog override; the built-in catalog is used when absent.
    #[serde(default)]
    pub toppings: Option<ToppingCatalog>,
}

fn default_endpoint() -> String {
    DEFAULT_ORDER_ENDPOINT.to_string()
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    pub fn new(cli: &Cli) -> Result<Self, config::ConfigError> {
        Self::load(&get_config_dir(), &get_data_dir(), cli)
    }

    /// Layering (last wins): defaults, `config.json5` / `config.toml` in `config_dir`,
    /// command-line overrides.
    pub fn load(
        config_dir: &Path,
        data_dir: &Path,
        cli: &Cli,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .set_default("order_endpoint", DEFAULT_ORDER_ENDPOINT)?
            .set_default("validation_delay_ms", 0_i64)?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            debug!("No configuration file found in {}; using defaults", config_dir.display());
        }

        builder = builder
            .set_override_option("order_endpoint", cli.endpoint.clone())?
            .set_override_option(
                "validation_delay_ms",
                cli.validation_delay_ms.map(|ms| ms as i64),
            )?;

        builder.build()?.try_deserialize()
    }

    pub fn catalog(&self) -> ToppingCatalog {
        self.toppings.clone().unwrap_or_default()
    }

    pub fn executor_settings(&self) -> ExecutorSettings {
        ExecutorSettings {
            validation_delay: Duration::from_millis(self.validation_delay_ms),
        }
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "pizza", env!("CARGO_PKG_NAME"))
}
