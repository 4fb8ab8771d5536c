use std::{env, path::PathBuf};

use directories::ProjectDirs;
use dynojson::scan::DEFAULT_PAGE_SIZE;
use lazy_static::lazy_static;
use serde::Deserialize;

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Region used by `scan` when none is given on the command line
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: i32,
    #[serde(default)]
    pub pretty: bool,
}

fn default_page_size() -> i32 {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            page_size: DEFAULT_PAGE_SIZE,
            pretty: false,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_dir(get_config_dir())
    }

    fn from_dir(config_dir: PathBuf) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("page_size", i64::from(DEFAULT_PAGE_SIZE))?
            .set_default("pretty", false)?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
        ];
        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(
            config::Environment::with_prefix(PROJECT_NAME.as_str()).try_parsing(true),
        );

        builder.build()?.try_deserialize()
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
    ProjectDirs::from("com", "dynojson", env!("CARGO_PKG_NAME"))
}
