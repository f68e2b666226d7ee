//! Configuration management module.
//!
//! This module handles loading and saving the application configuration:
//! the API endpoint and token, where the in-progress draft is kept, and the
//! log level.

mod error;

pub use error::ConfigError;

use crate::error::AppError;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

const FILE_NAME: &str = "config.yml";
const DRAFT_FILE_NAME: &str = "draft.yml";
const DEFAULT_DIRECTORY_PATH: &str = ".config/listing-wizard";

/// Oversees management of configuration file.
///
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub draft_path: Option<PathBuf>,
    pub log_level: String,
    file_path: Option<PathBuf>,
}

/// Define specification for configuration file.
///
#[derive(Serialize, Deserialize)]
struct FileSpec {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub draft_path: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api/v1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Return a new instance with default values.
    ///
    pub fn new() -> Config {
        Config {
            api_base_url: default_api_base_url(),
            access_token: None,
            draft_path: None,
            log_level: default_log_level(),
            file_path: None,
        }
    }

    /// Try to load an existing configuration from the disk using the custom
    /// directory if provided. A missing file leaves the defaults in place.
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), AppError> {
        // Use default path unless custom path provided
        let dir_path = match custom_path {
            Some(path) => Path::new(&path).to_path_buf(),
            None => Config::default_path()?,
        };

        if !dir_path.exists() {
            fs::create_dir_all(&dir_path).map_err(|e| ConfigError::CreateDirectoryFailed {
                path: dir_path.clone(),
                source: e,
            })?;
        }

        self.file_path = Some(dir_path.join(Path::new(FILE_NAME)));
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;

        if file_path.exists() {
            let contents = fs::read_to_string(file_path).map_err(|e| ConfigError::LoadFailed {
                path: file_path.clone(),
                message: format!("IO error: {}", e),
            })?;
            let data: FileSpec = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;
            reqwest::Url::parse(&data.api_base_url).map_err(|e| ConfigError::InvalidBaseUrl {
                url: data.api_base_url.clone(),
                message: e.to_string(),
            })?;
            self.api_base_url = data.api_base_url;
            self.access_token = data.access_token;
            self.draft_path = data.draft_path;
            self.log_level = data.log_level;
        }

        Ok(())
    }

    /// Attempt to serialize the configuration data and write it to the disk.
    ///
    pub fn save(&self) -> Result<(), AppError> {
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;
        let data = FileSpec {
            api_base_url: self.api_base_url.clone(),
            access_token: self.access_token.clone(),
            draft_path: self.draft_path.clone(),
            log_level: self.log_level.clone(),
        };
        let content = serde_yaml::to_string(&data)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = fs::File::create(file_path).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        file.flush().map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        Ok(())
    }

    /// Returns the token, failing when none is configured.
    ///
    pub fn token(&self) -> Result<&str, ConfigError> {
        self.access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::AccessTokenNotSet)
    }

    /// Returns where the in-progress draft is kept: the configured path, or
    /// a file next to the configuration file.
    ///
    pub fn draft_file(&self) -> Result<PathBuf, AppError> {
        if let Some(path) = &self.draft_path {
            return Ok(path.clone());
        }
        let dir = match self.file_path.as_ref().and_then(|p| p.parent()) {
            Some(dir) => dir.to_path_buf(),
            None => Config::default_path()?,
        };
        Ok(dir.join(DRAFT_FILE_NAME))
    }

    /// Returns the configured log level, falling back to info for unknown
    /// names.
    ///
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    /// Returns the path buffer for the default configuration directory or an
    /// error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, AppError> {
        match dirs::home_dir() {
            Some(home) => {
                let home_path = Path::new(&home);
                let default_config_path = Path::new(DEFAULT_DIRECTORY_PATH);
                Ok(home_path.join(default_config_path))
            }
            None => Err(ConfigError::HomeDirectoryNotFound.into()),
        }
    }
}
