//! Ошибки конфигурации генератора
//!
//! Единственный класс фатальных ошибок: некорректные параметры. Они обнаруживаются
//! при построении генератора, до любой выборки шума. Сама генерация не падает.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("{axis} must be at least {min} tiles, got {value}")]
    InvalidDimension {
        axis: &'static str,
        value: u32,
        min: u32,
    },

    #[error("unknown terrain mode '{0}' (expected continent, archipelago, highlands or none)")]
    UnknownMode(String),

    #[error("unknown prevailing wind '{0}' (expected west, east, north or south)")]
    UnknownWind(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("biome table must contain at least one rule")]
    EmptyBiomeTable,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
