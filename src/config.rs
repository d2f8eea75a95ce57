// src/config.rs
//! Конфигурация генерации карты
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Режимы макро-формы рельефа (континент, архипелаг, нагорье, без формы)
//! - Направление преобладающего ветра
//! - Параметры фрактального шума и количество рек
//! - Пороговые константы (уровень моря, источники рек, нагорья и горы)
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.
//! Проверка параметров выполняется до любой выборки шума: некорректная конфигурация
//! никогда не доходит до генератора.

use crate::error::{ConfigResult, ConfigurationError};
use crate::noise::max_noise_coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Минимальный размер карты по каждой оси (в тайлах)
pub const MIN_DIMENSION: u32 = 50;

/// Уровень моря: тайлы ниже этой высоты считаются водой
pub const SEA_LEVEL: f32 = 0.35;

/// Высота, выше которой тайл суши может стать истоком реки
pub const RIVER_SOURCE_ELEVATION: f32 = 0.6;

/// Нижняя граница нагорий
pub const HIGHLAND_ELEVATION: f32 = 0.7;

/// Нижняя граница гор
pub const MOUNTAIN_ELEVATION: f32 = 0.85;

/// Наибольшее число октав шума
pub const MAX_OCTAVES: u32 = 16;

/// Предел координаты, передаваемой в шум (FastNoiseLite приводит её к `i32`)
pub const MAX_NOISE_COORDINATE: f64 = 1.0e6;

/// Режим макро-формы рельефа
///
/// Определяет глобальную структуру карты: распределение суши/моря и общий уровень рельефа.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TerrainMode {
    /// Один крупный материк в центре карты, края уходят под воду
    #[default]
    Continent,
    /// Множество островов, большая часть карты покрыта водой
    Archipelago,
    /// Общий подъём рельефа: меньше океана, больше нагорий и гор
    Highlands,
    /// Без макро-формы (отладка и базовая линия)
    None,
}

impl TerrainMode {
    pub const ALL: [TerrainMode; 4] = [
        TerrainMode::Continent,
        TerrainMode::Archipelago,
        TerrainMode::Highlands,
        TerrainMode::None,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TerrainMode::Continent => "continent",
            TerrainMode::Archipelago => "archipelago",
            TerrainMode::Highlands => "highlands",
            TerrainMode::None => "none",
        }
    }
}

impl fmt::Display for TerrainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerrainMode {
    type Err = ConfigurationError;

    /// Разбирает имя режима без учёта регистра.
    ///
    /// # Примеры
    /// ```
    /// use terrain_gen::config::TerrainMode;
    /// assert_eq!("Archipelago".parse::<TerrainMode>().unwrap(), TerrainMode::Archipelago);
    /// assert!("pangaea".parse::<TerrainMode>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TerrainMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigurationError::UnknownMode(s.to_string()))
    }
}

impl TryFrom<String> for TerrainMode {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Преобладающий ветер: сторона света, ОТКУДА дует ветер
///
/// `West` — западный перенос: воздух приходит с запада, дождевая тень лежит к востоку от хребтов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PrevailingWind {
    #[default]
    West,
    East,
    North,
    South,
}

impl PrevailingWind {
    pub const ALL: [PrevailingWind; 4] = [
        PrevailingWind::West,
        PrevailingWind::East,
        PrevailingWind::North,
        PrevailingWind::South,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PrevailingWind::West => "west",
            PrevailingWind::East => "east",
            PrevailingWind::North => "north",
            PrevailingWind::South => "south",
        }
    }

    /// Шаг сетки против ветра (в сторону, откуда он приходит). Ось Y направлена на юг.
    #[must_use]
    pub fn upwind_step(self) -> (i32, i32) {
        match self {
            PrevailingWind::West => (-1, 0),
            PrevailingWind::East => (1, 0),
            PrevailingWind::North => (0, -1),
            PrevailingWind::South => (0, 1),
        }
    }
}

impl fmt::Display for PrevailingWind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrevailingWind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrevailingWind::ALL
            .into_iter()
            .find(|wind| wind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigurationError::UnknownWind(s.to_string()))
    }
}

impl TryFrom<String> for PrevailingWind {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Основные параметры генерации карты
///
/// Полная конфигурация для генерации одной карты. Поддерживает загрузку из TOML-файлов.
/// Одинаковые параметры (включая `seed`) всегда дают структурно идентичный результат.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Ширина карты в тайлах (по умолчанию 80, минимум 50)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в тайлах (по умолчанию 60, минимум 50)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Сид генератора случайных чисел (по умолчанию случайный)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Режим макро-формы (по умолчанию `continent`)
    #[serde(default)]
    pub mode: TerrainMode,

    /// Количество октав шума (по умолчанию 5)
    #[serde(default = "default_octaves")]
    pub octaves: u32,

    /// Затухание амплитуды на каждую октаву (по умолчанию 0.5)
    #[serde(default = "default_persistence")]
    pub persistence: f32,

    /// Рост частоты на каждую октаву (по умолчанию 2.0)
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,

    /// Масштаб шума в тайлах: базовая частота равна `1 / scale` (по умолчанию 100.0)
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Количество трассируемых рек (по умолчанию 8)
    #[serde(default = "default_river_count")]
    pub river_count: u32,

    /// Преобладающий ветер для дождевой тени (по умолчанию `west`)
    #[serde(default)]
    pub prevailing_wind: PrevailingWind,
}

impl GenerationParams {
    /// Параметры по умолчанию с заданным сидом
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Проверяет параметры.
    ///
    /// # Ошибки
    /// Возвращает [`ConfigurationError`], если размер меньше [`MIN_DIMENSION`] или
    /// параметры шума вне допустимой области.
    ///
    /// # Пример
    /// ```
    /// use terrain_gen::config::GenerationParams;
    /// let mut params = GenerationParams::with_seed(7);
    /// assert!(params.validate().is_ok());
    /// params.width = 49;
    /// assert!(params.validate().is_err());
    /// ```
    pub fn validate(&self) -> ConfigResult<()> {
        check_dimension("width", self.width)?;
        check_dimension("height", self.height)?;

        if self.octaves == 0 {
            return Err(ConfigurationError::InvalidParameter {
                name: "octaves",
                reason: "at least one octave is required".to_string(),
            });
        }
        if self.octaves > MAX_OCTAVES {
            return Err(ConfigurationError::InvalidParameter {
                name: "octaves",
                reason: format!("at most {MAX_OCTAVES} octaves are supported, got {}", self.octaves),
            });
        }
        check_positive("persistence", self.persistence)?;
        if self.persistence > 1.0 {
            return Err(ConfigurationError::InvalidParameter {
                name: "persistence",
                reason: format!("must not exceed 1.0, got {}", self.persistence),
            });
        }
        check_positive("lacunarity", self.lacunarity)?;
        check_positive("scale", self.scale)?;

        // Частота старшей октавы, умноженная на размах координат, не должна уходить за предел
        let reach = max_noise_coordinate(self);
        if !reach.is_finite() || reach >= MAX_NOISE_COORDINATE {
            return Err(ConfigurationError::InvalidParameter {
                name: "lacunarity",
                reason: format!(
                    "lacunarity^(octaves-1)/scale over the map reaches noise coordinate {reach:.3e}, limit is {MAX_NOISE_COORDINATE:.0e}"
                ),
            });
        }
        Ok(())
    }

    /// Загружает параметры из TOML-файла
    ///
    /// Отсутствующие поля получают значения по умолчанию (сид — случайный).
    ///
    /// # Пример
    /// ```toml
    /// # terrain.toml
    /// seed = 42
    /// width = 120
    /// height = 80
    /// mode = "archipelago"
    /// prevailing_wind = "east"
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let params: Self = toml::from_str(contents)?;
        params.validate()?;
        Ok(params)
    }
}

fn check_dimension(axis: &'static str, value: u32) -> ConfigResult<()> {
    if value < MIN_DIMENSION {
        return Err(ConfigurationError::InvalidDimension {
            axis,
            value,
            min: MIN_DIMENSION,
        });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f32) -> ConfigResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigurationError::InvalidParameter {
            name,
            reason: format!("must be a positive finite number, got {value}"),
        });
    }
    Ok(())
}

fn default_width() -> u32 {
    80
}
fn default_height() -> u32 {
    60
}
fn default_seed() -> u64 {
    rand::random()
}
fn default_octaves() -> u32 {
    5
}
fn default_persistence() -> f32 {
    0.5
}
fn default_lacunarity() -> f32 {
    2.0
}
fn default_scale() -> f32 {
    100.0
}
fn default_river_count() -> u32 {
    8
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: default_seed(),
            mode: TerrainMode::Continent,
            octaves: default_octaves(),
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
            scale: default_scale(),
            river_count: default_river_count(),
            prevailing_wind: PrevailingWind::West,
        }
    }
}
