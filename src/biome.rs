// src/biome.rs
//! Классификация биомов по таблице правил
//!
//! Таблица — это данные, а не код: упорядоченный список правил, первое совпавшее
//! правило определяет биом. Вызывающий код может подставить свою таблицу
//! (например, из TOML), не меняя алгоритм классификации.
//!
//! ## Таблица по умолчанию
//!
//! Вода и пляж проверяются раньше биомов суши:
//!
//! | биом               | высота        | влажность    | вода |
//! |--------------------|---------------|--------------|------|
//! | `deep_ocean`       | [0, 0.21)     | —            | да   |
//! | `ocean`            | [0, 1]        | —            | да   |
//! | `beach`            | [0.35, 0.39)  | —            | нет  |
//! | `desert`           | [0.39, 0.70)  | [0, 0.2)     | —    |
//! | `grassland`        | [0.39, 0.70)  | [0.2, 0.45)  | —    |
//! | `temperate_forest` | [0.39, 0.70)  | [0.45, 0.75) | —    |
//! | `wetlands`         | [0.39, 0.70)  | [0.75, 1]    | —    |
//! | `highland`         | [0.70, 0.85)  | —            | —    |
//! | `mountain`         | [0.85, 1]     | —            | —    |

use crate::config::{HIGHLAND_ELEVATION, MOUNTAIN_ELEVATION, SEA_LEVEL};
use crate::error::{ConfigResult, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Верхняя граница пляжа
pub const BEACH_ELEVATION: f32 = SEA_LEVEL + 0.04;
/// Глубокий океан — ниже 60% уровня моря
pub const DEEP_OCEAN_ELEVATION: f32 = SEA_LEVEL * 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    DeepOcean,
    Ocean,
    Beach,
    Desert,
    Grassland,
    TemperateForest,
    Wetlands,
    Highland,
    Mountain,
}

impl Biome {
    pub const ALL: [Biome; 9] = [
        Biome::DeepOcean,
        Biome::Ocean,
        Biome::Beach,
        Biome::Desert,
        Biome::Grassland,
        Biome::TemperateForest,
        Biome::Wetlands,
        Biome::Highland,
        Biome::Mountain,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Biome::DeepOcean => "deep_ocean",
            Biome::Ocean => "ocean",
            Biome::Beach => "beach",
            Biome::Desert => "desert",
            Biome::Grassland => "grassland",
            Biome::TemperateForest => "temperate_forest",
            Biome::Wetlands => "wetlands",
            Biome::Highland => "highland",
            Biome::Mountain => "mountain",
        }
    }

    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            Biome::DeepOcean => [27, 59, 111],
            Biome::Ocean => [52, 101, 164],
            Biome::Beach => [232, 217, 160],
            Biome::Desert => [217, 194, 127],
            Biome::Grassland => [127, 191, 63],
            Biome::TemperateForest => [46, 139, 87],
            Biome::Wetlands => [59, 107, 107],
            Biome::Highland => [170, 140, 95],
            Biome::Mountain => [136, 136, 136],
        }
    }

    /// Символ для ASCII-превью
    pub fn ascii(self) -> char {
        match self {
            Biome::DeepOcean => '~',
            Biome::Ocean => '-',
            Biome::Beach => ':',
            Biome::Desert => 'd',
            Biome::Grassland => '.',
            Biome::TemperateForest => 'f',
            Biome::Wetlands => 'w',
            Biome::Highland => 'h',
            Biome::Mountain => '^',
        }
    }

    /// Цвет фона ANSI (256 цветов)
    pub fn ansi_code(self) -> u8 {
        match self {
            Biome::DeepOcean => 17,
            Biome::Ocean => 19,
            Biome::Beach => 187,
            Biome::Desert => 179,
            Biome::Grassland => 70,
            Biome::TemperateForest => 28,
            Biome::Wetlands => 23,
            Biome::Highland => 137,
            Biome::Mountain => 244,
        }
    }
}

/// Диапазон [min, max). Если `max >= 1.0`, верхняя граница включается.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub const FULL: Band = Band { min: 0.0, max: 1.0 };

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && (value < self.max || (self.max >= 1.0 && value <= self.max))
    }
}

/// Одно правило таблицы. Пустые условия (`None`) совпадают с любым значением.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeRule {
    pub biome: Biome,
    pub elevation: Band,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture: Option<Band>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub river: Option<bool>,
}

impl BiomeRule {
    pub fn new(biome: Biome, elevation: Band) -> Self {
        Self {
            biome,
            elevation,
            moisture: None,
            water: None,
            river: None,
        }
    }

    #[must_use]
    pub fn moisture(mut self, band: Band) -> Self {
        self.moisture = Some(band);
        self
    }

    #[must_use]
    pub fn water(mut self, water: bool) -> Self {
        self.water = Some(water);
        self
    }

    #[must_use]
    pub fn river(mut self, river: bool) -> Self {
        self.river = Some(river);
        self
    }

    pub fn matches(&self, elevation: f32, moisture: f32, water: bool, river: bool) -> bool {
        self.elevation.contains(elevation)
            && self.moisture.is_none_or(|band| band.contains(moisture))
            && self.water.is_none_or(|w| w == water)
            && self.river.is_none_or(|r| r == river)
    }
}

/// Упорядоченная таблица правил: побеждает первое совпадение
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeTable {
    rules: Vec<BiomeRule>,
}

impl BiomeTable {
    pub fn new(rules: Vec<BiomeRule>) -> ConfigResult<Self> {
        if rules.is_empty() {
            return Err(ConfigurationError::EmptyBiomeTable);
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[BiomeRule] {
        &self.rules
    }

    /// Загружает таблицу из TOML (массив `[[rules]]`)
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let table: Self = toml::from_str(contents)?;
        Self::new(table.rules)
    }

    /// Биом тайла. Если ни одно правило не подошло, берётся биом последнего правила,
    /// так что каждый тайл получает ровно один биом.
    pub fn classify(&self, elevation: f32, moisture: f32, water: bool, river: bool) -> Biome {
        self.rules
            .iter()
            .find(|rule| rule.matches(elevation, moisture, water, river))
            .or(self.rules.last())
            .map_or(Biome::Ocean, |rule| rule.biome)
    }
}

impl Default for BiomeTable {
    fn default() -> Self {
        let lowland = Band::new(BEACH_ELEVATION, HIGHLAND_ELEVATION);
        Self {
            rules: vec![
                BiomeRule::new(Biome::DeepOcean, Band::new(0.0, DEEP_OCEAN_ELEVATION)).water(true),
                BiomeRule::new(Biome::Ocean, Band::FULL).water(true),
                BiomeRule::new(Biome::Beach, Band::new(SEA_LEVEL, BEACH_ELEVATION)).water(false),
                BiomeRule::new(Biome::Desert, lowland).moisture(Band::new(0.0, 0.2)),
                BiomeRule::new(Biome::Grassland, lowland).moisture(Band::new(0.2, 0.45)),
                BiomeRule::new(Biome::TemperateForest, lowland).moisture(Band::new(0.45, 0.75)),
                BiomeRule::new(Biome::Wetlands, lowland).moisture(Band::new(0.75, 1.0)),
                BiomeRule::new(Biome::Highland, Band::new(HIGHLAND_ELEVATION, MOUNTAIN_ELEVATION)),
                BiomeRule::new(Biome::Mountain, Band::new(MOUNTAIN_ELEVATION, 1.0)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_whole_domain() {
        let table = BiomeTable::default();
        assert_eq!(table.rules().len(), 9);
        for ei in 0..=100 {
            let e = ei as f32 / 100.0;
            let water = e < SEA_LEVEL;
            for mi in 0..=20 {
                let m = mi as f32 / 20.0;
                for river in [false, true] {
                    assert!(
                        table.rules().iter().any(|r| r.matches(e, m, water, river)),
                        "no rule for e={e} m={m} river={river}"
                    );
                }
            }
        }
    }

    #[test]
    fn water_and_beach_checked_before_land() {
        let table = BiomeTable::default();
        assert_eq!(table.classify(0.1, 0.9, true, false), Biome::DeepOcean);
        assert_eq!(table.classify(0.3, 0.1, true, true), Biome::Ocean);
        assert_eq!(table.classify(0.36, 0.05, false, false), Biome::Beach);
    }

    #[test]
    fn land_bands() {
        let table = BiomeTable::default();
        assert_eq!(table.classify(0.5, 0.1, false, false), Biome::Desert);
        assert_eq!(table.classify(0.5, 0.3, false, false), Biome::Grassland);
        assert_eq!(table.classify(0.5, 0.6, false, false), Biome::TemperateForest);
        assert_eq!(table.classify(0.5, 1.0, false, false), Biome::Wetlands);
        assert_eq!(table.classify(0.75, 0.5, false, false), Biome::Highland);
        assert_eq!(table.classify(1.0, 0.0, false, false), Biome::Mountain);
    }

    #[test]
    fn band_upper_bound_closed_only_at_one() {
        assert!(Band::new(0.2, 0.45).contains(0.2));
        assert!(!Band::new(0.2, 0.45).contains(0.45));
        assert!(Band::FULL.contains(1.0));
    }

    #[test]
    fn first_match_wins_with_overlaps() {
        let table = BiomeTable::new(vec![
            BiomeRule::new(Biome::Wetlands, Band::FULL).river(true),
            BiomeRule::new(Biome::Grassland, Band::FULL),
        ])
        .unwrap();
        assert_eq!(table.classify(0.5, 0.5, false, true), Biome::Wetlands);
        assert_eq!(table.classify(0.5, 0.5, false, false), Biome::Grassland);
    }

    #[test]
    fn unmatched_tile_falls_back_to_last_rule() {
        let table = BiomeTable::new(vec![
            BiomeRule::new(Biome::Ocean, Band::new(0.0, 0.3)),
            BiomeRule::new(Biome::Mountain, Band::new(0.9, 1.0)),
        ])
        .unwrap();
        assert_eq!(table.classify(0.5, 0.5, false, false), Biome::Mountain);
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            BiomeTable::new(Vec::new()),
            Err(ConfigurationError::EmptyBiomeTable)
        ));
    }

    #[test]
    fn table_loads_from_toml() {
        let table = BiomeTable::from_toml_str(
            r#"
            [[rules]]
            biome = "ocean"
            elevation = { min = 0.0, max = 0.4 }
            water = true

            [[rules]]
            biome = "wetlands"
            elevation = { min = 0.0, max = 1.0 }
            moisture = { min = 0.6, max = 1.0 }

            [[rules]]
            biome = "grassland"
            elevation = { min = 0.0, max = 1.0 }
            "#,
        )
        .unwrap();
        assert_eq!(table.rules().len(), 3);
        assert_eq!(table.classify(0.2, 0.9, true, false), Biome::Ocean);
        assert_eq!(table.classify(0.6, 0.9, false, false), Biome::Wetlands);
        assert_eq!(table.classify(0.6, 0.1, false, false), Biome::Grassland);
    }

    #[test]
    fn empty_toml_table_is_rejected() {
        assert!(BiomeTable::from_toml_str("rules = []").is_err());
    }

    #[test]
    fn default_table_round_trips_through_toml() {
        let table = BiomeTable::default();
        let text = toml::to_string(&table).unwrap();
        assert_eq!(BiomeTable::from_toml_str(&text).unwrap(), table);
    }
}
