// src/terrain.rs
//! Сборка карты: единственная точка входа генератора
//!
//! Порядок стадий строгий:
//! шум → искажение → форма → сетка высот → реки → влажность → биомы → результат.
//!
//! После трассировки рек высоты больше не меняются: влажность и биомы только читают
//! сетку высот и флаги воды/рек. Все выборки из потоков случайных чисел происходят
//! в фиксированном порядке до параллельных стадий, поэтому результат не зависит
//! от фичи `parallel`.

use std::collections::BTreeMap;

use crate::biome::{Biome, BiomeTable};
use crate::climate::calculate_moisture;
use crate::config::{GenerationParams, TerrainMode};
use crate::error::ConfigResult;
use crate::heightmap::{ElevationSampler, Heightmap, generate_heightmap};
use crate::rivers::{River, trace_rivers};
use crate::rng::{Phase, SeedSequence};
use serde::{Deserialize, Serialize};

/// Метка схемы выходного документа
pub const SCHEMA: &str = "terrain.v1";

/// Один тайл готовой карты
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub elevation: f32,
    pub moisture: f32,
    pub biome: Biome,
    pub water: bool,
    pub river: bool,
}

/// Зарезервированные коллекции объектов; в этой версии всегда пусты
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub mountain_ranges: Vec<Vec<[u32; 2]>>,
    pub lakes: Vec<Vec<[u32; 2]>>,
}

/// Результат генерации. Принадлежит вызывающему коду; структурное равенство через `PartialEq`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainResult {
    pub schema: String,
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub mode: TerrainMode,
    pub params: GenerationParams,
    /// Тайлы построчно: y снаружи, x внутри
    pub tiles: Vec<Tile>,
    pub rivers: Vec<River>,
    pub features: Features,
}

impl TerrainResult {
    /// Средняя высота по всем тайлам
    pub fn get_average_elevation(&self) -> f32 {
        if self.tiles.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.tiles.iter().map(|t| f64::from(t.elevation)).sum();
        (sum / self.tiles.len() as f64) as f32
    }

    pub fn tile(&self, x: u32, y: u32) -> Option<&Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get((y * self.width + x) as usize)
    }

    /// Количество тайлов каждого биома (только встретившиеся биомы)
    pub fn biome_counts(&self) -> BTreeMap<Biome, usize> {
        let mut counts = BTreeMap::new();
        for tile in &self.tiles {
            *counts.entry(tile.biome).or_insert(0) += 1;
        }
        counts
    }

    /// Доля тайлов суши
    pub fn land_ratio(&self) -> f32 {
        if self.tiles.is_empty() {
            return 0.0;
        }
        let land = self.tiles.iter().filter(|t| !t.water).count();
        land as f32 / self.tiles.len() as f32
    }
}

/// Генератор карты. Параметры проверяются при построении, до любой выборки шума.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    params: GenerationParams,
    biomes: BiomeTable,
}

impl TerrainGenerator {
    pub fn new(params: GenerationParams) -> ConfigResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            biomes: BiomeTable::default(),
        })
    }

    /// Заменяет таблицу биомов (алгоритм классификации не меняется)
    #[must_use]
    pub fn with_biome_table(mut self, biomes: BiomeTable) -> Self {
        self.biomes = biomes;
        self
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn biome_table(&self) -> &BiomeTable {
        &self.biomes
    }

    /// Сетка высот без рек и биомов
    pub fn heightmap(&self) -> Heightmap {
        let seeds = SeedSequence::new(self.params.seed);
        let sampler = ElevationSampler::new(&self.params, &seeds);
        generate_heightmap(&self.params, &sampler)
    }

    pub fn generate(&self) -> TerrainResult {
        let params = &self.params;
        let seeds = SeedSequence::new(params.seed);
        log::debug!(
            "генерация {}×{} seed={} mode={}",
            params.width,
            params.height,
            params.seed,
            params.mode
        );

        let sampler = ElevationSampler::new(params, &seeds);
        let heightmap = generate_heightmap(params, &sampler);
        log::debug!("сетка высот готова");

        let river_map = trace_rivers(
            &heightmap,
            params.river_count as usize,
            &mut seeds.stream(Phase::Rivers),
        );
        log::debug!("трассировано рек: {}", river_map.rivers.len());

        let moisture = calculate_moisture(&heightmap, &river_map.mask, params.prevailing_wind);

        let tiles: Vec<Tile> = heightmap
            .data
            .iter()
            .enumerate()
            .map(|(idx, &elevation)| {
                let (x, y) = heightmap.coords(idx);
                let water = heightmap.is_water(idx);
                let river = river_map.mask[idx];
                Tile {
                    x,
                    y,
                    elevation,
                    moisture: moisture[idx],
                    biome: self.biomes.classify(elevation, moisture[idx], water, river),
                    water,
                    river,
                }
            })
            .collect();

        let result = TerrainResult {
            schema: SCHEMA.to_string(),
            seed: params.seed,
            width: params.width,
            height: params.height,
            mode: params.mode,
            params: params.clone(),
            tiles,
            rivers: river_map.rivers,
            features: Features::default(),
        };
        log::info!(
            "карта {}×{} готова: суша {:.1}%, средняя высота {:.3}",
            result.width,
            result.height,
            result.land_ratio() * 100.0,
            result.get_average_elevation()
        );
        result
    }
}

/// Проверяет параметры и генерирует карту одним вызовом
pub fn generate(params: GenerationParams) -> ConfigResult<TerrainResult> {
    Ok(TerrainGenerator::new(params)?.generate())
}
