//! Макро-форма рельефа по режиму карты
//!
//! Чистая функция тайла: (режим, x, y, ширина, высота, сырая высота) → высота в [0, 1].
//! Новый режим — это новая ветка `match`, вызывающий код не меняется.
//! Используется только арифметика и `sqrt`, поэтому результат побитово совпадает на всех платформах.

use crate::config::{GenerationParams, TerrainMode};
use crate::noise::NoiseField;
use crate::rng::RandomStream;

/// Множитель высоты на краю материка
const CONTINENT_EDGE_FACTOR: f32 = 0.45;
/// Прирост множителя к центру материка
const CONTINENT_CORE_GAIN: f32 = 0.75;

/// Частота маски островов в единицах `1 / scale`: острова мельче материка, но крупнее детальных октав
pub(crate) const ISLAND_MASK_FREQUENCY: f32 = 5.0;
/// Порог маски: ниже — тянем к воде, выше — к суше
const ISLAND_MASK_THRESHOLD: f32 = 0.6;
/// Общее опускание рельефа архипелага
const ARCHIPELAGO_SINK: f32 = 0.5;
/// Сила подъёма суши над маской
const ARCHIPELAGO_UPLIFT: f32 = 0.7;

/// Подъём нагорий: h + k·h·(1 − h), монотонно при k < 1.
/// Глубокие впадины (сырая высота ниже ~0.27) остаются морем.
const HIGHLAND_LIFT: f32 = 0.4;

/// Контраст при переводе шума [-1, 1] в высоту [0, 1]
pub const ELEVATION_CONTRAST: f32 = 1.6;

/// Переводит значение шума в [-1, 1] в сырую высоту [0, 1]
#[must_use]
pub fn noise_to_unit(n: f32) -> f32 {
    (0.5 + 0.5 * ELEVATION_CONTRAST * n).clamp(0.0, 1.0)
}

pub struct ModeShaper {
    mode: TerrainMode,
    width: u32,
    height: u32,
    island_mask: Option<NoiseField>,
}

impl ModeShaper {
    /// Маска островов создаётся только для архипелага; поток принадлежит фазе `IslandMask`.
    pub fn new(params: &GenerationParams, stream: &mut RandomStream) -> Self {
        let island_mask = matches!(params.mode, TerrainMode::Archipelago).then(|| {
            NoiseField::new(stream, 1, 1.0, 1.0, params.scale / ISLAND_MASK_FREQUENCY)
        });
        Self {
            mode: params.mode,
            width: params.width,
            height: params.height,
            island_mask,
        }
    }

    pub fn shape(&self, x: u32, y: u32, raw: f32) -> f32 {
        let shaped = match self.mode {
            TerrainMode::Continent => raw * self.continent_factor(x, y),
            TerrainMode::Archipelago => {
                let mask = self
                    .island_mask
                    .as_ref()
                    .map_or(0.0, |m| noise_to_unit(m.sample(x as f32, y as f32)));
                archipelago(raw, mask)
            }
            TerrainMode::Highlands => raw + HIGHLAND_LIFT * raw * (1.0 - raw),
            TerrainMode::None => raw,
        };
        shaped.clamp(0.0, 1.0)
    }

    /// Эллиптическое затухание: максимум в центре, `CONTINENT_EDGE_FACTOR` на краях и в углах
    fn continent_factor(&self, x: u32, y: u32) -> f32 {
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;
        let dx = (x as f32 + 0.5 - half_w) / half_w;
        let dy = (y as f32 + 0.5 - half_h) / half_h;
        let d = (dx * dx + dy * dy).sqrt().min(1.0);
        CONTINENT_EDGE_FACTOR + CONTINENT_CORE_GAIN * (1.0 - d * d)
    }
}

fn archipelago(raw: f32, mask: f32) -> f32 {
    let sunk = raw * ARCHIPELAGO_SINK;
    if mask < ISLAND_MASK_THRESHOLD {
        let t = (ISLAND_MASK_THRESHOLD - mask) / ISLAND_MASK_THRESHOLD;
        sunk * (1.0 - 0.5 * t)
    } else {
        let t = (mask - ISLAND_MASK_THRESHOLD) / (1.0 - ISLAND_MASK_THRESHOLD);
        sunk + (1.0 - sunk) * ARCHIPELAGO_UPLIFT * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SEA_LEVEL;

    fn shaper(mode: TerrainMode) -> ModeShaper {
        let params = GenerationParams {
            mode,
            width: 60,
            height: 60,
            ..GenerationParams::with_seed(9)
        };
        ModeShaper::new(&params, &mut RandomStream::new(9))
    }

    #[test]
    fn none_is_pass_through() {
        let s = shaper(TerrainMode::None);
        for raw in [0.0, 0.2, 0.5, 0.77, 1.0] {
            assert_eq!(s.shape(3, 40, raw), raw);
        }
    }

    #[test]
    fn continent_center_is_higher_than_border() {
        let s = shaper(TerrainMode::Continent);
        let center = s.shape(30, 30, 0.5);
        let edge = s.shape(0, 30, 0.5);
        let corner = s.shape(0, 0, 0.5);
        assert!(center > edge);
        assert!(edge < SEA_LEVEL);
        assert!(corner <= edge);
    }

    #[test]
    fn highlands_lift_preserves_ordering() {
        let s = shaper(TerrainMode::Highlands);
        let mut prev = -1.0;
        for i in 0..=100 {
            let raw = i as f32 / 100.0;
            let shaped = s.shape(10, 10, raw);
            assert!(shaped >= raw);
            assert!(shaped > prev || raw == 0.0);
            prev = shaped;
        }
        assert!(s.shape(0, 0, 0.3) > SEA_LEVEL);
    }

    #[test]
    fn highlands_keep_deep_basins_under_water() {
        let s = shaper(TerrainMode::Highlands);
        assert!(s.shape(5, 5, 0.2) < SEA_LEVEL);
        assert!(s.shape(5, 5, 0.25) < SEA_LEVEL);
    }

    #[test]
    fn archipelago_sinks_land_outside_the_mask() {
        // Даже высокий сырой рельеф на пороге маски уходит под воду
        assert!(archipelago(0.65, ISLAND_MASK_THRESHOLD) < SEA_LEVEL);
        assert!(archipelago(0.3, 0.3) < SEA_LEVEL);
        assert!(archipelago(0.5, 0.9) > SEA_LEVEL);
    }

    #[test]
    fn archipelago_is_continuous_at_threshold_and_bounded() {
        let below = archipelago(0.5, ISLAND_MASK_THRESHOLD - 1e-5);
        let above = archipelago(0.5, ISLAND_MASK_THRESHOLD + 1e-5);
        assert!((below - above).abs() < 1e-3);
        assert!(archipelago(0.5, 0.0) < SEA_LEVEL);
        assert!(archipelago(0.5, 1.0) > SEA_LEVEL);

        let s = shaper(TerrainMode::Archipelago);
        for y in 0..60 {
            for x in 0..60 {
                let v = s.shape(x, y, 0.9);
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn island_mask_only_for_archipelago() {
        assert!(shaper(TerrainMode::Archipelago).island_mask.is_some());
        assert!(shaper(TerrainMode::Continent).island_mask.is_none());
    }
}
