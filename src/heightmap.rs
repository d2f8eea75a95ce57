use crate::config::{GenerationParams, SEA_LEVEL};
use crate::noise::{DomainWarper, NoiseField};
use crate::rng::{Phase, SeedSequence};
use crate::shaper::{ModeShaper, noise_to_unit};
use image::{ImageBuffer, Luma};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Порядок обхода 8 соседей. Фиксирован: от него зависит выбор при равных высотах.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Двумерная карта высот: значения от 0.0 (глубокий океан) до 1.0 (высокие горы)
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Heightmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width * height) as usize],
        }
    }

    /// Карта из готовых значений в порядке строк
    ///
    /// # Panics
    /// Если длина `data` не равна `width * height`.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), (width * height) as usize, "размер данных не совпадает с картой");
        Self {
            width,
            height,
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn coords(&self, idx: usize) -> (u32, u32) {
        let idx = idx as u32;
        (idx % self.width, idx / self.width)
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Сосед со смещением (dx, dy), если он внутри карты (края не зацикливаются)
    pub fn offset(&self, idx: usize, dx: i32, dy: i32) -> Option<usize> {
        let (x, y) = self.coords(idx);
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx >= 0 && nx < self.width as i32 && ny >= 0 && ny < self.height as i32 {
            Some((ny as u32 * self.width + nx as u32) as usize)
        } else {
            None
        }
    }

    /// 8 соседей в порядке [`DIRECTIONS`]
    pub fn neighbors8(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        DIRECTIONS
            .iter()
            .filter_map(move |&(dx, dy)| self.offset(idx, dx, dy))
    }

    pub fn is_water(&self, idx: usize) -> bool {
        self.data[idx] < SEA_LEVEL
    }

    pub fn to_grayscale_image(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
            .collect()
    }

    pub fn save_as_png(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.to_grayscale_image())
                .ok_or("Failed to create image buffer")?;
        img.save(path)?;
        Ok(())
    }
}

/// Вычисляет `f(i)` для каждого тайла, сохраняя порядок.
///
/// С фичей `parallel` работает через rayon; результат совпадает побитово, так как `f` чистая.
pub(crate) fn map_tiles<T, F>(count: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        (0..count).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..count).map(f).collect()
    }
}

/// Шум → искажение → форма. Все случайные выборки сделаны при построении.
pub struct ElevationSampler {
    field: NoiseField,
    warper: DomainWarper,
    shaper: ModeShaper,
}

impl ElevationSampler {
    pub fn new(params: &GenerationParams, seeds: &SeedSequence) -> Self {
        let field = NoiseField::from_params(&mut seeds.stream(Phase::Elevation), params);
        let warper = DomainWarper::new(&mut seeds.stream(Phase::Warp), params);
        let shaper = ModeShaper::new(params, &mut seeds.stream(Phase::IslandMask));
        Self {
            field,
            warper,
            shaper,
        }
    }

    /// Высота после искажения, но до макро-формы
    pub fn raw(&self, x: u32, y: u32) -> f32 {
        let (wx, wy) = self.warper.warp(x as f32, y as f32);
        noise_to_unit(self.field.sample(wx, wy))
    }

    pub fn elevation(&self, x: u32, y: u32) -> f32 {
        self.shaper.shape(x, y, self.raw(x, y)).clamp(0.0, 1.0)
    }
}

/// Строит окончательную сетку высот в [0, 1]
pub fn generate_heightmap(params: &GenerationParams, sampler: &ElevationSampler) -> Heightmap {
    let width = params.width;
    let data = map_tiles((params.width * params.height) as usize, |i| {
        let x = i as u32 % width;
        let y = i as u32 / width;
        sampler.elevation(x, y)
    });
    Heightmap::from_data(params.width, params.height, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerrainMode;

    #[test]
    fn neighbors_follow_fixed_order_and_clip_at_edges() {
        let map = Heightmap::new(4, 3);
        let center = map.index(1, 1);
        let expected: Vec<usize> = [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)]
            .iter()
            .map(|&(x, y)| map.index(x, y))
            .collect();
        assert_eq!(map.neighbors8(center).collect::<Vec<_>>(), expected);

        let corner = map.index(0, 0);
        assert_eq!(map.neighbors8(corner).count(), 3);
        assert_eq!(map.offset(map.index(3, 2), 1, 0), None);
    }

    #[test]
    fn coords_round_trip_index() {
        let map = Heightmap::new(7, 5);
        assert_eq!(map.coords(map.index(6, 4)), (6, 4));
        assert_eq!(map.coords(0), (0, 0));
    }

    #[test]
    fn water_is_below_sea_level() {
        let map = Heightmap::from_data(2, 1, vec![SEA_LEVEL - 0.01, SEA_LEVEL]);
        assert!(map.is_water(0));
        assert!(!map.is_water(1));
    }

    #[test]
    #[should_panic(expected = "размер данных")]
    fn from_data_rejects_mismatched_length() {
        let _ = Heightmap::from_data(3, 3, vec![0.5; 8]);
    }

    #[test]
    fn generated_heightmap_is_clamped_and_deterministic() {
        let params = GenerationParams {
            width: 50,
            height: 50,
            mode: TerrainMode::Highlands,
            ..GenerationParams::with_seed(77)
        };
        let seeds = SeedSequence::new(params.seed);
        let a = generate_heightmap(&params, &ElevationSampler::new(&params, &seeds));
        let b = generate_heightmap(&params, &ElevationSampler::new(&params, &seeds));
        assert_eq!(a.len(), 2500);
        assert!(a.data.iter().all(|h| (0.0..=1.0).contains(h)));
        assert_eq!(a, b);
    }

    #[test]
    fn mode_none_equals_raw_warped_field() {
        let params = GenerationParams {
            width: 50,
            height: 50,
            mode: TerrainMode::None,
            ..GenerationParams::with_seed(5)
        };
        let sampler = ElevationSampler::new(&params, &SeedSequence::new(5));
        let map = generate_heightmap(&params, &sampler);
        for (x, y) in [(0, 0), (49, 0), (25, 25), (0, 49), (49, 49)] {
            assert_eq!(map.get(x, y), sampler.raw(x, y));
        }
    }
}
