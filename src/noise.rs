//! Многооктавный когерентный шум и искажение координат (domain warping)

use crate::config::GenerationParams;
use crate::rng::RandomStream;
use crate::shaper::ISLAND_MASK_FREQUENCY;
use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

/// Максимальное смещение октавы в пространстве шума
const OCTAVE_OFFSET_RANGE: f32 = 1024.0;

/// Амплитуда искажения как доля `scale`
pub const WARP_AMPLITUDE: f32 = 0.35;

/// Октав в поле искажения (больше не нужно: искажение должно быть плавным)
const WARP_OCTAVES: u32 = 3;

/// Смещение второй компоненты искажения в единицах `scale`
const WARP_DECORRELATION: (f32, f32) = (5.2, 1.3);

#[derive(Debug, Clone, Copy)]
struct Octave {
    frequency: f32,
    amplitude: f32,
    offset: (f32, f32),
}

/// Наибольшая по модулю координата, которую получит `get_noise_2d` при этих параметрах
///
/// Учитывает старшую октаву, маску островов, искажение и смещения октав.
/// Считается в `f64`, чтобы переполнение не пряталось за `inf`.
#[must_use]
pub fn max_noise_coordinate(params: &GenerationParams) -> f64 {
    let scale = f64::from(params.scale);
    let finest = f64::from(params.lacunarity)
        .powi(params.octaves.saturating_sub(1).min(i32::MAX as u32) as i32)
        .max(1.0)
        .max(f64::from(ISLAND_MASK_FREQUENCY));
    let extent = f64::from(params.width.max(params.height))
        + f64::from(WARP_AMPLITUDE + WARP_DECORRELATION.0.max(WARP_DECORRELATION.1)) * scale;
    finest / scale * extent + f64::from(OCTAVE_OFFSET_RANGE)
}

/// Фрактальный шум (fBm) на градиентном шуме Перлина
///
/// Значение нормировано суммой амплитуд и лежит в [-1, 1] при любом числе октав.
/// Сид и смещения октав берутся из потока, поэтому поле полностью определено сидом.
pub struct NoiseField {
    noise: FastNoiseLite,
    octaves: Vec<Octave>,
    total_amplitude: f32,
}

impl NoiseField {
    pub fn new(
        stream: &mut RandomStream,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
        scale: f32,
    ) -> Self {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(stream.next_seed()));
        noise.set_noise_type(Some(NoiseType::Perlin));
        // Октавы суммируем сами, чтобы контролировать нормировку и смещения
        noise.set_fractal_type(Some(FractalType::None));
        noise.set_frequency(Some(1.0));

        let mut amplitude = 1.0f32;
        let mut frequency = 1.0 / scale;
        let mut total_amplitude = 0.0f32;
        let octaves = (0..octaves.max(1))
            .map(|_| {
                let offset = (
                    stream.next_unit() * OCTAVE_OFFSET_RANGE,
                    stream.next_unit() * OCTAVE_OFFSET_RANGE,
                );
                let octave = Octave {
                    frequency,
                    amplitude,
                    offset,
                };
                total_amplitude += amplitude;
                amplitude *= persistence;
                frequency *= lacunarity;
                octave
            })
            .collect();

        Self {
            noise,
            octaves,
            total_amplitude,
        }
    }

    /// Поле высот с параметрами октав из конфигурации
    pub fn from_params(stream: &mut RandomStream, params: &GenerationParams) -> Self {
        Self::new(
            stream,
            params.octaves,
            params.persistence,
            params.lacunarity,
            params.scale,
        )
    }

    /// Значение шума в точке (координаты в тайлах), диапазон [-1, 1]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let sum: f32 = self
            .octaves
            .iter()
            .map(|o| {
                let nx = x * o.frequency + o.offset.0;
                let ny = y * o.frequency + o.offset.1;
                self.noise.get_noise_2d(nx, ny) * o.amplitude
            })
            .sum();
        (sum / self.total_amplitude).clamp(-1.0, 1.0)
    }

    #[must_use]
    pub fn octave_count(&self) -> usize {
        self.octaves.len()
    }
}

/// Искажение координат вторым, независимо засеянным полем шума
pub struct DomainWarper {
    field: NoiseField,
    amplitude: f32,
    scale: f32,
}

impl DomainWarper {
    pub fn new(stream: &mut RandomStream, params: &GenerationParams) -> Self {
        let field = NoiseField::new(
            stream,
            params.octaves.min(WARP_OCTAVES),
            params.persistence,
            params.lacunarity,
            params.scale,
        );
        Self {
            field,
            amplitude: WARP_AMPLITUDE * params.scale,
            scale: params.scale,
        }
    }

    /// warped(x, y) = (x + A·n_x(x, y), y + A·n_y(x, y))
    pub fn warp(&self, x: f32, y: f32) -> (f32, f32) {
        let nx = self.field.sample(x, y);
        let ny = self.field.sample(
            x + WARP_DECORRELATION.0 * self.scale,
            y + WARP_DECORRELATION.1 * self.scale,
        );
        (x + self.amplitude * nx, y + self.amplitude * ny)
    }

    #[must_use]
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomStream;

    fn field(seed: u64, octaves: u32) -> NoiseField {
        NoiseField::new(&mut RandomStream::new(seed), octaves, 0.5, 2.0, 20.0)
    }

    #[test]
    fn same_seed_gives_identical_field() {
        let a = field(3, 5);
        let b = field(3, 5);
        for i in 0..200 {
            let (x, y) = (i as f32 * 1.7, i as f32 * 0.3);
            assert_eq!(a.sample(x, y).to_bits(), b.sample(x, y).to_bits());
        }
    }

    #[test]
    fn different_seeds_give_different_fields() {
        let a = field(3, 5);
        let b = field(4, 5);
        let differs = (0..100).any(|i| {
            let p = i as f32 * 2.3;
            (a.sample(p, p * 0.5) - b.sample(p, p * 0.5)).abs() > 1e-4
        });
        assert!(differs);
    }

    #[test]
    fn output_is_normalized_for_any_octave_count() {
        for octaves in [1, 3, 8] {
            let f = field(11, octaves);
            assert_eq!(f.octave_count(), octaves as usize);
            for y in 0..40 {
                for x in 0..40 {
                    let v = f.sample(x as f32, y as f32);
                    assert!((-1.0..=1.0).contains(&v), "octaves={octaves} v={v}");
                }
            }
        }
    }

    #[test]
    fn field_is_continuous() {
        let f = field(5, 4);
        for i in 0..100 {
            let x = i as f32 * 0.9;
            let a = f.sample(x, 10.0);
            let b = f.sample(x + 0.01, 10.0);
            assert!((a - b).abs() < 0.05, "jump between {a} and {b}");
        }
    }

    #[test]
    fn field_is_not_constant() {
        let f = field(8, 5);
        let values: Vec<f32> = (0..50).map(|i| f.sample(i as f32 * 3.0, 7.0)).collect();
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(max - min > 0.05);
    }

    #[test]
    fn accepted_parameters_keep_noise_coordinates_in_range() {
        let params = GenerationParams {
            width: 50,
            height: 50,
            octaves: crate::config::MAX_OCTAVES,
            ..GenerationParams::with_seed(2)
        };
        assert!(params.validate().is_ok());
        assert!(max_noise_coordinate(&params) < crate::config::MAX_NOISE_COORDINATE);

        let field = NoiseField::from_params(&mut RandomStream::new(2), &params);
        let warper = DomainWarper::new(&mut RandomStream::new(3), &params);
        for i in 0..50 {
            let (wx, wy) = warper.warp(i as f32, 49.0 - i as f32);
            let v = field.sample(wx, wy);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn warp_displacement_is_bounded_by_amplitude() {
        let params = GenerationParams::with_seed(1);
        let warper = DomainWarper::new(&mut RandomStream::new(1), &params);
        assert!((warper.amplitude() - WARP_AMPLITUDE * params.scale).abs() < 1e-4);
        for i in 0..100 {
            let (x, y) = (i as f32, (i * 3 % 60) as f32);
            let (wx, wy) = warper.warp(x, y);
            assert!((wx - x).abs() <= warper.amplitude() + 1e-3);
            assert!((wy - y).abs() <= warper.amplitude() + 1e-3);
        }
    }
}
