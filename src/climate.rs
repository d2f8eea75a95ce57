use std::collections::VecDeque;

use crate::config::{HIGHLAND_ELEVATION, PrevailingWind};
use crate::heightmap::{Heightmap, map_tiles};

/// Радиус (в шагах сетки), за которым близость воды перестаёт давать влагу
pub const MOISTURE_RADIUS: f32 = 12.0;

const MOISTURE_BASE: f32 = 0.1;
const DISTANCE_WEIGHT: f32 = 0.6;
const OROGRAPHIC_WEIGHT: f32 = 0.25;

/// Сколько тайлов проверяем против ветра
pub const RAIN_SHADOW_STEPS: i32 = 6;
/// Насколько пробный тайл должен быть выше текущего
pub const RAIN_SHADOW_DELTA: f32 = 0.15;
pub const RAIN_SHADOW_PENALTY: f32 = 0.3;

const CARDINAL: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Расстояние в шагах сетки до ближайшей воды или реки (BFS от всех источников сразу).
/// Недостижимые тайлы получают `u32::MAX`.
pub fn distance_to_water(heightmap: &Heightmap, river_mask: &[bool]) -> Vec<u32> {
    let mut dist = vec![u32::MAX; heightmap.len()];
    let mut queue = VecDeque::new();

    for idx in 0..heightmap.len() {
        if heightmap.is_water(idx) || river_mask[idx] {
            dist[idx] = 0;
            queue.push_back(idx);
        }
    }

    while let Some(idx) = queue.pop_front() {
        let d = dist[idx];
        for &(dx, dy) in &CARDINAL {
            if let Some(n) = heightmap.offset(idx, dx, dy) {
                if dist[n] == u32::MAX {
                    dist[n] = d + 1;
                    queue.push_back(n);
                }
            }
        }
    }

    dist
}

/// Вклад близости воды: 1 у воды, линейно падает до 0 на [`MOISTURE_RADIUS`]
pub fn proximity(steps: u32) -> f32 {
    if steps == u32::MAX {
        return 0.0;
    }
    (1.0 - steps as f32 / MOISTURE_RADIUS).max(0.0)
}

/// Орографический подъём: растёт до порога нагорий, выше — вершины сухие
pub fn orographic_lift(elevation: f32) -> f32 {
    if elevation < HIGHLAND_ELEVATION {
        elevation / HIGHLAND_ELEVATION
    } else {
        1.0 - 2.0 * (elevation - HIGHLAND_ELEVATION) / (1.0 - HIGHLAND_ELEVATION)
    }
}

/// Есть ли против ветра (в пределах [`RAIN_SHADOW_STEPS`]) заметно более высокий тайл
pub fn in_rain_shadow(heightmap: &Heightmap, idx: usize, wind: PrevailingWind) -> bool {
    let (dx, dy) = wind.upwind_step();
    let here = heightmap.data[idx];
    (1..=RAIN_SHADOW_STEPS)
        .map_while(|step| heightmap.offset(idx, dx * step, dy * step))
        .any(|probe| heightmap.data[probe] > here + RAIN_SHADOW_DELTA)
}

/// Влажность каждого тайла в [0, 1]. Высоты и флаги рек только читаются.
pub fn calculate_moisture(
    heightmap: &Heightmap,
    river_mask: &[bool],
    wind: PrevailingWind,
) -> Vec<f32> {
    let dist = distance_to_water(heightmap, river_mask);
    map_tiles(heightmap.len(), |idx| {
        let elevation = heightmap.data[idx];
        let shadow = if in_rain_shadow(heightmap, idx, wind) {
            RAIN_SHADOW_PENALTY
        } else {
            0.0
        };
        let m = MOISTURE_BASE
            + DISTANCE_WEIGHT * proximity(dist[idx])
            + OROGRAPHIC_WEIGHT * orographic_lift(elevation)
            - shadow;
        m.clamp(0.0, 1.0)
    })
}
