use crate::config::RIVER_SOURCE_ELEVATION;
use crate::heightmap::Heightmap;
use crate::rng::RandomStream;
use serde::{Deserialize, Serialize};

/// Предел длины пути: множитель от max(width, height)
pub const RIVER_STEP_CAP_FACTOR: u32 = 4;

/// Почему река остановилась
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiverTermination {
    /// Дошла до воды (устье)
    Mouth,
    /// Нет соседа строго ниже
    LocalMinimum,
    /// Исчерпан предел шагов
    StepCap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct River {
    /// `river_NNN`
    pub id: String,
    pub source: [u32; 2],
    pub mouth: [u32; 2],
    /// Количество тайлов в пути, включая исток и устье
    pub length: u32,
    pub termination: RiverTermination,
    /// Путь от истока до устья по 8-связным соседям
    pub path: Vec<[u32; 2]>,
}

pub struct RiverMap {
    pub rivers: Vec<River>,
    /// Флаг реки для каждого тайла
    pub mask: Vec<bool>,
}

pub fn river_id(index: usize) -> String {
    format!("river_{index:03}")
}

pub fn step_cap(heightmap: &Heightmap) -> u32 {
    RIVER_STEP_CAP_FACTOR * heightmap.width.max(heightmap.height)
}

/// Трассирует `count` рек вниз по склону.
///
/// Истоки выбираются из потока заранее, до начала трассировки. Сама трассировка
/// не использует случайность: при равных высотах побеждает первый сосед в порядке обхода.
pub fn trace_rivers(heightmap: &Heightmap, count: usize, stream: &mut RandomStream) -> RiverMap {
    let sources = select_sources(heightmap, count, stream);
    let cap = step_cap(heightmap) as usize;
    let mut mask = vec![false; heightmap.len()];

    let rivers = sources
        .iter()
        .enumerate()
        .map(|(i, &source)| {
            let (path, termination) = walk_downhill(heightmap, source, cap);
            for &idx in &path {
                mask[idx] = true;
            }
            let to_xy = |idx: usize| {
                let (x, y) = heightmap.coords(idx);
                [x, y]
            };
            River {
                id: river_id(i),
                source: to_xy(source),
                mouth: to_xy(path[path.len() - 1]),
                length: path.len() as u32,
                termination,
                path: path.into_iter().map(to_xy).collect(),
            }
        })
        .collect();

    RiverMap { rivers, mask }
}

/// Выбор истоков: без повторов, пока хватает кандидатов; затем пул пополняется заново.
fn select_sources(heightmap: &Heightmap, count: usize, stream: &mut RandomStream) -> Vec<usize> {
    if count == 0 || heightmap.is_empty() {
        return Vec::new();
    }

    let mut eligible: Vec<usize> = (0..heightmap.len())
        .filter(|&i| !heightmap.is_water(i) && heightmap.data[i] > RIVER_SOURCE_ELEVATION)
        .collect();

    if eligible.is_empty() {
        // Высоких тайлов нет: берём самые высокие из имеющихся
        let mut by_height: Vec<usize> = (0..heightmap.len()).collect();
        by_height.sort_by(|&a, &b| {
            heightmap.data[b]
                .total_cmp(&heightmap.data[a])
                .then(a.cmp(&b))
        });
        by_height.truncate(count);
        eligible = by_height;
        log::debug!(
            "нет тайлов выше {RIVER_SOURCE_ELEVATION}, истоки берутся из {} самых высоких",
            eligible.len()
        );
    }

    let mut pool = eligible.clone();
    let mut sources = Vec::with_capacity(count);
    for _ in 0..count {
        if pool.is_empty() {
            pool.clone_from(&eligible);
        }
        let pick = stream.next_below(pool.len());
        sources.push(pool.swap_remove(pick));
    }
    sources
}

/// Жадный спуск к строго наименьшему соседу
fn walk_downhill(heightmap: &Heightmap, source: usize, cap: usize) -> (Vec<usize>, RiverTermination) {
    let mut path = vec![source];
    let mut current = source;

    loop {
        if heightmap.is_water(current) {
            return (path, RiverTermination::Mouth);
        }
        if path.len() >= cap {
            return (path, RiverTermination::StepCap);
        }

        let mut lowest = heightmap.data[current];
        let mut next = None;
        for n in heightmap.neighbors8(current) {
            if heightmap.data[n] < lowest {
                lowest = heightmap.data[n];
                next = Some(n);
            }
        }

        match next {
            Some(n) => {
                path.push(n);
                current = n;
            }
            None => return (path, RiverTermination::LocalMinimum),
        }
    }
}
