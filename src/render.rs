// src/render.rs
//! Превью готовой карты: ASCII, цветной терминал (ANSI) и PNG
//!
//! Модуль не участвует в генерации — он только читает [`TerrainResult`].
//!
//! ## Приоритет отображения тайла
//! 1. Вода — символ/цвет водного биома (глубокий или обычный океан)
//! 2. Река на суше — отдельный символ `=` и цвет реки
//! 3. Остальное — символ/цвет биома
//!
//! ## Пример использования
//! ```rust,no_run
//! use terrain_gen::{GenerationParams, generate, render};
//!
//! let result = generate(GenerationParams::with_seed(42))?;
//! println!("{}", render::ascii_map(&result));
//! render::save_preview_png(&result, "preview.png", 4)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::terrain::{TerrainResult, Tile};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

pub const RIVER_CHAR: char = '=';
pub const RIVER_RGB: [u8; 3] = [63, 141, 217];
const RIVER_ANSI: u8 = 25;

fn tile_char(tile: &Tile) -> char {
    if tile.river && !tile.water {
        RIVER_CHAR
    } else {
        tile.biome.ascii()
    }
}

fn tile_rgb(tile: &Tile) -> [u8; 3] {
    if tile.river && !tile.water {
        RIVER_RGB
    } else {
        tile.biome.to_rgb()
    }
}

/// Один символ на тайл, строки разделены `\n`
pub fn ascii_map(result: &TerrainResult) -> String {
    result
        .tiles
        .chunks(result.width as usize)
        .map(|row| row.iter().map(tile_char).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Два пробела с цветным фоном на тайл
pub fn ansi_map(result: &TerrainResult) -> String {
    const RESET: &str = "\x1b[0m";
    result
        .tiles
        .chunks(result.width as usize)
        .map(|row| {
            let mut line: String = row
                .iter()
                .map(|tile| {
                    let code = if tile.river && !tile.water {
                        RIVER_ANSI
                    } else {
                        tile.biome.ansi_code()
                    };
                    format!("\x1b[48;5;{code}m  ")
                })
                .collect();
            line.push_str(RESET);
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Растровое превью: тайл — квадрат `cell`×`cell`, реки поверх линиями по центрам тайлов
pub fn preview_image(result: &TerrainResult, cell: u32) -> RgbaImage {
    let cell = cell.max(1);
    let mut img = RgbaImage::new(result.width * cell, result.height * cell);

    for tile in &result.tiles {
        let [r, g, b] = tile_rgb(tile);
        draw_filled_rect_mut(
            &mut img,
            Rect::at((tile.x * cell) as i32, (tile.y * cell) as i32).of_size(cell, cell),
            Rgba([r, g, b, 255]),
        );
    }

    let [r, g, b] = RIVER_RGB;
    let center = |p: [u32; 2]| {
        (
            (p[0] * cell) as f32 + cell as f32 / 2.0,
            (p[1] * cell) as f32 + cell as f32 / 2.0,
        )
    };
    for river in &result.rivers {
        for step in river.path.windows(2) {
            draw_line_segment_mut(&mut img, center(step[0]), center(step[1]), Rgba([r, g, b, 255]));
        }
    }

    img
}

pub fn save_preview_png(
    result: &TerrainResult,
    path: &str,
    cell: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    preview_image(result, cell).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationParams, TerrainMode};
    use crate::terrain::generate;

    fn result() -> TerrainResult {
        generate(GenerationParams {
            width: 50,
            height: 50,
            mode: TerrainMode::Continent,
            ..GenerationParams::with_seed(2024)
        })
        .unwrap()
    }

    #[test]
    fn ascii_has_one_char_per_tile() {
        let result = result();
        let map = ascii_map(&result);
        let rows: Vec<&str> = map.lines().collect();
        assert_eq!(rows.len(), 50);
        assert!(rows.iter().all(|r| r.chars().count() == 50));

        let tile = result.tile(10, 3).unwrap();
        assert_eq!(rows[3].chars().nth(10), Some(tile_char(tile)));
    }

    #[test]
    fn river_tiles_on_land_are_marked() {
        let result = result();
        let map = ascii_map(&result);
        let land_rivers = result.tiles.iter().filter(|t| t.river && !t.water).count();
        assert_eq!(map.chars().filter(|&c| c == RIVER_CHAR).count(), land_rivers);
    }

    #[test]
    fn ansi_rows_are_reset() {
        let map = ansi_map(&result());
        assert_eq!(map.lines().count(), 50);
        assert!(map.lines().all(|l| l.ends_with("\x1b[0m")));
    }

    #[test]
    fn preview_image_scales_tiles() {
        let result = result();
        let img = preview_image(&result, 3);
        assert_eq!(img.dimensions(), (150, 150));
        let tile = result.tile(0, 0).unwrap();
        let [r, g, b] = tile_rgb(tile);
        assert_eq!(img.get_pixel(0, 0), &Rgba([r, g, b, 255]));
    }
}
