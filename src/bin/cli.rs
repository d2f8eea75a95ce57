use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use terrain_gen::biome::Biome;
use terrain_gen::render;
use terrain_gen::{BiomeTable, ConfigurationError, GenerationParams, TerrainGenerator};

/// Детерминированный генератор карт: высоты, влажность, реки и биомы
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML-файл с параметрами; флаги ниже переопределяют его значения
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ширина карты в тайлах (минимум 50)
    #[arg(long)]
    width: Option<u32>,

    /// Высота карты в тайлах (минимум 50)
    #[arg(long)]
    height: Option<u32>,

    /// Сид (по умолчанию случайный)
    #[arg(long)]
    seed: Option<u64>,

    /// Режим: continent, archipelago, highlands, none
    #[arg(long)]
    mode: Option<String>,

    #[arg(long)]
    octaves: Option<u32>,

    #[arg(long)]
    persistence: Option<f32>,

    #[arg(long)]
    lacunarity: Option<f32>,

    #[arg(long)]
    scale: Option<f32>,

    /// Количество рек
    #[arg(long)]
    rivers: Option<u32>,

    /// Откуда дует ветер: west, east, north, south
    #[arg(long)]
    wind: Option<String>,

    /// TOML-файл с собственной таблицей биомов
    #[arg(long)]
    biomes: Option<PathBuf>,

    /// Путь для сохранения JSON (по умолчанию: ./terrain.json)
    #[arg(short, long, default_value = "terrain.json")]
    output: PathBuf,

    /// Вывести ASCII-карту (один символ на тайл)
    #[arg(long)]
    ascii: bool,

    /// Вывести цветную карту (ANSI)
    #[arg(long)]
    ansi: bool,

    /// Сохранить PNG-превью биомов
    #[arg(long)]
    png: Option<PathBuf>,

    /// Сохранить карту высот в оттенках серого
    #[arg(long)]
    heightmap: Option<PathBuf>,

    /// Подробный лог (повторить для trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn params(&self) -> Result<GenerationParams, ConfigurationError> {
        let mut params = match &self.config {
            Some(path) => GenerationParams::from_toml_file(path)?,
            None => GenerationParams::default(),
        };
        if let Some(width) = self.width {
            params.width = width;
        }
        if let Some(height) = self.height {
            params.height = height;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some(mode) = &self.mode {
            params.mode = mode.parse()?;
        }
        if let Some(octaves) = self.octaves {
            params.octaves = octaves;
        }
        if let Some(persistence) = self.persistence {
            params.persistence = persistence;
        }
        if let Some(lacunarity) = self.lacunarity {
            params.lacunarity = lacunarity;
        }
        if let Some(scale) = self.scale {
            params.scale = scale;
        }
        if let Some(rivers) = self.rivers {
            params.river_count = rivers;
        }
        if let Some(wind) = &self.wind {
            params.prevailing_wind = wind.parse()?;
        }
        Ok(params)
    }

    fn generator(&self) -> Result<TerrainGenerator, ConfigurationError> {
        let generator = TerrainGenerator::new(self.params()?)?;
        Ok(match &self.biomes {
            Some(path) => generator.with_biome_table(BiomeTable::from_toml_file(path)?),
            None => generator,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    let generator = match cli.generator() {
        Ok(generator) => generator,
        Err(err) => {
            eprintln!("Ошибка конфигурации: {err}");
            return ExitCode::from(2);
        }
    };

    match run(&cli, &generator) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Ошибка: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, generator: &TerrainGenerator) -> Result<(), Box<dyn std::error::Error>> {
    let params = generator.params();
    println!(
        "Генерация карты (размер: {}×{}, сид: {}, режим: {})...",
        params.width, params.height, params.seed, params.mode
    );
    log::debug!("Таблица биомов: {} правил", generator.biome_table().rules().len());
    let result = generator.generate();

    println!("Сохранение в {:?}", cli.output);
    fs::write(&cli.output, serde_json::to_string_pretty(&result)?)?;

    if let Some(path) = &cli.png {
        println!("Сохранение превью в {path:?}");
        render::save_preview_png(&result, &path.to_string_lossy(), 4)?;
    }
    if let Some(path) = &cli.heightmap {
        println!("Сохранение карты высот в {path:?}");
        generator.heightmap().save_as_png(&path.to_string_lossy())?;
    }

    if cli.ascii {
        println!("{}", render::ascii_map(&result));
    }
    if cli.ansi {
        println!("{}", render::ansi_map(&result));
    }

    let counts = result.biome_counts();
    println!("\nБиомы:");
    for biome in Biome::ALL {
        let count = counts.get(&biome).copied().unwrap_or(0);
        if count > 0 {
            println!("  {:<18} {count}", biome.label());
        }
    }
    println!(
        "Реки: {}, средняя высота: {:.3}",
        result.rivers.len(),
        result.get_average_elevation()
    );
    println!("\nГотово! Карта сохранена.");
    Ok(())
}
