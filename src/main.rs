//! Tilegen CLI - seamless tiled terrain generator.
//!
//! Lays out a grid of terrain tiles, runs one or more regeneration passes
//! and exports each tile's color texture, heights and normals.

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::time::Instant;

use tilegen::export::{export_level, HeightFormat, LevelExportOptions, RawFormat};
use tilegen::level::{LevelConfig, LevelLayout};
use tilegen::noise::NoiseKind;
use tilegen::terrain::{grid_side, BorderPolicy};

/// Seamless tiled terrain generator.
#[derive(Parser)]
#[command(name = "tilegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a level and export every tile.
    Generate {
        /// JSON level configuration; flags below override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Start from the islands preset instead of the default level.
        #[arg(long)]
        islands: bool,

        /// Number of tiles along x.
        #[arg(long)]
        map_width: Option<usize>,

        /// Number of tiles along z.
        #[arg(long)]
        map_depth: Option<usize>,

        /// Vertices along one tile edge.
        #[arg(long)]
        tile_vertices: Option<usize>,

        /// Noise zoom (1-100 typical).
        #[arg(short, long)]
        resolution: Option<f32>,

        /// Height of the tallest possible vertex.
        #[arg(long)]
        max_height: Option<f32>,

        /// Border handling for normals.
        #[arg(long)]
        border: Option<BorderArg>,

        /// Flatness constant for normal reconstruction.
        #[arg(long)]
        flatness: Option<f32>,

        /// Noise primitive.
        #[arg(long)]
        noise: Option<NoiseArg>,

        /// Master seed for wave seed randomization and the simplex permutation.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of regeneration passes; only the last one is exported.
        #[arg(long, default_value = "1")]
        passes: u32,

        /// Keep the configured wave seeds for the first pass.
        #[arg(long)]
        keep_seeds: bool,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "tile")]
        name: String,

        /// Height export format.
        #[arg(short, long, default_value = "png")]
        format: ExportFormat,

        /// Also export normal maps.
        #[arg(long)]
        normal_map: bool,

        /// Write the effective configuration (with final seeds) as JSON.
        #[arg(long)]
        write_config: bool,
    },

    /// Display derived sizes for a level configuration.
    Info {
        /// JSON level configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit PNG (universal compatibility).
    Png,
    /// 16-bit RAW little-endian.
    Raw,
    /// 32-bit float RAW (high precision).
    RawFloat,
    /// Skip height export.
    None,
}

#[derive(Clone, Copy, ValueEnum)]
enum BorderArg {
    /// One-cell halo; normals match across tile edges.
    Bordered,
    /// No halo; edge normals point straight up.
    Clamped,
}

#[derive(Clone, Copy, ValueEnum)]
enum NoiseArg {
    Perlin,
    Simplex,
}

#[derive(Default)]
struct Overrides {
    islands: bool,
    map_width: Option<usize>,
    map_depth: Option<usize>,
    tile_vertices: Option<usize>,
    resolution: Option<f32>,
    max_height: Option<f32>,
    border: Option<BorderArg>,
    flatness: Option<f32>,
    noise: Option<NoiseArg>,
    /// Permutation seed for `--noise simplex`.
    noise_seed: u32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            islands,
            map_width,
            map_depth,
            tile_vertices,
            resolution,
            max_height,
            border,
            flatness,
            noise,
            seed,
            passes,
            keep_seeds,
            output,
            name,
            format,
            normal_map,
            write_config,
        } => {
            let seed = resolve_seed(seed);
            let overrides = Overrides {
                islands,
                map_width,
                map_depth,
                tile_vertices,
                resolution,
                max_height,
                border,
                flatness,
                noise,
                noise_seed: simplex_seed(seed),
            };
            let config = load_config(config.as_ref(), &overrides);
            run_generate(config, seed, passes, keep_seeds, output, name, format, normal_map, write_config);
        }
        Commands::Info { config } => {
            run_info(load_config(config.as_ref(), &Overrides::default()));
        }
    }
}

/// Uses the given master seed, or one taken from the clock.
fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    })
}

/// Folds the master seed into a simplex permutation seed.
fn simplex_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

fn load_config(path: Option<&PathBuf>, overrides: &Overrides) -> LevelConfig {
    let mut config = match path {
        Some(path) => match LevelConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None if overrides.islands => LevelConfig::islands(),
        None => LevelConfig::default(),
    };

    if let Some(v) = overrides.map_width {
        config.map_width = v;
    }
    if let Some(v) = overrides.map_depth {
        config.map_depth = v;
    }
    if let Some(v) = overrides.tile_vertices {
        config.tile_vertices = v;
    }
    if let Some(v) = overrides.resolution {
        config.resolution = v;
    }
    if let Some(v) = overrides.max_height {
        config.max_height = v;
    }
    if let Some(border) = overrides.border {
        config.border_policy = match border {
            BorderArg::Bordered => BorderPolicy::Bordered,
            BorderArg::Clamped => BorderPolicy::Clamped,
        };
    }
    if overrides.flatness.is_some() {
        config.flatness = overrides.flatness;
    }
    if let Some(noise) = overrides.noise {
        config.noise = match noise {
            NoiseArg::Perlin => NoiseKind::Perlin,
            NoiseArg::Simplex => NoiseKind::Simplex {
                seed: overrides.noise_seed,
            },
        };
    }

    config
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    config: LevelConfig,
    seed: u64,
    passes: u32,
    keep_seeds: bool,
    output: PathBuf,
    name: String,
    format: ExportFormat,
    normal_map: bool,
    write_config: bool,
) {
    if passes == 0 {
        log::error!("At least one pass is required");
        std::process::exit(1);
    }

    println!("Tilegen - Seamless Terrain Tiles");
    println!("================================");
    println!("Tiles: {}x{}", config.map_width, config.map_depth);
    println!("Vertices per tile: {}x{}", config.tile_vertices, config.tile_vertices);
    println!("Seed: {}", seed);
    println!("Output: {}", output.display());

    let mut layout = match LevelLayout::new(config) {
        Ok(layout) => layout,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let start = Instant::now();

    for pass in 0..passes {
        let result = if pass == 0 && keep_seeds {
            layout.generate()
        } else {
            layout.regenerate(&mut rng)
        };
        if let Err(e) = result {
            log::error!("Generation failed: {}", e);
            std::process::exit(1);
        }
    }

    println!("Generated {} pass(es) in {:.2?}", passes, start.elapsed());

    let heights = match format {
        ExportFormat::Png => Some(HeightFormat::Png),
        ExportFormat::Raw => Some(HeightFormat::Raw(RawFormat::R16LittleEndian)),
        ExportFormat::RawFloat => Some(HeightFormat::Raw(RawFormat::R32Float)),
        ExportFormat::None => None,
    };
    let options = LevelExportOptions {
        heights,
        normals: normal_map,
        ..Default::default()
    };

    match export_level(&layout, &output, &name, &options) {
        Ok(count) => println!("  Exported {} files: {}_*", count, name),
        Err(e) => {
            log::error!("Export failed: {}", e);
            std::process::exit(1);
        }
    }

    if write_config {
        let mut effective = layout.config().clone();
        effective.waves = layout.waves().clone();
        let path = output.join(format!("{}_level.json", name));
        if let Err(e) = effective.save_json_file(&path) {
            log::error!("Failed to write {}: {}", path.display(), e);
            std::process::exit(1);
        }
        println!("  Wrote configuration: {}", path.display());
    }
}

fn run_info(config: LevelConfig) {
    let settings = match config.settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let vertex_count = config.vertex_count();
    let side = grid_side(vertex_count).unwrap_or(config.tile_vertices);
    let sampled = side + 2 * settings.border_policy.halo();

    println!("Level Configuration");
    println!("===================");
    println!("Tiles: {}x{} ({} total)", config.map_width, config.map_depth, config.map_width * config.map_depth);
    println!("Tile size: {} world units", config.tile_size);
    println!("Vertices per tile: {} ({}x{})", vertex_count, side, side);
    println!("Vertex spacing: {}", config.vertex_spacing());
    println!("Noise samples per tile: {}x{} ({} borders)", sampled, sampled, settings.border_policy.name());
    println!("Noise: {}, resolution {}", config.noise.name(), settings.scale);
    println!("Waves: {} (total amplitude {})", config.waves.len(), config.waves.total_amplitude());
    println!("Terrain types: {}", settings.palette.types().len());
    println!("Normal flatness: {}", settings.flatness);
    println!("Max height: {}", settings.max_height);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplex_seed_follows_master_seed() {
        let overrides = |seed: u64| Overrides {
            noise: Some(NoiseArg::Simplex),
            noise_seed: simplex_seed(seed),
            ..Default::default()
        };

        let a = load_config(None, &overrides(42));
        let b = load_config(None, &overrides(43));
        assert_eq!(a.noise, NoiseKind::Simplex { seed: simplex_seed(42) });
        assert_ne!(a.noise, b.noise);
        assert_eq!(load_config(None, &overrides(42)).noise, a.noise);
    }

    #[test]
    fn test_simplex_seed_uses_high_bits() {
        assert_ne!(simplex_seed(1), simplex_seed(1 | (1 << 32)));
    }

    #[test]
    fn test_config_noise_kept_without_flag() {
        let overrides = Overrides {
            noise_seed: 99,
            ..Default::default()
        };
        assert_eq!(load_config(None, &overrides).noise, NoiseKind::Perlin);
    }
}
