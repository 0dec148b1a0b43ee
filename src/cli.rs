//! Command-line interface implementation

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::Config;
use crate::dice::DiceExpression;
use crate::output::{save_png, tile_output_path};
use crate::parser::parse_stream;
use crate::path::{self, AttributePath, PathValue};
use crate::raster::{TileRasterizer, TileStatus};
use crate::registry::BlueprintRegistry;
use crate::tilespec::{self, TileSpec};

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// tileforge - resolve blueprint inheritance and render recolored tiles
#[derive(Parser)]
#[command(name = "tfg")]
#[command(about = "Resolve blueprint definition streams and render recolored display tiles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render tiles for every renderable record to PNG
    Render {
        /// Input definition stream (JSONL / JSON5)
        input: PathBuf,

        /// Output directory (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only render this record
        #[arg(short, long)]
        blueprint: Option<String>,

        /// Also render alternate tile variants
        #[arg(long)]
        variants: bool,

        /// Write export-size (10x) rasters instead of native size
        #[arg(long)]
        large: bool,

        /// Sprite directory (overrides config)
        #[arg(long)]
        tiles_dir: Option<PathBuf>,

        /// Strict mode: degraded tiles fail the run
        #[arg(long)]
        strict: bool,
    },

    /// Query a resolved attribute path on one record
    Query {
        /// Input definition stream (JSONL / JSON5)
        input: PathBuf,

        /// Record name
        record: String,

        /// Attribute path, e.g. part_Render_Tile
        path: String,

        /// Query the record's local attributes instead of the resolved view
        #[arg(long)]
        local: bool,
    },

    /// Print a record's inheritance chain from the root down
    Lineage {
        /// Input definition stream (JSONL / JSON5)
        input: PathBuf,

        /// Record name
        record: String,
    },

    /// Analyze a dice string (minimum / average / maximum / sample)
    Roll {
        /// Dice string, e.g. "3d6+1"
        dice: String,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            blueprint,
            variants,
            large,
            tiles_dir,
            strict,
        } => run_render(
            &input,
            output.as_deref(),
            blueprint.as_deref(),
            variants,
            large,
            tiles_dir.as_deref(),
            strict,
        ),
        Commands::Query {
            input,
            record,
            path,
            local,
        } => run_query(&input, &record, &path, local),
        Commands::Lineage { input, record } => run_lineage(&input, &record),
        Commands::Roll { dice } => run_roll(&dice),
    }
}

/// Parse and load a definition stream, reporting warnings on stderr.
///
/// Returns the populated, resolved registry or the exit code to bail
/// with.
fn load_registry(input: &Path) -> Result<BlueprintRegistry, ExitCode> {
    let file = match File::open(input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: Cannot open input file '{}': {}", input.display(), e);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };

    let parse_result = parse_stream(file);
    for warning in &parse_result.warnings {
        eprintln!("Warning: line {}: {}", warning.line, warning.message);
    }

    match BlueprintRegistry::from_descriptors(&parse_result.records) {
        Ok(result) => {
            for warning in &result.warnings {
                eprintln!("Warning: {}", warning);
            }
            Ok(result.registry)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

/// Execute the render command
fn run_render(
    input: &Path,
    output: Option<&Path>,
    blueprint: Option<&str>,
    variants: bool,
    large: bool,
    tiles_dir: Option<&Path>,
    strict: bool,
) -> ExitCode {
    let registry = match load_registry(input) {
        Ok(registry) => registry,
        Err(code) => return code,
    };

    let config_dir = input.parent().unwrap_or(Path::new("."));
    let config = match Config::load_or_default(config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let tiles_dir = tiles_dir.unwrap_or(&config.tiles_dir);
    let output_dir = output.unwrap_or(&config.output_dir);

    if let Some(name) = blueprint {
        if registry.get(name).is_none() {
            eprintln!("Error: record '{}' not found", name);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    // derive specs in definition order; rasterization fans out below
    let mut jobs: Vec<(String, usize, TileSpec)> = Vec::new();
    for (_, record) in registry.iter() {
        if blueprint.is_some_and(|name| name != record.name) {
            continue;
        }
        let Some(bag) = record.resolved() else {
            continue;
        };
        let specs = if variants {
            tilespec::derive_all(&record.name, bag)
        } else {
            tilespec::derive(&record.name, bag).into_iter().collect()
        };
        for (variant, spec) in specs.into_iter().enumerate() {
            jobs.push((record.name.clone(), variant, spec));
        }
    }

    let rasterizer = TileRasterizer::new(tiles_dir);
    let tiles: Vec<_> = jobs
        .par_iter()
        .map(|(record, variant, spec)| (record.as_str(), *variant, rasterizer.rasterize(spec)))
        .collect();

    let mut rendered = 0usize;
    let mut degraded = 0usize;
    for (record, variant, tile) in &tiles {
        match tile.status {
            TileStatus::Ok => {}
            TileStatus::MissingSprite => {
                degraded += 1;
                eprintln!(
                    "Warning: {}: sprite '{}' not found, wrote placeholder",
                    record, tile.source_sprite
                );
            }
            TileStatus::UndecomposableColor => {
                degraded += 1;
                eprintln!(
                    "Warning: {}: sprite '{}' blends base and detail but no detail color is specified",
                    record, tile.source_sprite
                );
            }
        }

        let path = tile_output_path(output_dir, record, *variant);
        let result = if large {
            save_png(&tile.enlarged(), &path)
        } else {
            save_png(&tile.pixels, &path)
        };
        if let Err(e) = result {
            eprintln!("Error: Cannot write '{}': {}", path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
        rendered += 1;
    }

    println!(
        "Rendered {} tile(s) to {} ({} degraded)",
        rendered,
        output_dir.display(),
        degraded
    );

    if strict && degraded > 0 {
        return ExitCode::from(EXIT_ERROR);
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the query command
fn run_query(input: &Path, record: &str, path_text: &str, local: bool) -> ExitCode {
    let attribute_path = match AttributePath::parse(path_text) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let registry = match load_registry(input) {
        Ok(registry) => registry,
        Err(code) => return code,
    };

    let Some(found) = registry.get(record) else {
        eprintln!("Error: record '{}' not found", record);
        return ExitCode::from(EXIT_ERROR);
    };

    let bag = if local {
        Some(found.local())
    } else {
        found.resolved()
    };
    let value = bag.and_then(|bag| path::query(bag, &attribute_path));

    match value {
        None => println!("not present"),
        Some(PathValue::Field(value)) => println!("{}", value),
        Some(PathValue::Instance(fields)) => {
            if fields.is_empty() {
                println!("(present, no fields)");
            } else {
                let mut keys: Vec<_> = fields.keys().collect();
                keys.sort();
                for key in keys {
                    println!("{}={}", key, fields[key]);
                }
            }
        }
        Some(PathValue::Category(instances)) => {
            let mut names: Vec<_> = instances.keys().collect();
            names.sort();
            for name in names {
                println!("{}", name);
            }
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the lineage command
fn run_lineage(input: &Path, record: &str) -> ExitCode {
    let registry = match load_registry(input) {
        Ok(registry) => registry,
        Err(code) => return code,
    };

    let Some(id) = registry.id(record) else {
        eprintln!("Error: record '{}' not found", record);
        return ExitCode::from(EXIT_ERROR);
    };

    println!("{}", path::lineage(&registry, id).join(" > "));
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the roll command
fn run_roll(dice: &str) -> ExitCode {
    let expression = match DiceExpression::parse(dice) {
        Ok(expression) => expression,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    println!("minimum: {}", expression.minimum());
    println!("average: {}", expression.average());
    println!("maximum: {}", expression.maximum());
    println!("sample:  {}", expression.sample());
    ExitCode::from(EXIT_SUCCESS)
}
