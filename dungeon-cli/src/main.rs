use dungeon_core::{GenerationConfig, MapGenerator, TileGrid, TileKind};

use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::event;

#[derive(Parser, Debug)]
#[command(version, about = "Generates dungeon maps made of rooms and hallways", long_about = None)]
struct Args {
    #[command(flatten)]
    config: GenerationConfig,

    /// Redraw the map in the terminal after every carving step
    #[arg(long)]
    animate: bool,

    /// Write the final map to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t, value_enum)]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn glyphs() -> HashMap<TileKind, char> {
    HashMap::from([
        (TileKind::Invalid, ' '),
        (TileKind::Wall, '#'),
        (TileKind::Room, '.'),
        (TileKind::Hallway, ','),
        (TileKind::Door, '+'),
        (TileKind::Connector, '?'),
    ])
}

fn draw(out: &mut impl Write, grid: &TileGrid, glyphs: &HashMap<TileKind, char>) -> Result<()> {
    if grid.width() == 0 {
        return Ok(());
    }

    for row in grid.render(glyphs).chunks(grid.width() as usize) {
        writeln!(out, "{}", row.iter().collect::<String>())?;
    }

    Ok(())
}

// Clears the terminal and redraws the map being generated.
fn draw_frame(grid: &TileGrid, glyphs: &HashMap<TileKind, char>, progress: f32) -> Result<()> {
    let mut out = std::io::stdout().lock();

    write!(out, "\x1b[H\x1b[2J")?;
    draw(&mut out, grid, glyphs)?;
    writeln!(out, "{:>5.1}%", progress * 100.0)?;
    out.flush()?;

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(args.log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = args.config.validate() {
        event!(tracing::Level::WARN, "Questionable configuration: {:#}", e);
    }

    let glyphs = glyphs();

    let mut generator = MapGenerator::new();
    if args.animate {
        let frame_glyphs = glyphs.clone();
        generator = generator.with_observer(move |grid: &TileGrid, progress: f32| {
            if let Err(e) = draw_frame(grid, &frame_glyphs, progress) {
                event!(tracing::Level::WARN, "Failed to draw frame: {:#}", e);
            }
        });
    }

    let report = generator
        .generate(args.config)
        .context("map generation failed")?;

    event!(tracing::Level::INFO, "Generation report: {:?}", report);
    if !report.fully_connected {
        event!(
            tracing::Level::WARN,
            "{} regions could not be connected to the rest of the map",
            report.regions_remaining.saturating_sub(1)
        );
    }

    match args.output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            draw(&mut out, generator.grid(), &glyphs)?;
            out.flush()?;

            println!("Saved map to: {}", path.display());
        }
        None => {
            let mut out = BufWriter::new(std::io::stdout().lock());
            draw(&mut out, generator.grid(), &glyphs)?;
            out.flush()?;
        }
    }

    Ok(())
}
