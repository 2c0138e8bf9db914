use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tilegrid::{geo, snapshot, Element, ElementKind, Grid, Window};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the header of a raster without reading its pixels
    Info {
        #[arg(value_name = "RASTER")]
        input: PathBuf,
    },

    /// Cut one window out of a raster and write it as a placed GeoTIFF
    Tile(TileArgs),

    /// Write a snapshot back out as a GeoTIFF at its original placement
    Restore {
        #[arg(value_name = "SNAPSHOT")]
        input: PathBuf,

        /// Output GeoTIFF
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct TileArgs {
    /// Source raster
    #[arg(value_name = "RASTER")]
    input: PathBuf,

    /// Output GeoTIFF
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Left edge of the window in cells
    #[arg(long, default_value_t = 0)]
    x_offset: usize,

    /// Top edge of the window in cells
    #[arg(long, default_value_t = 0)]
    y_offset: usize,

    /// Window width in cells (0: up to the right edge)
    #[arg(long, default_value_t = 0)]
    width: usize,

    /// Window height in cells (0: up to the bottom edge)
    #[arg(long, default_value_t = 0)]
    height: usize,

    /// Also write a native snapshot of the tile
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Count the cells that are not no-data
    #[arg(long)]
    count: bool,
}

/// Runs `$func::<T>(args...)` with `T` chosen by an [`ElementKind`].
macro_rules! with_kind {
    ($kind:expr, $func:ident($($arg:expr),*)) => {
        match $kind {
            ElementKind::U8 => $func::<u8>($($arg),*),
            ElementKind::U16 => $func::<u16>($($arg),*),
            ElementKind::I16 => $func::<i16>($($arg),*),
            ElementKind::U32 => $func::<u32>($($arg),*),
            ElementKind::I32 => $func::<i32>($($arg),*),
            ElementKind::F32 => $func::<f32>($($arg),*),
            ElementKind::F64 => $func::<f64>($($arg),*),
        }
    };
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let start_time = std::time::Instant::now();

    match &args.command {
        Command::Info { input } => print_info(input)?,
        Command::Tile(tile) => {
            let kind = tilegrid::peek_kind(&tile.input)
                .with_context(|| format!("Failed to inspect {:?}", tile.input))?;
            with_kind!(kind, cut_tile(tile))?;
        }
        Command::Restore { input, output } => {
            let kind = snapshot::peek_kind(input)
                .with_context(|| format!("Failed to read snapshot header {:?}", input))?;
            with_kind!(kind, restore_snapshot(input, output))?;
        }
    }

    info!("Total processing time: {:?}", start_time.elapsed());

    Ok(())
}

fn print_info(input: &Path) -> Result<()> {
    let header = tilegrid::read_header(input)
        .with_context(|| format!("Failed to read header of {:?}", input))?;

    println!("File:         {}", input.display());
    println!("Kind:         {}", header.kind);
    println!("Size:         {} x {}", header.width, header.height);
    match header.no_data {
        Some(no_data) => println!("No-data:      {}", no_data),
        None => println!("No-data:      (none)"),
    }
    println!("Geotransform: {:?}", header.geotransform);
    println!("Cell area:    {}", geo::cell_area(&header.geotransform));
    if header.projection.is_empty() {
        println!("Projection:   (none)");
    } else {
        println!("Projection:   {}", header.projection);
    }

    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    Ok(())
}

fn cut_tile<T: Element>(args: &TileArgs) -> Result<()> {
    let window = Window::new(args.x_offset, args.y_offset, args.width, args.height);
    info!("Processing {:?} window {}", args.input, window);

    let grid = Grid::<T>::from_raster(&args.input, window)
        .with_context(|| format!("Failed to load window {} of {:?}", window, args.input))?;

    info!(
        "Loaded {} tile: {} x {} at ({}, {}) of {} x {}",
        T::KIND,
        grid.view_width(),
        grid.view_height(),
        grid.view_xoff(),
        grid.view_yoff(),
        grid.total_width(),
        grid.total_height()
    );

    if args.count {
        info!(
            "Data cells: {} of {}",
            grid.num_data_cells(),
            grid.view_size()
        );
    }

    ensure_parent(&args.output)?;
    grid.save_raster(&args.output, grid.view_xoff(), grid.view_yoff())
        .with_context(|| format!("Failed to write {:?}", args.output))?;
    info!("Written GeoTIFF: {:?}", args.output);

    if let Some(path) = &args.snapshot {
        ensure_parent(path)?;
        grid.save_snapshot(path)
            .with_context(|| format!("Failed to write snapshot {:?}", path))?;
        info!("Written snapshot: {:?}", path);
    }

    Ok(())
}

fn restore_snapshot<T: Element>(input: &Path, output: &Path) -> Result<()> {
    let grid = Grid::<T>::from_snapshot(input)
        .with_context(|| format!("Failed to restore {:?}", input))?;

    ensure_parent(output)?;
    grid.save_raster(output, grid.view_xoff(), grid.view_yoff())
        .with_context(|| format!("Failed to write {:?}", output))?;
    info!("Written GeoTIFF: {:?}", output);

    Ok(())
}
