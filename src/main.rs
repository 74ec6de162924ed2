//! Command-line front end: load a profile CSV, segment it and print the tables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use savgol_segment::{
    read_signal, segment, write_boundaries, write_smoothed, EdgeMode, SegmentationConfig, Variant,
    DEFAULT_INTENSITY_COLUMN, DEFAULT_POSITION_COLUMN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    /// Open capture: consecutive peaks, plus the partial pattern before the first peak
    #[value(name = "peak-to-peak")]
    PeakToPeak,
    /// Full rotation: troughs between peaks, last pattern wraps to the first peak
    #[value(name = "trough-to-trough")]
    TroughToTrough,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::PeakToPeak => Variant::PeakToPeak,
            VariantArg::TroughToTrough => Variant::TroughToTrough,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EdgeArg {
    /// Polynomial fit of the window shifted inside the signal
    Interp,
    /// Reflect about the edge sample
    Mirror,
    /// Repeat the edge sample
    Nearest,
    /// Treat the signal as circular
    Wrap,
}

impl From<EdgeArg> for EdgeMode {
    fn from(arg: EdgeArg) -> Self {
        match arg {
            EdgeArg::Interp => EdgeMode::Interp,
            EdgeArg::Mirror => EdgeMode::Mirror,
            EdgeArg::Nearest => EdgeMode::Nearest,
            EdgeArg::Wrap => EdgeMode::Wrap,
        }
    }
}

/// Segment a rotational intensity profile into repeating patterns
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file with a position column and an intensity column
    input: PathBuf,

    /// Header of the position (degree) column
    #[arg(long, default_value = DEFAULT_POSITION_COLUMN)]
    position_column: String,

    /// Header of the intensity column
    #[arg(long, default_value = DEFAULT_INTENSITY_COLUMN)]
    intensity_column: String,

    /// Boundary variant; also picks the default parameters
    #[arg(long, value_enum, default_value_t = VariantArg::TroughToTrough)]
    variant: VariantArg,

    /// Smoothing window length (odd, at least 3)
    #[arg(short, long)]
    window: Option<usize>,

    /// Degree of the smoothing polynomial
    #[arg(short, long)]
    poly_order: Option<usize>,

    /// Minimum distance between peaks, in samples
    #[arg(short = 'd', long)]
    min_distance: Option<usize>,

    /// Minimum peak prominence; 0 disables the filter
    #[arg(long)]
    min_prominence: Option<f64>,

    /// Edge handling for the smoother
    #[arg(long, value_enum, default_value_t = EdgeArg::Interp)]
    edge_mode: EdgeArg,

    /// Write position, raw and smoothed intensity to this CSV
    #[arg(long)]
    smoothed_out: Option<PathBuf>,

    /// Write the boundary table to this CSV
    #[arg(long)]
    boundaries_out: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> SegmentationConfig {
        let preset = SegmentationConfig::preset(self.variant.into());
        SegmentationConfig {
            window_length: self.window.unwrap_or(preset.window_length),
            poly_order: self.poly_order.unwrap_or(preset.poly_order),
            min_distance: self.min_distance.unwrap_or(preset.min_distance),
            min_prominence: self.min_prominence.unwrap_or(preset.min_prominence),
            edge_mode: self.edge_mode.into(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.config();
    let variant: Variant = args.variant.into();

    info!("Loading {:?}", args.input);
    let signal = read_signal(&args.input, &args.position_column, &args.intensity_column)
        .with_context(|| format!("Failed to load signal from {:?}", args.input))?;

    info!(
        "window={} poly_order={} min_distance={} min_prominence={} variant={}",
        config.window_length, config.poly_order, config.min_distance, config.min_prominence, variant
    );
    let result = segment(&signal, &config, variant).context("Segmentation failed")?;

    println!("Peaks detected:");
    println!(
        "{:>4} {:>8} {:>14} {:>16} {:>12}",
        "#", "Index", "Peak Degree", "Peak Value", "Prominence"
    );
    for (i, row) in result.peak_table(&signal)?.iter().enumerate() {
        println!(
            "{:>4} {:>8} {:>14.3} {:>16.3} {:>12.3}",
            i + 1,
            row.index,
            row.position,
            row.value,
            row.prominence
        );
    }

    if !result.troughs.is_empty() {
        let troughs = result.trough_positions(&signal)?;
        let listed: Vec<String> = troughs.iter().map(|d| format!("{d:.3}")).collect();
        println!("\nTrough degrees: {}", listed.join(", "));
    }

    let rows = result.boundary_table(&signal)?;
    println!("\nPattern boundaries ({variant}):");
    println!(
        "{:>4} {:>24} {:>22} {:>8}",
        "#", "Pattern Start (Degree)", "Pattern End (Degree)", "Wrapped"
    );
    for row in &rows {
        println!(
            "{:>4} {:>24.3} {:>22.3} {:>8}",
            row.pattern,
            row.start_position,
            row.end_position,
            if row.wrapped { "yes" } else { "" }
        );
    }

    if let Some(path) = &args.smoothed_out {
        write_smoothed(
            path,
            &signal,
            &result.smoothed,
            &args.position_column,
            &args.intensity_column,
        )
        .with_context(|| format!("Failed to write smoothed signal to {path:?}"))?;
        info!("Smoothed signal written to {:?}", path);
    }
    if let Some(path) = &args.boundaries_out {
        write_boundaries(path, &rows)
            .with_context(|| format!("Failed to write boundaries to {path:?}"))?;
        info!("Boundaries written to {:?}", path);
    }

    Ok(())
}
