use crate::config::{Config, load_config};
use crate::layout_dump::write_layout_dump;
use crate::plot::compute_scatter;
use crate::render::{render_svg, write_output_svg};
use crate::stats::{CsvSource, RawTable, source_for_path};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "statscatter",
    version,
    about = "Scatter two player metrics against league averages with non-overlapping labels"
)]
pub struct Args {
    /// Player stats file (.csv, or .json) or '-' for CSV on stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Metric on the horizontal axis
    #[arg(short = 'x', long = "x-stat")]
    pub x_stat: Option<String>,

    /// Metric on the vertical axis
    #[arg(short = 'y', long = "y-stat")]
    pub y_stat: Option<String>,

    /// Season to plot
    #[arg(short = 's', long = "season")]
    pub season: Option<u32>,

    /// Minimum plate appearances for a player to be plotted
    #[arg(long = "min-pa")]
    pub min_pa: Option<f64>,

    /// How many players to label at each extreme of each metric
    #[arg(short = 'n', long = "extremes")]
    pub extremes: Option<usize>,

    /// Seed for breaking ties between coincident labels
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Write the final label layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let raw = read_input(&args.input, &config)?;
    let figure = compute_scatter(&raw, &config)
        .with_context(|| format!("plotting {}", args.input.display()))?;
    let svg = render_svg(&figure, &config.theme);

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &figure)
            .with_context(|| format!("writing layout dump {}", path.display()))?;
        info!(path = %path.display(), "wrote layout dump");
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn apply_overrides(config: &mut Config, args: &Args) {
    let selection = &mut config.selection;
    if let Some(x) = &args.x_stat {
        selection.metric_x = x.clone();
    }
    if let Some(y) = &args.y_stat {
        selection.metric_y = y.clone();
    }
    if let Some(season) = args.season {
        selection.season = Some(season);
    }
    if let Some(min_pa) = args.min_pa {
        selection.min_weight = min_pa;
    }
    if let Some(n) = args.extremes {
        selection.extremes = n;
    }
    if let Some(seed) = args.seed {
        config.labels.seed = seed;
    }
}

fn read_input(path: &Path, config: &Config) -> Result<RawTable> {
    let columns = config.selection.source_columns();
    let season = config.selection.season;
    if path == Path::new("-") {
        let stdin = io::stdin();
        return Ok(CsvSource::parse(stdin.lock(), &columns, season, "stdin")?);
    }
    let source = source_for_path(path, columns);
    info!(source = %source.describe(), season = ?season, "fetching records");
    Ok(source.fetch(season)?)
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_values() {
        let args = Args::parse_from([
            "statscatter",
            "-i",
            "batting.csv",
            "-x",
            "K%",
            "-y",
            "BB%",
            "-s",
            "2023",
            "--min-pa",
            "300",
            "-n",
            "5",
            "--seed",
            "9",
            "-vv",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.selection.metric_x, "K%");
        assert_eq!(config.selection.metric_y, "BB%");
        assert_eq!(config.selection.season, Some(2023));
        assert_eq!(config.selection.min_weight, 300.0);
        assert_eq!(config.selection.extremes, 5);
        assert_eq!(config.labels.seed, 9);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let args = Args::parse_from(["statscatter", "-i", "batting.json"]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.selection.metric_x, "Zone%");
        assert_eq!(config.selection.season, Some(2025));
        assert!(matches!(args.output_format, OutputFormat::Svg));
    }

    #[test]
    fn png_needs_an_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        let path = PathBuf::from("out.png");
        assert_eq!(ensure_output(&Some(path.clone()), "png").expect("path"), path);
    }
}
