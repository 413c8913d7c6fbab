//! Command-line parsing for `mvd`.
//!
//! Argument parsing stays here; command handlers live in `crate::app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ProfileKind;
use crate::error::Error;
use crate::quantum::Unit;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mvd", version, about = "Spectrometer data, peak fitting and lab physics helpers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the header metadata and a quick plot of an Ocean Optics spectrum.
    Info(InfoArgs),
    /// Fit a peak profile to a spectrum and print the parameters and FWHM.
    Fit(FitArgs),
    /// Plot a spectrum (terminal and/or SVG) or a saved fit JSON.
    Plot(PlotArgs),
    /// Average repeated scans `{prefix}{index}.{suffix}` into a CSV with errors.
    Combine(CombineArgs),
    /// Convert between wavenumber (cm-1), wavelength, frequency and energy.
    Convert(ConvertArgs),
    /// Refractive index, dispersion and focal length of a catalog glass.
    Glass(GlassArgs),
    /// Fit a Rabi flopping scan.
    Rabi(RabiArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct InfoArgs {
    /// Ocean Optics spectrum file.
    pub input: PathBuf,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Ocean Optics spectrum file.
    pub input: PathBuf,

    /// Profile to fit.
    #[arg(short = 'p', long, value_enum, default_value_t = ProfileKind::Gaussian)]
    pub profile: ProfileKind,

    /// Starting parameters, comma separated (e.g. `A,B,x0,width`).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub p0: Option<Vec<f64>>,

    /// Lower wavelength bound (nm) of the fit window.
    #[arg(long, requires = "xmax")]
    pub xmin: Option<f64>,

    /// Upper wavelength bound (nm) of the fit window.
    #[arg(long, requires = "xmin")]
    pub xmax: Option<f64>,

    /// Smallest width multiplier for the multi-start search.
    #[arg(long, default_value_t = 0.25)]
    pub min_scale: f64,

    /// Largest width multiplier for the multi-start search.
    #[arg(long, default_value_t = 4.0)]
    pub max_scale: f64,

    /// Number of width multipliers (1 disables the multi-start).
    #[arg(long, default_value_t = 9)]
    pub starts: usize,

    /// Levenberg-Marquardt iteration budget per start.
    #[arg(long, default_value_t = 1000)]
    pub max_iter: usize,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write an SVG of the spectrum with the fit overlaid.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Export the fit (parameters, errors, FWHM, fitted grid) to JSON.
    #[arg(long = "export-fit", value_name = "JSON")]
    pub export_fit: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    /// Ocean Optics spectrum file.
    #[arg(required_unless_present = "fit")]
    pub input: Option<PathBuf>,

    /// Fit JSON file produced by `mvd fit --export-fit`.
    #[arg(long, value_name = "JSON", conflicts_with = "input")]
    pub fit: Option<PathBuf>,

    /// Write an SVG instead of only printing to the terminal.
    #[arg(long, value_name = "SVG", requires = "input")]
    pub svg: Option<PathBuf>,

    /// Lower wavelength bound (nm) for the SVG.
    #[arg(long, requires = "xmax")]
    pub xmin: Option<f64>,

    /// Upper wavelength bound (nm) for the SVG.
    #[arg(long, requires = "xmin")]
    pub xmax: Option<f64>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct CombineArgs {
    /// Directory holding the data files.
    pub dir: PathBuf,

    /// File name prefix, e.g. `rabi_`.
    pub prefix: String,

    /// Indices to combine: numbers and inclusive ranges, e.g. `6-10 12`.
    #[arg(required = true, num_args = 1..)]
    pub indices: Vec<String>,

    /// Zero padding of the file index.
    #[arg(long, default_value_t = 4)]
    pub zpad: usize,

    /// Data file extension.
    #[arg(long, default_value = "dat")]
    pub suffix: String,

    /// Column delimiter (default: any whitespace).
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Skip this many leading lines of every file.
    #[arg(long, default_value_t = 0)]
    pub skip_rows: usize,

    /// Output directory.
    #[arg(short = 'o', long, default_value = ".")]
    pub out: PathBuf,

    /// Extra text for the README file.
    #[arg(long, default_value = "")]
    pub readme: String,

    /// Column labels for the CSV header, comma separated.
    #[arg(long, value_delimiter = ',', default_values = ["x", "y", "yerr"])]
    pub header: Vec<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct ConvertArgs {
    /// Value to convert.
    #[arg(allow_hyphen_values = true)]
    pub value: f64,

    /// Unit of the value: cm-1, nm, um, angstrom (or AA), m, Hz … THz, eV or J.
    pub from: Unit,

    /// Target unit.
    pub to: Unit,
}

#[derive(Debug, Parser, Clone)]
pub struct GlassArgs {
    /// Catalog glass: BK7, SF5, SF10, N-SF6HT, N-LAK22.
    pub name: String,

    /// Wavelength in nm.
    #[arg(short = 'w', long, default_value_t = 587.6)]
    pub wavelength: f64,

    /// First surface radius (mm) for a focal length.
    #[arg(long, allow_hyphen_values = true)]
    pub r1: Option<f64>,

    /// Second surface radius (mm); omit for a plano-convex lens.
    #[arg(long, requires = "r1", requires = "thickness", allow_hyphen_values = true)]
    pub r2: Option<f64>,

    /// Centre thickness (mm), required with `--r2`.
    #[arg(long, requires = "r2")]
    pub thickness: Option<f64>,
}

#[derive(Debug, Parser, Clone)]
pub struct RabiArgs {
    /// Data file with `t;P;err` columns.
    pub input: PathBuf,

    /// Initial (angular) Rabi frequency guess.
    #[arg(long)]
    pub f0: f64,

    /// Initial decoherence time guess.
    #[arg(long)]
    pub tau: f64,

    /// Column delimiter.
    #[arg(long, default_value_t = ';')]
    pub delimiter: char,

    /// Populations are stored as percentages (0-100).
    #[arg(long)]
    pub percent: bool,

    /// Ignore the error column.
    #[arg(long)]
    pub no_errorbars: bool,

    /// Skip this many leading lines.
    #[arg(long, default_value_t = 0)]
    pub skip_rows: usize,

    /// Write an SVG of the scan and fit.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}

/// Most file indices one `combine` call accepts.
pub const MAX_INDICES: usize = 100_000;

/// Expand index tokens such as `3`, `6-10` into a flat list.
pub fn parse_indices(tokens: &[String]) -> Result<Vec<u32>, Error> {
    let mut out = Vec::new();
    for token in tokens.iter().flat_map(|t| t.split(',')) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let parse = |s: &str| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| Error::invalid(format!("Invalid file index {s:?}.")))
        };
        match token.split_once('-') {
            Some((lo, hi)) => {
                let (lo, hi) = (parse(lo)?, parse(hi)?);
                if hi < lo {
                    return Err(Error::invalid(format!("Empty index range {token:?}.")));
                }
                let len = u64::from(hi - lo) + 1;
                if out.len() as u64 + len > MAX_INDICES as u64 {
                    return Err(Error::invalid(format!(
                        "Index range {token:?} exceeds {MAX_INDICES} files."
                    )));
                }
                out.extend(lo..=hi);
            }
            None => {
                if out.len() >= MAX_INDICES {
                    return Err(Error::invalid(format!("More than {MAX_INDICES} file indices given.")));
                }
                out.push(parse(token)?);
            }
        }
    }
    if out.is_empty() {
        return Err(Error::invalid("No file indices given."));
    }
    Ok(out)
}

/// ASCII delimiter as a byte.
pub fn delimiter_byte(c: char) -> Result<u8, Error> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| Error::invalid(format!("Delimiter must be a single ASCII character, got {c:?}.")))
}
