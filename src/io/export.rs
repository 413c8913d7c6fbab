//! Read/write fit result JSON files.
//!
//! A fit JSON is the portable representation of a fitted profile: the
//! parameters with their 1σ errors, FWHM for peak profiles, fit diagnostics
//! and a precomputed grid for quick plotting. The schema is `domain::FitFile`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::info;

use crate::domain::{FitFile, FitGrid, FitQuality};
use crate::error::Error;
use crate::fit::{CurveFit, fwhm};
use crate::math::linspace;

/// Points in the exported fitted grid.
pub const GRID_POINTS: usize = 201;

/// Assemble a `FitFile` for a fit over `[x_min, x_max]`.
pub fn fit_file(fit: &CurveFit, x_min: f64, x_max: f64, source: Option<&Path>) -> FitFile {
    FitFile {
        tool: "mvd".to_string(),
        source: source.map(Path::to_path_buf),
        profile: fit.kind,
        param_names: fit.kind.param_names().iter().map(|s| s.to_string()).collect(),
        params: fit.params.clone(),
        param_errors: fit.param_errors(),
        fwhm: if fit.kind.is_peak() { fwhm(fit.kind, &fit.params).ok() } else { None },
        quality: FitQuality {
            sse: fit.sse,
            rmse: fit.rmse,
            n: fit.n,
            iterations: fit.iterations,
        },
        grid: build_grid(fit, x_min, x_max, GRID_POINTS),
    }
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, fit: &FitFile) -> Result<(), Error> {
    let file = File::create(path)
        .map_err(|e| Error::io(format!("Failed to create fit JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), fit)
        .map_err(|e| Error::io(format!("Failed to write fit JSON: {e}")))?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, Error> {
    let file = File::open(path)
        .map_err(|e| Error::io(format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    let fit: FitFile = serde_json::from_reader(file).map_err(|e| Error::parse(format!("Invalid fit JSON: {e}")))?;
    if fit.params.len() != fit.profile.param_len() {
        return Err(Error::parse(format!(
            "Fit JSON has {} parameters; {} expects {}.",
            fit.params.len(),
            fit.profile.display_name(),
            fit.profile.param_len()
        )));
    }
    Ok(fit)
}

fn build_grid(fit: &CurveFit, x_min: f64, x_max: f64, n: usize) -> FitGrid {
    let (mut x0, mut x1) = (x_min, x_max);
    if !(x0.is_finite() && x1.is_finite()) || x1 < x0 {
        x0 = 0.0;
        x1 = 1.0;
    }
    if (x1 - x0).abs() < 1e-12 {
        x0 -= 0.5;
        x1 += 0.5;
    }
    let x = linspace(x0, x1, n.max(2));
    let y = x.iter().map(|&t| fit.predict(t)).collect();
    FitGrid { x, y }
}
