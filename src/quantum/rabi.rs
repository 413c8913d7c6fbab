//! Rabi flopping data: load, fit and plot.
//!
//! Data files hold `t; P; err` columns: pulse duration, excitation
//! probability and its uncertainty.

use std::path::Path;

use log::info;

use crate::domain::ProfileKind;
use crate::error::Error;
use crate::fit::{CurveFit, LmOptions, curve_fit};
use crate::io::{ColumnOptions, read_columns};
use crate::plot::{SeriesStyle, XyPlot, write_svg};

#[derive(Debug, Clone)]
pub struct RabiOptions {
    /// Column delimiter.
    pub delimiter: u8,
    /// Populations are stored as 0–100 rather than 0–1.
    pub percent: bool,
    /// Read the third (error) column.
    pub use_errorbars: bool,
    pub skip_rows: usize,
}

impl Default for RabiOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            percent: false,
            use_errorbars: true,
            skip_rows: 0,
        }
    }
}

/// A loaded Rabi flopping scan.
#[derive(Debug, Clone)]
pub struct RabiFlop {
    pub t: Vec<f64>,
    /// Excitation probability (0–1).
    pub p: Vec<f64>,
    /// Per-point uncertainty; zeros when errors were not loaded.
    pub err: Vec<f64>,
    pub has_errorbars: bool,
}

impl RabiFlop {
    pub fn load(path: &Path, opts: &RabiOptions) -> Result<Self, Error> {
        let columns = read_columns(
            path,
            &ColumnOptions {
                delimiter: Some(opts.delimiter),
                skip_rows: opts.skip_rows,
            },
        )?;
        let needed = if opts.use_errorbars { 3 } else { 2 };
        if columns.ncols() < needed {
            return Err(Error::parse(format!(
                "{}: expected at least {needed} columns, got {}.",
                path.display(),
                columns.ncols()
            )));
        }

        let mut cols = columns.into_columns();
        cols.truncate(needed);
        let err = if opts.use_errorbars { cols.pop() } else { None };
        let p = cols.pop().unwrap_or_default();
        let t = cols.pop().unwrap_or_default();

        let mut flop = Self::new(t, p, err)?;
        if opts.percent {
            flop.scale(0.01);
        }
        info!("Loaded {} Rabi points from {}", flop.t.len(), path.display());
        Ok(flop)
    }

    pub fn new(t: Vec<f64>, p: Vec<f64>, err: Option<Vec<f64>>) -> Result<Self, Error> {
        if t.len() != p.len() || err.as_ref().is_some_and(|e| e.len() != t.len()) {
            return Err(Error::invalid("Rabi columns must have equal lengths."));
        }
        let has_errorbars = err.is_some();
        let err = err.unwrap_or_else(|| vec![0.0; t.len()]);
        Ok(Self { t, p, err, has_errorbars })
    }

    fn scale(&mut self, factor: f64) {
        self.p.iter_mut().for_each(|v| *v *= factor);
        self.err.iter_mut().for_each(|v| *v *= factor);
    }

    /// Fit `A (½ − ½ sin(f t + π/2) e^{−t/τ})` starting from `[1, f0, tau]`.
    ///
    /// `f0` is the angular Rabi frequency guess; the fitted one is `params[1]`.
    pub fn fit(&self, f0: f64, tau: f64) -> Result<CurveFit, Error> {
        curve_fit(ProfileKind::Rabi, &self.t, &self.p, &[1.0, f0, tau], &LmOptions::default())
    }

    /// Plot the scan (with error bars if loaded) and an optional fit to SVG.
    pub fn plot(&self, fit: Option<&CurveFit>, path: &Path) -> Result<(), Error> {
        let plot = XyPlot {
            x_label: "Pulse duration [µs]",
            y_label: "Excitation probability",
            y_err: self.has_errorbars.then_some(self.err.as_slice()),
            style: SeriesStyle::Markers,
            fit,
            ..XyPlot::new(&self.t, &self.p)
        };
        write_svg(path, &plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::linspace;
    use crate::models::rabi;
    use approx::assert_relative_eq;

    fn write_scan(percent: bool) -> tempfile::NamedTempFile {
        let scale = if percent { 100.0 } else { 1.0 };
        let mut body = String::new();
        for t in linspace(0.0, 20.0, 81) {
            let p = rabi(t, 0.95, 0.8, 15.0) * scale;
            body.push_str(&format!("{t};{p};{}\n", 0.02 * scale));
        }
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), body).unwrap();
        file
    }

    #[test]
    fn loads_and_fits_scan() {
        let file = write_scan(false);
        let flop = RabiFlop::load(file.path(), &RabiOptions::default()).unwrap();
        assert_eq!(flop.t.len(), 81);
        assert!(flop.has_errorbars);
        assert_relative_eq!(flop.err[0], 0.02, epsilon = 1e-12);

        let fit = flop.fit(0.78, 12.0).unwrap();
        assert_relative_eq!(fit.params[0], 0.95, epsilon = 1e-6);
        assert_relative_eq!(fit.params[1], 0.8, epsilon = 1e-6);
        assert_relative_eq!(fit.params[2], 15.0, epsilon = 1e-4);
    }

    #[test]
    fn percent_scales_populations() {
        let file = write_scan(true);
        let opts = RabiOptions {
            percent: true,
            ..RabiOptions::default()
        };
        let flop = RabiFlop::load(file.path(), &opts).unwrap();
        assert!(flop.p.iter().all(|&p| (0.0..=1.0).contains(&p)));
        assert_relative_eq!(flop.err[3], 0.02, epsilon = 1e-12);
    }

    #[test]
    fn without_errorbars_two_columns_suffice() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "0;0\n1;0.5\n").unwrap();
        let opts = RabiOptions {
            use_errorbars: false,
            ..RabiOptions::default()
        };
        let flop = RabiFlop::load(file.path(), &opts).unwrap();
        assert!(!flop.has_errorbars);
        assert_eq!(flop.err, vec![0.0, 0.0]);
        assert!(RabiFlop::load(file.path(), &RabiOptions::default()).is_err());
    }
}
