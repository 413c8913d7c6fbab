//! SVG figures via `plotters`.
//!
//! All series and bounds are computed before drawing; the draw routine only
//! renders what `XyPlot` describes.

use std::path::Path;

use log::info;
use plotters::prelude::*;

use crate::error::Error;
use crate::fit::CurveFit;
use crate::io::OceanOpticsSpectrum;
use crate::plot::{finite_range, pad_range, sample_fit};

/// Points used to draw a fitted curve.
const FIT_POINTS: usize = 500;

/// How to draw the measured series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStyle {
    /// Connected line (dense data such as spectra).
    Line,
    /// Circle markers, with error bars when given.
    Markers,
}

/// A render-only description of an x/y figure.
#[derive(Debug, Clone)]
pub struct XyPlot<'a> {
    pub title: Option<&'a str>,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub y_err: Option<&'a [f64]>,
    pub style: SeriesStyle,
    pub fit: Option<&'a CurveFit>,
    /// Restrict the x axis (and the drawn samples) to this window.
    pub xlims: Option<(f64, f64)>,
    pub size: (u32, u32),
}

impl<'a> XyPlot<'a> {
    pub fn new(x: &'a [f64], y: &'a [f64]) -> Self {
        Self {
            title: None,
            x_label: "x",
            y_label: "y",
            x,
            y,
            y_err: None,
            style: SeriesStyle::Line,
            fit: None,
            xlims: None,
            size: (800, 600),
        }
    }
}

/// Spectrum plot: `λ [nm]` vs `Response [arb. units]`, fit overlaid in red.
pub fn write_spectrum_svg(
    path: &Path,
    spectrum: &OceanOpticsSpectrum,
    fit: Option<&CurveFit>,
    xlims: Option<(f64, f64)>,
) -> Result<(), Error> {
    let plot = XyPlot {
        x_label: "λ [nm]",
        y_label: "Response [arb. units]",
        fit,
        xlims,
        ..XyPlot::new(&spectrum.wavelength, &spectrum.intensity)
    };
    write_svg(path, &plot)
}

/// Draw `plot` to an SVG file.
pub fn write_svg(path: &Path, plot: &XyPlot<'_>) -> Result<(), Error> {
    if plot.x.len() != plot.y.len() {
        return Err(Error::invalid("Plot x and y must have the same length."));
    }
    if let Some(err) = plot.y_err {
        if err.len() != plot.y.len() {
            return Err(Error::invalid("Plot error bars must match y in length."));
        }
    }

    let (x0, x1) = match plot.xlims {
        Some((lo, hi)) if lo.is_finite() && hi.is_finite() && hi > lo => (lo, hi),
        Some((lo, hi)) => return Err(Error::invalid(format!("Invalid x limits [{lo}, {hi}]."))),
        None => finite_range(plot.x.iter().copied())
            .ok_or_else(|| Error::invalid("Nothing to plot: need at least two distinct x values."))?,
    };

    let samples: Vec<(f64, f64, f64)> = (0..plot.x.len())
        .map(|i| (plot.x[i], plot.y[i], plot.y_err.map_or(0.0, |e| e[i])))
        .filter(|&(x, y, _)| x.is_finite() && y.is_finite() && x >= x0 && x <= x1)
        .collect();
    let curve = plot.fit.map(|f| sample_fit(f, x0, x1, FIT_POINTS));

    let ys = samples
        .iter()
        .flat_map(|&(_, y, e)| [y - e.abs(), y + e.abs()])
        .chain(curve.iter().flatten().map(|p| p.1));
    let (y0, y1) = finite_range(ys).unwrap_or((0.0, 1.0));
    let (y0, y1) = pad_range(y0, y1, 0.05);

    let root = SVGBackend::new(path, plot.size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(15).x_label_area_size(45).y_label_area_size(70);
    if let Some(title) = plot.title {
        builder.caption(title, ("sans-serif", 22));
    }
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1).map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(plot.x_label)
        .y_desc(plot.y_label)
        .x_labels(8)
        .y_labels(6)
        .label_style(("sans-serif", 14))
        .draw()
        .map_err(draw_err)?;

    let data_color = RGBColor(31, 119, 180);
    match plot.style {
        SeriesStyle::Line => {
            chart
                .draw_series(LineSeries::new(samples.iter().map(|&(x, y, _)| (x, y)), &data_color))
                .map_err(draw_err)?;
        }
        SeriesStyle::Markers => {
            if plot.y_err.is_some() {
                chart
                    .draw_series(
                        samples
                            .iter()
                            .map(|&(x, y, e)| PathElement::new(vec![(x, y - e), (x, y + e)], data_color)),
                    )
                    .map_err(draw_err)?;
            }
            chart
                .draw_series(samples.iter().map(|&(x, y, _)| Circle::new((x, y), 3, data_color.filled())))
                .map_err(draw_err)?;
        }
    }

    if let Some(curve) = curve {
        chart
            .draw_series(LineSeries::new(curve, RED.stroke_width(2)))
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn draw_err<E: std::fmt::Display>(e: E) -> Error {
    Error::io(format!("Failed to draw plot: {e}"))
}
