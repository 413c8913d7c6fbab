//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic output (used in golden tests).
//!
//! - samples: `o`
//! - fitted curve: `-` line

use crate::domain::FitFile;
use crate::fit::CurveFit;
use crate::plot::{finite_range, pad_range, sample_fit};

/// Render samples with an optional in-memory fit overlaid.
pub fn render_ascii_plot(x: &[f64], y: &[f64], fit: Option<&CurveFit>, width: usize, height: usize) -> String {
    let (x_min, x_max) = finite_range(x.iter().copied()).unwrap_or((0.0, 1.0));
    let curve = fit.map(|f| sample_fit(f, x_min, x_max, width.max(2)));
    let points: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    render_plot(&points, curve.as_deref(), x_min, x_max, width, height)
}

/// Render the fitted grid stored in a fit JSON file.
pub fn render_ascii_plot_from_fit_file(fit: &FitFile, width: usize, height: usize) -> String {
    let (x_min, x_max) = finite_range(fit.grid.x.iter().copied()).unwrap_or((0.0, 1.0));
    let curve: Vec<(f64, f64)> = fit
        .grid
        .x
        .iter()
        .zip(fit.grid.y.iter())
        .map(|(&x, &y)| (x, y))
        .collect();
    render_plot(&[], Some(&curve), x_min, x_max, width, height)
}

fn render_plot(
    points: &[(f64, f64)],
    curve: Option<&[(f64, f64)]>,
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let ys = points
        .iter()
        .map(|p| p.1)
        .chain(curve.into_iter().flatten().map(|p| p.1));
    let (y_min, y_max) = finite_range(ys).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so samples overlay it.
    if let Some(curve) = curve {
        draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);
    }

    for &(x, y) in points {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = format!("Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n");
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top (max y).
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);
    if curve.len() < 2 || width == 0 {
        return;
    }

    let mut prev = None;
    for &(x, y) in curve.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let (mut x0, mut y0) = (x0 as isize, y0 as isize);
    let (x1, y1) = (x1 as isize, y1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
        {
            if *cell == ' ' {
                *cell = ch;
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
