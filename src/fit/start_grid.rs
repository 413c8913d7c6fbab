//! Starting-point grids for multi-start fitting.
//!
//! Peak fits are sensitive to the starting width: too narrow and the
//! Jacobian vanishes away from the centre, too wide and the offset soaks up
//! the amplitude. Rather than trusting one guess we fan out over a
//! deterministic, log-spaced set of width multipliers around it.

use crate::domain::ProfileKind;
use crate::error::Error;
use crate::math::log_space;

/// Width multipliers `[min, max]` and count.
#[derive(Debug, Clone)]
pub struct StartGrid {
    pub min_scale: f64,
    pub max_scale: f64,
    pub steps: usize,
}

impl Default for StartGrid {
    fn default() -> Self {
        Self {
            min_scale: 0.25,
            max_scale: 4.0,
            steps: 9,
        }
    }
}

/// Expand one base guess into a list of starting parameter vectors.
///
/// Only the width parameter (`p[3]`) of peak profiles is varied. Other kinds
/// return the base guess unchanged. The base guess itself is always first.
pub fn start_points(kind: ProfileKind, base: &[f64], grid: &StartGrid) -> Result<Vec<Vec<f64>>, Error> {
    if !kind.is_peak() || grid.steps < 2 {
        return Ok(vec![base.to_vec()]);
    }

    let scales = log_space(grid.min_scale, grid.max_scale, grid.steps)?;
    let mut out = Vec::with_capacity(scales.len() + 1);
    out.push(base.to_vec());
    for s in scales {
        if (s - 1.0).abs() < 1e-12 {
            continue;
        }
        let mut p = base.to_vec();
        p[3] *= s;
        out.push(p);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_guess_first_and_unit_scale_not_duplicated() {
        let base = [1.0, 0.0, 5.0, 2.0];
        let pts = start_points(ProfileKind::Gaussian, &base, &StartGrid::default()).unwrap();
        assert_eq!(pts[0], base.to_vec());
        // 9 log-spaced scales from 1/4 to 4 include 1.0 exactly once.
        assert_eq!(pts.len(), 9);
        assert!((pts[1][3] - 0.5).abs() < 1e-12);
        assert!((pts[pts.len() - 1][3] - 8.0).abs() < 1e-12);
    }

    #[test]
    fn non_peak_kinds_use_single_start() {
        let base = [1.0, 0.0, 2.0, 0.1];
        let pts = start_points(ProfileKind::Sine, &base, &StartGrid::default()).unwrap();
        assert_eq!(pts, vec![base.to_vec()]);
    }
}
