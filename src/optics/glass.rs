//! Optical glass dispersion from Sellmeier coefficients.
//!
//! `n²(λ) = 1 + Σ Bᵢ λ² / (λ² − Cᵢ)` with `λ` in µm and `Cᵢ` in µm². The
//! public API takes wavelengths in metres.
//!
//! References: <https://refractiveindex.info/>,
//! <https://en.wikipedia.org/wiki/Sellmeier_equation>.

use std::borrow::Cow;

use crate::error::Error;

const M_TO_MICRON: f64 = 1e6;

/// Step for the central-difference derivative (metres).
const DISPERSION_STEP: f64 = 1e-10;

/// A glass described by three-term Sellmeier coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct Glass {
    name: Cow<'static, str>,
    /// Unitless.
    b: [f64; 3],
    /// µm².
    c: [f64; 3],
}

/// Lens geometry for [`Glass::focal_length`]. Radii and thickness in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lens {
    /// Plano-convex (or plano-concave) lens with one curved surface.
    PlanoConvex { r1: f64 },
    /// Thick lens; `r2 = f64::INFINITY` is a flat second surface.
    Thick { r1: f64, r2: f64, thickness: f64 },
}

// Coefficients from refractiveindex.info (Schott catalog).
pub const BK7: Glass = Glass::catalog(
    "BK7",
    [1.039_612_12, 0.231_792_344, 1.010_469_45],
    [6.000_698_67e-3, 2.001_791_44e-2, 1.035_606_53e2],
);
pub const SF5: Glass = Glass::catalog(
    "SF5",
    [1.461_418_85, 0.247_713_019, 0.949_995_832],
    [0.011_182_612_6, 0.050_859_466_9, 112.041_888],
);
pub const SF10: Glass = Glass::catalog(
    "SF10",
    [1.616_259_77, 0.259_229_334, 1.077_623_17],
    [0.012_753_455_9, 0.058_198_395_4, 116.607_68],
);
pub const N_SF6HT: Glass = Glass::catalog(
    "N-SF6HT",
    [1.779_317_63, 0.338_149_866, 2.087_344_74],
    [0.013_371_418_2, 0.061_753_362_1, 174.017_59],
);
pub const N_LAK22: Glass = Glass::catalog(
    "N-LAK22",
    [1.142_297_81, 0.535_138_441, 1.040_883_85],
    [0.005_857_785_94, 0.019_854_614_7, 100.834_017],
);

pub const CATALOG: [&Glass; 5] = [&BK7, &SF5, &SF10, &N_SF6HT, &N_LAK22];

impl Glass {
    pub fn new(name: impl Into<Cow<'static, str>>, b: [f64; 3], c: [f64; 3]) -> Result<Self, Error> {
        if b.iter().chain(c.iter()).any(|v| !v.is_finite()) {
            return Err(Error::invalid("Sellmeier coefficients must be finite."));
        }
        Ok(Self {
            name: name.into(),
            b,
            c,
        })
    }

    const fn catalog(name: &'static str, b: [f64; 3], c: [f64; 3]) -> Self {
        Self {
            name: Cow::Borrowed(name),
            b,
            c,
        }
    }

    /// Look up a catalog glass, ignoring case and `-`/`_` differences.
    pub fn by_name(name: &str) -> Option<Glass> {
        let key = catalog_key(name);
        CATALOG
            .iter()
            .find(|g| catalog_key(&g.name) == key)
            .map(|g| (*g).clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn b(&self) -> [f64; 3] {
        self.b
    }

    pub fn c(&self) -> [f64; 3] {
        self.c
    }

    /// Index of refraction at wavelength `lambda` (metres).
    pub fn refractive_index(&self, lambda: f64) -> Result<f64, Error> {
        if !(lambda.is_finite() && lambda > 0.0) {
            return Err(Error::invalid(format!("Wavelength must be positive, got {lambda} m.")));
        }
        let wl_sq = (lambda * M_TO_MICRON).powi(2);
        let n_sq = 1.0
            + self
                .b
                .iter()
                .zip(self.c.iter())
                .map(|(b, c)| b * wl_sq / (wl_sq - c))
                .sum::<f64>();
        if !(n_sq.is_finite() && n_sq > 0.0) {
            return Err(Error::invalid(format!(
                "{} has no real index at {lambda} m (near a Sellmeier pole).",
                self.name
            )));
        }
        Ok(n_sq.sqrt())
    }

    /// Chromatic dispersion `dn/dλ` at `lambda` (1/m), by central difference.
    pub fn chromatic_dispersion(&self, lambda: f64) -> Result<f64, Error> {
        let hi = self.refractive_index(lambda + DISPERSION_STEP)?;
        let lo = self.refractive_index(lambda - DISPERSION_STEP)?;
        Ok((hi - lo) / (2.0 * DISPERSION_STEP))
    }

    /// Focal length (metres) of `lens` made of this glass at `lambda`.
    ///
    /// Thick lens: `1/f = A·(1/R1 − 1/R2 + A d / (n R1 R2))` with `A = n − 1`
    /// (Thorlabs lens tutorial).
    pub fn focal_length(&self, lambda: f64, lens: Lens) -> Result<f64, Error> {
        let n = self.refractive_index(lambda)?;
        let a = n - 1.0;
        let power = match lens {
            Lens::PlanoConvex { r1 } => {
                check_radius(r1)?;
                a / r1
            }
            Lens::Thick { r1, r2, thickness } => {
                check_radius(r1)?;
                if r2 == 0.0 || r2.is_nan() {
                    return Err(Error::invalid("Lens radius R2 must be non-zero."));
                }
                if !(thickness.is_finite() && thickness >= 0.0) {
                    return Err(Error::invalid(format!("Lens thickness must be non-negative, got {thickness}.")));
                }
                a * (1.0 / r1 - 1.0 / r2 + a * thickness / (n * r1 * r2))
            }
        };
        if power == 0.0 {
            return Err(Error::invalid("Lens has zero optical power."));
        }
        Ok(1.0 / power)
    }
}

fn check_radius(r: f64) -> Result<(), Error> {
    if r.is_finite() && r != 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!("Lens radius R1 must be finite and non-zero, got {r}.")))
    }
}

fn catalog_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bk7_at_sodium_d_line() {
        assert_relative_eq!(BK7.refractive_index(587.6e-9).unwrap(), 1.5168, epsilon = 1e-4);
    }

    #[test]
    fn dispersion_is_negative_in_visible() {
        let d = BK7.chromatic_dispersion(800e-9).unwrap();
        assert_relative_eq!(d, -19_841.77, max_relative = 1e-3);
        for glass in CATALOG {
            assert!(glass.chromatic_dispersion(600e-9).unwrap() < 0.0, "{}", glass.name());
        }
    }

    #[test]
    fn flat_second_surface_matches_plano_convex() {
        let pcx = BK7.focal_length(800e-9, Lens::PlanoConvex { r1: 51.5e-3 }).unwrap();
        assert_relative_eq!(pcx, 0.100_826_9, epsilon = 1e-6);
        let thick = BK7
            .focal_length(
                800e-9,
                Lens::Thick {
                    r1: 51.5e-3,
                    r2: f64::INFINITY,
                    thickness: 5e-3,
                },
            )
            .unwrap();
        assert_relative_eq!(pcx, thick, max_relative = 1e-12);
    }

    #[test]
    fn biconvex_is_stronger_than_plano_convex() {
        let lens = Lens::Thick {
            r1: 50e-3,
            r2: -50e-3,
            thickness: 4e-3,
        };
        let f = SF10.focal_length(633e-9, lens).unwrap();
        let pcx = SF10.focal_length(633e-9, Lens::PlanoConvex { r1: 50e-3 }).unwrap();
        assert!(f > 0.0 && f < pcx);
    }

    #[test]
    fn lookup_and_validation() {
        assert_eq!(Glass::by_name("n_sf6ht").unwrap().name(), "N-SF6HT");
        assert_eq!(Glass::by_name("bk7"), Some(BK7));
        assert!(Glass::by_name("unobtainium").is_none());
        assert!(Glass::new("bad", [1.0, f64::NAN, 0.0], [0.0; 3]).is_err());
        assert!(BK7.refractive_index(-1.0).is_err());
        assert!(BK7.focal_length(800e-9, Lens::PlanoConvex { r1: 0.0 }).is_err());
    }
}
