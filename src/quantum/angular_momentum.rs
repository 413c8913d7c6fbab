//! Angular momentum coupling coefficients.
//!
//! Quantum numbers are passed as `f64` and must be integers or half-integers.
//! Internally every value is doubled so all arithmetic is on integers; the
//! closed forms are Racah's formulas (see e.g. Edmonds, *Angular Momentum in
//! Quantum Mechanics*). Symbols that violate a selection rule are `0.0`.

use crate::error::Error;

/// Largest factorial representable as a finite `f64`.
const MAX_FACTORIAL: i64 = 170;

/// Landé g-factor `g_J` (without `g_S`/`g_L` corrections).
pub fn lande_g(s: f64, l: f64, j: f64) -> Result<f64, Error> {
    if !(j.is_finite() && j > 0.0) {
        return Err(Error::invalid(format!("Landé g is undefined for J = {j}.")));
    }
    let num = j * (j + 1.0) + s * (s + 1.0) - l * (l + 1.0);
    let den = 2.0 * j * (j + 1.0);
    Ok(1.0 + num / den)
}

/// Wigner 3-j symbol `(j1 j2 j3; m1 m2 m3)`.
pub fn wigner_3j(j1: f64, j2: f64, j3: f64, m1: f64, m2: f64, m3: f64) -> Result<f64, Error> {
    let [j1, j2, j3, m1, m2, m3] = doubled([j1, j2, j3, m1, m2, m3])?;
    check_nonnegative(&[j1, j2, j3])?;
    if m1 + m2 + m3 != 0 || !triangle(j1, j2, j3) {
        return Ok(0.0);
    }
    for (j, m) in [(j1, m1), (j2, m2), (j3, m3)] {
        if m.abs() > j || (j + m) % 2 != 0 {
            return Ok(0.0);
        }
    }

    let pre = delta(j1, j2, j3)?
        * fact((j1 + m1) / 2)?
        * fact((j1 - m1) / 2)?
        * fact((j2 + m2) / 2)?
        * fact((j2 - m2) / 2)?
        * fact((j3 + m3) / 2)?
        * fact((j3 - m3) / 2)?;

    let k_min = 0.max((j2 - j3 - m1) / 2).max((j1 - j3 + m2) / 2);
    let k_max = ((j1 + j2 - j3) / 2).min((j1 - m1) / 2).min((j2 + m2) / 2);
    let mut sum = 0.0;
    for k in k_min..=k_max {
        let den = fact(k)?
            * fact((j3 - j2 + m1) / 2 + k)?
            * fact((j3 - j1 - m2) / 2 + k)?
            * fact((j1 + j2 - j3) / 2 - k)?
            * fact((j1 - m1) / 2 - k)?
            * fact((j2 + m2) / 2 - k)?;
        sum += parity(k) / den;
    }

    Ok(parity((j1 - j2 - m3) / 2) * pre.sqrt() * sum)
}

/// Clebsch–Gordan coefficient `⟨j1 m1; j2 m2 | j m⟩`.
pub fn cg_coef(j1: f64, j2: f64, m1: f64, m2: f64, j: f64, m: f64) -> Result<f64, Error> {
    let three_j = wigner_3j(j1, j2, j, m1, m2, -m)?;
    if three_j == 0.0 {
        return Ok(0.0);
    }
    let [dj1, dj2, dm] = doubled([j1, j2, m])?;
    Ok(parity((dj1 - dj2 + dm) / 2) * (2.0 * j + 1.0).sqrt() * three_j)
}

/// Wigner 6-j symbol `{j1 j2 j3; J1 J2 J3}` (MathWorld notation).
pub fn wigner_6j(j1: f64, j2: f64, j3: f64, big_j1: f64, big_j2: f64, big_j3: f64) -> Result<f64, Error> {
    let [a, b, c, d, e, f] = doubled([j1, j2, j3, big_j1, big_j2, big_j3])?;
    check_nonnegative(&[a, b, c, d, e, f])?;
    let triads = [(a, b, c), (a, e, f), (d, b, f), (d, e, c)];
    if triads.iter().any(|&(x, y, z)| !triangle(x, y, z)) {
        return Ok(0.0);
    }

    let mut pre = 1.0;
    for &(x, y, z) in &triads {
        pre *= delta(x, y, z)?;
    }

    let sums = triads.map(|(x, y, z)| (x + y + z) / 2);
    let t_min = sums.iter().copied().max().unwrap_or(0);
    let t_max = ((a + b + d + e) / 2).min((b + c + e + f) / 2).min((c + a + f + d) / 2);
    let mut sum = 0.0;
    for t in t_min..=t_max {
        let mut den = fact((a + b + d + e) / 2 - t)? * fact((b + c + e + f) / 2 - t)? * fact((c + a + f + d) / 2 - t)?;
        for s in sums {
            den *= fact(t - s)?;
        }
        sum += parity(t) * fact(t + 1)? / den;
    }

    Ok(pre.sqrt() * sum)
}

/// Double each quantum number, rejecting anything not a multiple of ½.
fn doubled<const N: usize>(values: [f64; N]) -> Result<[i64; N], Error> {
    let mut out = [0i64; N];
    for (slot, v) in out.iter_mut().zip(values) {
        let twice = 2.0 * v;
        if !twice.is_finite() || (twice - twice.round()).abs() > 1e-9 {
            return Err(Error::invalid(format!(
                "Angular momentum quantum numbers must be integer or half-integer, got {v}."
            )));
        }
        *slot = twice.round() as i64;
    }
    Ok(out)
}

fn check_nonnegative(js: &[i64]) -> Result<(), Error> {
    if js.iter().any(|&j| j < 0) {
        return Err(Error::invalid("Angular momentum j must be non-negative."));
    }
    Ok(())
}

/// Triangle condition on doubled values, including integer perimeter.
fn triangle(a: i64, b: i64, c: i64) -> bool {
    (a + b + c) % 2 == 0 && (a - b).abs() <= c && c <= a + b
}

/// Triangle coefficient `Δ(abc)` on doubled values.
fn delta(a: i64, b: i64, c: i64) -> Result<f64, Error> {
    Ok(fact((a + b - c) / 2)? * fact((a - b + c) / 2)? * fact((-a + b + c) / 2)? / fact((a + b + c) / 2 + 1)?)
}

fn fact(n: i64) -> Result<f64, Error> {
    if !(0..=MAX_FACTORIAL).contains(&n) {
        return Err(Error::invalid(format!("Factorial argument {n} out of range.")));
    }
    Ok((2..=n).fold(1.0, |acc, k| acc * k as f64))
}

fn parity(n: i64) -> f64 {
    if n.rem_euclid(2) == 0 { 1.0 } else { -1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lande_g_values() {
        assert_relative_eq!(lande_g(0.5, 0.0, 0.5).unwrap(), 2.0);
        assert_relative_eq!(lande_g(0.5, 1.0, 1.5).unwrap(), 4.0 / 3.0);
        assert_relative_eq!(lande_g(0.5, 1.0, 0.5).unwrap(), 2.0 / 3.0);
        assert!(lande_g(0.5, 0.0, 0.0).is_err());
    }

    #[test]
    fn three_j_tabulated() {
        assert_relative_eq!(wigner_3j(1.0, 1.0, 0.0, 0.0, 0.0, 0.0).unwrap(), -1.0 / 3f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(wigner_3j(1.0, 1.0, 2.0, 1.0, -1.0, 0.0).unwrap(), (1.0f64 / 30.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(wigner_3j(0.5, 0.5, 1.0, 0.5, -0.5, 0.0).unwrap(), (1.0f64 / 6.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn three_j_selection_rules_give_zero() {
        assert_eq!(wigner_3j(1.0, 1.0, 3.0, 0.0, 0.0, 0.0).unwrap(), 0.0);
        assert_eq!(wigner_3j(1.0, 1.0, 1.0, 1.0, 1.0, 0.0).unwrap(), 0.0);
        assert_eq!(wigner_3j(1.0, 1.0, 1.0, 2.0, -2.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn clebsch_gordan_tabulated() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(cg_coef(0.5, 0.5, 0.5, -0.5, 1.0, 0.0).unwrap(), s, epsilon = 1e-12);
        assert_relative_eq!(cg_coef(0.5, 0.5, 0.5, -0.5, 0.0, 0.0).unwrap(), s, epsilon = 1e-12);
        assert_relative_eq!(cg_coef(0.5, 0.5, -0.5, 0.5, 0.0, 0.0).unwrap(), -s, epsilon = 1e-12);
        assert_relative_eq!(cg_coef(1.0, 0.5, 1.0, -0.5, 1.5, 0.5).unwrap(), (1.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(cg_coef(1.0, 1.0, 1.0, 1.0, 2.0, 2.0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn six_j_tabulated() {
        assert_relative_eq!(wigner_6j(0.5, 0.5, 1.0, 0.5, 0.5, 0.0).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(wigner_6j(1.0, 1.0, 1.0, 1.0, 1.0, 1.0).unwrap(), 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(wigner_6j(2.0, 2.0, 2.0, 2.0, 2.0, 2.0).unwrap(), -3.0 / 70.0, epsilon = 1e-12);
        assert_eq!(wigner_6j(1.0, 1.0, 3.0, 1.0, 1.0, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn non_half_integer_input_is_error() {
        assert!(wigner_3j(0.3, 1.0, 1.0, 0.0, 0.0, 0.0).is_err());
        assert!(wigner_6j(1.0, 1.0, 1.0, 1.0, 1.0, f64::NAN).is_err());
        assert!(wigner_3j(-1.0, 1.0, 0.0, 0.0, 0.0, 0.0).is_err());
    }
}
