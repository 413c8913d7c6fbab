//! Miscellaneous data helpers that don't fit anywhere else.

use crate::error::Error;
use crate::math::stats;

/// Shift `data` so its minimum value is zero.
pub fn remove_offset(data: &[f64]) -> Result<Vec<f64>, Error> {
    ensure_finite(data)?;
    let min = stats::min(data).ok_or_else(|| Error::invalid("Cannot remove the offset of empty data."))?;
    Ok(data.iter().map(|v| v - min).collect())
}

/// Divide `data` by its maximum value.
pub fn normalize(data: &[f64]) -> Result<Vec<f64>, Error> {
    ensure_finite(data)?;
    let max = stats::max(data).ok_or_else(|| Error::invalid("Cannot normalize empty data."))?;
    if max == 0.0 {
        return Err(Error::invalid("Cannot normalize data whose maximum is zero."));
    }
    Ok(data.iter().map(|v| v / max).collect())
}

/// Remove the DC offset, then normalize to a peak of one.
pub fn fix_offset_and_normalize(data: &[f64]) -> Result<Vec<f64>, Error> {
    normalize(&remove_offset(data)?)
}

fn ensure_finite(data: &[f64]) -> Result<(), Error> {
    match data.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(Error::invalid(format!("Non-finite value at index {i}."))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_normalize() {
        let data = [3.0, 5.0, 7.0, 4.0];
        assert_eq!(remove_offset(&data).unwrap(), vec![0.0, 2.0, 4.0, 1.0]);
        assert_eq!(normalize(&data).unwrap(), vec![3.0 / 7.0, 5.0 / 7.0, 1.0, 4.0 / 7.0]);
        assert_eq!(fix_offset_and_normalize(&data).unwrap(), vec![0.0, 0.5, 1.0, 0.25]);
    }

    #[test]
    fn normalize_divides_by_max_not_abs_max() {
        assert_eq!(normalize(&[-4.0, 2.0]).unwrap(), vec![-2.0, 1.0]);
    }

    #[test]
    fn degenerate_inputs_are_errors() {
        assert!(remove_offset(&[]).is_err());
        assert!(normalize(&[0.0, 0.0]).is_err());
        assert!(fix_offset_and_normalize(&[2.0, 2.0]).is_err());
        assert!(normalize(&[1.0, f64::NAN]).is_err());
    }
}
