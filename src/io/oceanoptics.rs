//! Read spectra data files from Ocean Optics spectrometers.
//!
//! Both SpectraSuite and OceanView write tab-delimited text exports:
//!
//! ```text
//! SpectraSuite Data File
//! ++++++++++++++++++++++++++++++++++++
//! Date: Mon Sep 22 14:30:12 CEST 2014
//! Integration Time (usec): 100000 (USB2G14742)
//! ...
//! >>>>>Begin Processed Spectral Data<<<<<
//! 339.27	0.00
//! ...
//! >>>>>End Processed Spectral Data<<<<<
//! ```
//!
//! Header lines are `Key: value`; many SpectraSuite values carry a trailing
//! `(serial)` that we strip. Files exported "without header" are just the two
//! data columns.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;
use log::{debug, info, warn};

use crate::domain::ProfileKind;
use crate::error::Error;
use crate::fit::{CurveFit, FitOptions, fit_profile, fwhm_from_samples};
use crate::misc::remove_offset;

/// Lines starting with this are markers/comments, never data.
const COMMENT_PREFIX: &str = ">>";

/// Instrument metadata parsed from the file header.
///
/// Every field is optional because headerless exports carry none of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumMetadata {
    /// Acquisition time as written (local to the acquiring machine).
    pub timestamp: Option<NaiveDateTime>,
    /// Time zone abbreviation from the date line (e.g. `CEST`).
    pub timezone: Option<String>,
    pub user: Option<String>,
    pub serial_number: Option<String>,
    pub integration_time: Option<Duration>,
    pub spectra_averaged: Option<u32>,
    pub boxcar_width: Option<u32>,
    pub electrical_dark_correction: Option<bool>,
    pub nonlinearity_correction: Option<bool>,
    /// Pixel count declared by the header.
    pub pixel_count: Option<usize>,
    /// Wavelength calibration polynomial, lowest order first.
    pub calibration_coefficients: Vec<f64>,
    /// All other header entries, keyed by the header name as written.
    pub extra: BTreeMap<String, String>,
}

/// A single spectrometer reading.
#[derive(Debug, Clone)]
pub struct OceanOpticsSpectrum {
    /// Wavelength axis in nm.
    pub wavelength: Vec<f64>,
    /// Detector response (arb. units), same length as `wavelength`.
    pub intensity: Vec<f64>,
    pub metadata: SpectrumMetadata,
    pub source: Option<PathBuf>,
}

impl OceanOpticsSpectrum {
    /// Load sample data from a file.
    pub fn load_sample(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read spectrum '{}': {e}", path.display())))?;
        let mut spectrum = Self::parse_str(&text)
            .map_err(|e| Error::new(e.kind(), format!("{}: {}", path.display(), e.message())))?;
        spectrum.source = Some(path.to_path_buf());
        info!("Loaded {} samples from {}", spectrum.len(), path.display());
        Ok(spectrum)
    }

    /// Parse the text of an Ocean Optics export.
    pub fn parse_str(text: &str) -> Result<Self, Error> {
        let has_begin_marker = text.lines().any(is_begin_marker);

        let mut metadata = SpectrumMetadata::default();
        let mut coefficients: BTreeMap<usize, f64> = BTreeMap::new();
        let mut wavelength = Vec::new();
        let mut intensity = Vec::new();
        let mut in_data = !has_begin_marker;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim().trim_start_matches('\u{feff}');
            if line.is_empty() {
                continue;
            }

            if line.starts_with(COMMENT_PREFIX) {
                if is_begin_marker(line) {
                    in_data = true;
                } else if is_end_marker(line) {
                    in_data = false;
                }
                continue;
            }

            if !in_data {
                parse_header_line(line, &mut metadata, &mut coefficients);
                continue;
            }

            match parse_data_row(line) {
                Some((wl, value)) => {
                    wavelength.push(wl);
                    intensity.push(value);
                }
                // Headerless files may still start with a title line or two.
                None if !has_begin_marker && wavelength.is_empty() => {
                    debug!("Skipping non-numeric line {line_no} before data: {line:?}");
                }
                None => {
                    return Err(Error::parse(format!(
                        "Line {line_no}: expected two numeric columns, got {line:?}."
                    )));
                }
            }
        }

        if wavelength.is_empty() {
            return Err(Error::parse("No spectral data found."));
        }

        if !coefficients.is_empty() && metadata.calibration_coefficients.is_empty() {
            metadata.calibration_coefficients = collect_numbered_coefficients(coefficients)?;
        }

        if let Some(declared) = metadata.pixel_count {
            if declared != wavelength.len() {
                warn!(
                    "Header declares {declared} pixels but {} data rows were read",
                    wavelength.len()
                );
            }
        }

        Ok(Self {
            wavelength,
            intensity,
            metadata,
            source: None,
        })
    }

    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    /// `(wavelength, intensity)` of the brightest sample.
    pub fn peak(&self) -> Option<(f64, f64)> {
        crate::math::stats::argmax(&self.intensity).map(|i| (self.wavelength[i], self.intensity[i]))
    }

    /// Copy of the spectrum restricted to `xmin <= λ <= xmax`.
    pub fn crop(&self, xmin: f64, xmax: f64) -> Result<Self, Error> {
        if !(xmin.is_finite() && xmax.is_finite() && xmax > xmin) {
            return Err(Error::invalid(format!("Invalid wavelength window [{xmin}, {xmax}].")));
        }
        let (wavelength, intensity): (Vec<f64>, Vec<f64>) = self
            .wavelength
            .iter()
            .zip(self.intensity.iter())
            .filter(|&(&wl, _)| wl >= xmin && wl <= xmax)
            .map(|(&wl, &v)| (wl, v))
            .unzip();
        if wavelength.is_empty() {
            return Err(Error::invalid(format!(
                "No samples inside wavelength window [{xmin}, {xmax}] nm."
            )));
        }
        Ok(Self {
            wavelength,
            intensity,
            metadata: self.metadata.clone(),
            source: self.source.clone(),
        })
    }

    /// Fit the spectrum to a Gaussian profile.
    ///
    /// `p0 = [A, B, λ0, σ]`; with `None` a starting point is estimated from
    /// the data.
    pub fn fit_gaussian(&self, p0: Option<&[f64]>) -> Result<CurveFit, Error> {
        self.fit_profile(ProfileKind::Gaussian, p0, &FitOptions::default())
    }

    /// Fit the spectrum to any profile kind.
    pub fn fit_profile(&self, kind: ProfileKind, p0: Option<&[f64]>, opts: &FitOptions) -> Result<CurveFit, Error> {
        fit_profile(kind, &self.wavelength, &self.intensity, p0, opts)
    }

    /// FWHM measured on the samples after removing the baseline offset.
    pub fn measured_fwhm(&self) -> Result<f64, Error> {
        let shifted = remove_offset(&self.intensity)?;
        fwhm_from_samples(&self.wavelength, &shifted)
    }

    /// Wavelength of detector pixel `pixel` from the calibration polynomial.
    pub fn wavelength_for_pixel(&self, pixel: usize) -> Option<f64> {
        let coeffs = &self.metadata.calibration_coefficients;
        if coeffs.is_empty() {
            return None;
        }
        let p = pixel as f64;
        // Horner, highest order first.
        Some(coeffs.iter().rev().fold(0.0, |acc, &c| acc * p + c))
    }

    /// Plot the spectrum (and fit, if given) to an SVG file.
    pub fn plot_spectrum(&self, fit: Option<&CurveFit>, xlims: Option<(f64, f64)>, path: &Path) -> Result<(), Error> {
        crate::plot::svg::write_spectrum_svg(path, self, fit, xlims)
    }
}

fn is_begin_marker(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(COMMENT_PREFIX) && line.to_ascii_lowercase().contains("begin")
}

fn is_end_marker(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(COMMENT_PREFIX) && line.to_ascii_lowercase().contains("end")
}

fn parse_data_row(line: &str) -> Option<(f64, f64)> {
    let mut tokens = line.split_whitespace();
    let wl = parse_number(tokens.next()?)?;
    let value = parse_number(tokens.next()?)?;
    if tokens.next().is_some() {
        return None;
    }
    Some((wl, value))
}

/// Parse a float, accepting a decimal comma when no `.` is present.
fn parse_number(token: &str) -> Option<f64> {
    let v = match token.parse::<f64>() {
        Ok(v) => v,
        Err(_) if token.contains(',') && !token.contains('.') => token.replace(',', ".").parse::<f64>().ok()?,
        Err(_) => return None,
    };
    if v.is_finite() { Some(v) } else { None }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

/// Drop a trailing `(USB2G14742)`-style serial annotation.
fn strip_annotation(value: &str) -> &str {
    let value = value.trim();
    match value.rfind('(') {
        Some(i) if value.ends_with(')') && i > 0 => value[..i].trim_end(),
        _ => value,
    }
}

fn parse_header_line(line: &str, meta: &mut SpectrumMetadata, coefficients: &mut BTreeMap<usize, f64>) {
    let Some((raw_key, raw_value)) = line.split_once(':') else {
        // Title lines ("SpectraSuite Data File", "++++") carry no data.
        debug!("Ignoring header line without key: {line:?}");
        return;
    };
    let key = normalize_key(raw_key);
    let value = strip_annotation(raw_value);

    let handled = match key.as_str() {
        "date" => match parse_timestamp(value) {
            Some((ts, tz)) => {
                meta.timestamp = Some(ts);
                meta.timezone = tz;
                true
            }
            None => {
                warn!("Unrecognised date format in header: {value:?}");
                false
            }
        },
        "user" => {
            meta.user = Some(value.to_string());
            true
        }
        "spectrometer serial number" | "spectrometer" => {
            meta.serial_number = Some(value.to_string());
            true
        }
        "spectra averaged" | "scans to average" => set_parsed(&mut meta.spectra_averaged, value),
        "boxcar smoothing" | "boxcar width" => set_parsed(&mut meta.boxcar_width, value),
        "correct for electrical dark" | "electric dark correction enabled" => {
            set_flag(&mut meta.electrical_dark_correction, value)
        }
        "correct for detector non-linearity" | "nonlinearity correction enabled" => {
            set_flag(&mut meta.nonlinearity_correction, value)
        }
        "number of pixels in processed spectrum" | "number of pixels in spectrum" => {
            set_parsed(&mut meta.pixel_count, value)
        }
        "wavelength calibration coefficients" => {
            let parsed: Option<Vec<f64>> = value
                .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
                .filter(|t| !t.is_empty())
                .map(|t| t.parse::<f64>().ok())
                .collect();
            match parsed {
                Some(c) if !c.is_empty() => {
                    meta.calibration_coefficients = c;
                    true
                }
                _ => false,
            }
        }
        k if k.starts_with("integration time") => match parse_integration_time(k, value) {
            Some(d) => {
                meta.integration_time = Some(d);
                true
            }
            None => false,
        },
        k if k.starts_with("wavelength calibration coefficient") => {
            let index = k.rsplit(' ').next().and_then(|s| s.parse::<usize>().ok());
            match (index, value.parse::<f64>()) {
                (Some(i), Ok(c)) => {
                    coefficients.insert(i, c);
                    true
                }
                _ => false,
            }
        }
        _ => false,
    };

    if !handled {
        meta.extra.insert(raw_key.trim().to_string(), raw_value.trim().to_string());
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut Option<T>, value: &str) -> bool {
    match value.parse::<T>() {
        Ok(v) => {
            *slot = Some(v);
            true
        }
        Err(_) => false,
    }
}

fn set_flag(slot: &mut Option<bool>, value: &str) -> bool {
    let flag = match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" => true,
        "no" | "false" | "off" => false,
        _ => return false,
    };
    *slot = Some(flag);
    true
}

/// `Integration Time (usec): 100000` or `Integration Time (sec): 1.0E-1`.
fn parse_integration_time(key: &str, value: &str) -> Option<Duration> {
    let amount = value.split_whitespace().next()?.parse::<f64>().ok()?;
    if !(amount.is_finite() && amount >= 0.0) {
        return None;
    }
    let seconds = if key.contains("usec") || key.contains("µs") || key.contains("us)") {
        amount * 1e-6
    } else if key.contains("msec") || key.contains("ms)") {
        amount * 1e-3
    } else {
        amount
    };
    Duration::try_from_secs_f64(seconds).ok()
}

/// `Mon Sep 22 14:30:12 CEST 2014` (Java `Date.toString`), with or without
/// the zone, or ISO `2014-09-22 14:30:12`.
fn parse_timestamp(value: &str) -> Option<(NaiveDateTime, Option<String>)> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.len() == 6 {
        let without_zone = format!(
            "{} {} {} {} {}",
            tokens[0], tokens[1], tokens[2], tokens[3], tokens[5]
        );
        if let Ok(ts) = NaiveDateTime::parse_from_str(&without_zone, "%a %b %d %H:%M:%S %Y") {
            return Some((ts, Some(tokens[4].to_string())));
        }
    }
    const FMTS: [&str; 3] = ["%a %b %d %H:%M:%S %Y", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in FMTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some((ts, None));
        }
    }
    None
}

fn collect_numbered_coefficients(coefficients: BTreeMap<usize, f64>) -> Result<Vec<f64>, Error> {
    let mut out = Vec::with_capacity(coefficients.len());
    for (expected, (index, c)) in coefficients.into_iter().enumerate() {
        if index != expected {
            return Err(Error::parse(format!(
                "Wavelength calibration coefficient {expected} is missing."
            )));
        }
        out.push(c);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SPECTRASUITE: &str = "SpectraSuite Data File
++++++++++++++++++++++++++++++++++++
Date: Mon Sep 22 14:30:12 CEST 2014
User: mvd
Spectrometer Serial Number: USB2G14742
Spectrometer Channel: Master
Integration Time (usec): 100000 (USB2G14742)
Spectra Averaged: 3 (USB2G14742)
Boxcar Smoothing: 2 (USB2G14742)
Correct for Electrical Dark: Yes (USB2G14742)
Strobe/Lamp Enabled: No (USB2G14742)
Correct for Detector Non-linearity: No (USB2G14742)
Correct for Stray Light: No (USB2G14742)
Graph Title:
Number of Sampled Component Spectra: 1
Number of Pixels in Processed Spectrum: 4
>>>>>Begin Processed Spectral Data<<<<<
400.00\t10.5
400.50\t12.0
401.00\t30.25
401.50\t11.0
>>>>>End Processed Spectral Data<<<<<
";

    #[test]
    fn parses_spectrasuite_header_and_data() {
        let s = OceanOpticsSpectrum::parse_str(SPECTRASUITE).unwrap();
        assert_eq!(s.len(), 4);
        assert_eq!(s.wavelength, vec![400.0, 400.5, 401.0, 401.5]);
        assert_eq!(s.intensity[2], 30.25);

        let m = &s.metadata;
        let expected = NaiveDate::from_ymd_opt(2014, 9, 22)
            .unwrap()
            .and_hms_opt(14, 30, 12)
            .unwrap();
        assert_eq!(m.timestamp, Some(expected));
        assert_eq!(m.timezone.as_deref(), Some("CEST"));
        assert_eq!(m.user.as_deref(), Some("mvd"));
        assert_eq!(m.serial_number.as_deref(), Some("USB2G14742"));
        assert_eq!(m.integration_time, Some(Duration::from_millis(100)));
        assert_eq!(m.spectra_averaged, Some(3));
        assert_eq!(m.boxcar_width, Some(2));
        assert_eq!(m.electrical_dark_correction, Some(true));
        assert_eq!(m.nonlinearity_correction, Some(false));
        assert_eq!(m.pixel_count, Some(4));
        assert!(m.calibration_coefficients.is_empty());
        assert_eq!(m.extra.get("Spectrometer Channel").map(String::as_str), Some("Master"));
        assert_eq!(m.extra.get("Graph Title").map(String::as_str), Some(""));
    }

    #[test]
    fn parses_oceanview_header_with_seconds_and_coefficients() {
        let text = "Data from spectrum.txt Node

Date: Thu Oct 01 09:15:00 2015
Spectrometer: USB4F01234
Integration Time (sec): 2.500000E-2
Scans to average: 5
Electric dark correction enabled: false
Wavelength Calibration Coefficient 0: 340.0
Wavelength Calibration Coefficient 1: 0.5
Wavelength Calibration Coefficient 2: -1.0E-5
>>>>>Begin Spectral Data<<<<<
340,00\t1,5
340,50\t2,5
";
        let s = OceanOpticsSpectrum::parse_str(text).unwrap();
        assert_eq!(s.wavelength, vec![340.0, 340.5]);
        assert_eq!(s.intensity, vec![1.5, 2.5]);
        assert_eq!(s.metadata.timezone, None);
        assert_eq!(s.metadata.integration_time, Some(Duration::from_millis(25)));
        assert_eq!(s.metadata.spectra_averaged, Some(5));
        assert_eq!(s.metadata.electrical_dark_correction, Some(false));
        assert_eq!(s.metadata.calibration_coefficients, vec![340.0, 0.5, -1.0e-5]);

        let wl = s.wavelength_for_pixel(100).unwrap();
        assert!((wl - (340.0 + 50.0 - 0.1)).abs() < 1e-9);
    }

    #[test]
    fn headerless_file_skips_leading_title() {
        let text = "Wavelength\tIntensity\n500.0\t1.0\n500.5\t2.0\n501.0\t1.0\n";
        let s = OceanOpticsSpectrum::parse_str(text).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.metadata, SpectrumMetadata::default());
    }

    #[test]
    fn malformed_row_is_parse_error_with_line_number() {
        let text = ">>>>>Begin Spectral Data<<<<<\n500.0\t1.0\n500.5\tabc\n";
        let err = OceanOpticsSpectrum::parse_str(text).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
        assert!(err.message().contains("Line 3"), "{}", err.message());
    }

    #[test]
    fn header_without_data_is_error() {
        let text = "Date: Mon Sep 22 14:30:12 CEST 2014\n>>>>>Begin Processed Spectral Data<<<<<\n";
        assert!(OceanOpticsSpectrum::parse_str(text).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = OceanOpticsSpectrum::load_sample(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[test]
    fn crop_and_peak() {
        let s = OceanOpticsSpectrum::parse_str(SPECTRASUITE).unwrap();
        assert_eq!(s.peak(), Some((401.0, 30.25)));
        let c = s.crop(400.4, 401.2).unwrap();
        assert_eq!(c.wavelength, vec![400.5, 401.0]);
        assert!(s.crop(500.0, 600.0).is_err());
    }

    #[test]
    fn gap_in_numbered_coefficients_is_error() {
        let text = "Wavelength Calibration Coefficient 0: 1.0\nWavelength Calibration Coefficient 2: 3.0\n>>>>>Begin<<<<<\n1 2\n";
        assert!(OceanOpticsSpectrum::parse_str(text).is_err());
    }

    #[test]
    fn out_of_range_integration_time_is_kept_as_extra() {
        for raw in ["1e30", "-1"] {
            let text = format!("Integration Time (sec): {raw}\n>>>>>Begin Spectral Data<<<<<\n500.0\t1.0\n");
            let s = OceanOpticsSpectrum::parse_str(&text).unwrap();
            assert_eq!(s.metadata.integration_time, None);
            assert_eq!(
                s.metadata.extra.get("Integration Time (sec)").map(String::as_str),
                Some(raw)
            );
        }
    }

    #[test]
    fn pixel_count_mismatch_only_warns() {
        let text = "Number of Pixels in Processed Spectrum: 2048\n>>>>>Begin Processed Spectral Data<<<<<\n500.0\t1.0\n500.5\t2.0\n501.0\t1.5\n";
        let s = OceanOpticsSpectrum::parse_str(text).unwrap();
        assert_eq!(s.metadata.pixel_count, Some(2048));
        assert_eq!(s.len(), 3);
    }
}
