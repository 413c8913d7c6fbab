use std::path::PathBuf;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use mvdlib::domain::ProfileKind;
use mvdlib::fit::fwhm;
use mvdlib::io::{fit_file, read_fit_json, write_fit_json};
use mvdlib::oceanoptics::OceanOpticsSpectrum;

const GAUSS_FWHM: f64 = 2.354_820_045_030_949;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/sample_spectrum.txt")
}

#[test]
fn loads_spectrasuite_export() {
    let spectrum = OceanOpticsSpectrum::load_sample(&sample_path()).unwrap();

    assert_eq!(spectrum.len(), 2048);
    assert_relative_eq!(spectrum.wavelength[0], 339.27);
    assert_relative_eq!(spectrum.intensity[0], 120.0);

    let meta = &spectrum.metadata;
    let expected = NaiveDate::from_ymd_opt(2015, 3, 17)
        .and_then(|d| d.and_hms_opt(16, 42, 5))
        .unwrap();
    assert_eq!(meta.timestamp, Some(expected));
    assert_eq!(meta.timezone.as_deref(), Some("CET"));
    assert_eq!(meta.user.as_deref(), Some("mvd"));
    assert_eq!(meta.serial_number.as_deref(), Some("USB2G14742"));
    let integration = meta.integration_time.unwrap();
    assert_relative_eq!(integration.as_secs_f64(), 0.05, epsilon = 1e-9);
    assert_eq!(meta.spectra_averaged, Some(10));
    assert_eq!(meta.boxcar_width, Some(0));
    assert_eq!(meta.electrical_dark_correction, Some(true));
    assert_eq!(meta.nonlinearity_correction, Some(false));
    assert_eq!(meta.pixel_count, Some(2048));
    assert_eq!(meta.extra.get("Graph Title").map(String::as_str), Some("HeNe reference"));
    assert_eq!(spectrum.source.as_deref(), Some(sample_path().as_path()));
}

#[test]
fn gaussian_fit_recovers_hene_line() {
    let spectrum = OceanOpticsSpectrum::load_sample(&sample_path()).unwrap();
    let fit = spectrum.fit_gaussian(None).unwrap();

    assert_relative_eq!(fit.params[0], 3500.0, max_relative = 1e-3);
    assert_relative_eq!(fit.params[1], 120.0, epsilon = 0.5);
    assert_relative_eq!(fit.params[2], 632.8, epsilon = 1e-3);
    assert_relative_eq!(fit.params[3].abs(), 1.2, epsilon = 1e-3);

    let width = fwhm(ProfileKind::Gaussian, &fit.params).unwrap();
    assert_relative_eq!(width, 1.2 * GAUSS_FWHM, epsilon = 5e-3);

    // Pixel spacing is ~0.35 nm here, so the sampled width is coarse.
    let measured = spectrum.measured_fwhm().unwrap();
    assert_relative_eq!(measured, 1.2 * GAUSS_FWHM, epsilon = 0.1);
}

#[test]
fn fit_exports_json_and_svg() {
    let dir = tempfile::tempdir().unwrap();
    let spectrum = OceanOpticsSpectrum::load_sample(&sample_path())
        .unwrap()
        .crop(620.0, 645.0)
        .unwrap();
    let fit = spectrum.fit_gaussian(None).unwrap();

    let json = dir.path().join("hene.json");
    let file = fit_file(&fit, 620.0, 645.0, Some(sample_path().as_path()));
    write_fit_json(&json, &file).unwrap();
    let back = read_fit_json(&json).unwrap();
    assert_eq!(back.profile, ProfileKind::Gaussian);
    assert_eq!(back.params, fit.params);
    assert!(back.fwhm.is_some());
    assert_eq!(back.grid.x.len(), back.grid.y.len());

    let svg = dir.path().join("hene.svg");
    spectrum.plot_spectrum(Some(&fit), Some((625.0, 640.0)), &svg).unwrap();
    let text = std::fs::read_to_string(&svg).unwrap();
    assert!(text.starts_with("<svg"));
    assert!(text.contains("polyline"));
}
