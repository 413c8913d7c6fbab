//! Top-level application orchestration.
//!
//! `src/main.rs` only sets up logging; this module is the "real main" that
//! parses arguments, runs the requested command, prints reports and plots and
//! writes optional exports.

use clap::Parser;

use crate::cli::{
    Cli, CombineArgs, Command, ConvertArgs, FitArgs, GlassArgs, InfoArgs, PlotArgs, RabiArgs, delimiter_byte,
    parse_indices,
};
use crate::domain::FitConfig;
use crate::error::Error;
use crate::io::{ColumnOptions, Combiner, CombinerOptions, OceanOpticsSpectrum};
use crate::optics::{Glass, Lens};
use crate::quantum::{RabiFlop, RabiOptions};

pub mod pipeline;

/// Entry point for the `mvd` binary.
pub fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Command::Info(args) => handle_info(args),
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Combine(args) => handle_combine(args),
        Command::Convert(args) => handle_convert(args),
        Command::Glass(args) => handle_glass(args),
        Command::Rabi(args) => handle_rabi(args),
    }
}

fn handle_info(args: InfoArgs) -> Result<(), Error> {
    let spectrum = OceanOpticsSpectrum::load_sample(&args.input)?;
    println!("{}", crate::report::format_spectrum_info(&spectrum));
    if !args.no_plot {
        let plot = crate::plot::render_ascii_plot(&spectrum.wavelength, &spectrum.intensity, None, args.width, args.height);
        println!("{plot}");
    }
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), Error> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_fit_summary(&run.fit, run.fwhm, run.measured_fwhm)
    );
    print!("{}", crate::report::format_worst_residuals(&run.worst_residuals));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.spectrum.wavelength,
            &run.spectrum.intensity,
            Some(&run.fit),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.svg {
        run.spectrum.plot_spectrum(Some(&run.fit), config.window, path)?;
    }
    if let Some(path) = &config.export_fit {
        let (lo, hi) = wavelength_span(&run.spectrum);
        let file = crate::io::fit_file(&run.fit, lo, hi, Some(config.input.as_path()));
        crate::io::write_fit_json(path, &file)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), Error> {
    if let Some(path) = &args.fit {
        let fit = crate::io::read_fit_json(path)?;
        println!("{}", crate::plot::render_ascii_plot_from_fit_file(&fit, args.width, args.height));
        return Ok(());
    }

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| Error::invalid("Either a spectrum file or --fit is required."))?;
    let spectrum = OceanOpticsSpectrum::load_sample(input)?;
    let xlims = args.xmin.zip(args.xmax);
    match &args.svg {
        Some(out) => spectrum.plot_spectrum(None, xlims, out)?,
        None => {
            let shown = match xlims {
                Some((lo, hi)) => spectrum.crop(lo, hi)?,
                None => spectrum,
            };
            let plot = crate::plot::render_ascii_plot(&shown.wavelength, &shown.intensity, None, args.width, args.height);
            println!("{plot}");
        }
    }
    Ok(())
}

fn handle_combine(args: CombineArgs) -> Result<(), Error> {
    let indices = parse_indices(&args.indices)?;
    let header: [&str; 3] = match args.header.as_slice() {
        [a, b, c] => [a.as_str(), b.as_str(), c.as_str()],
        other => {
            return Err(Error::invalid(format!(
                "--header needs exactly three labels, got {}.",
                other.len()
            )));
        }
    };
    let options = CombinerOptions {
        zpad: args.zpad,
        suffix: args.suffix.clone(),
        columns: ColumnOptions {
            delimiter: args.delimiter.map(delimiter_byte).transpose()?,
            skip_rows: args.skip_rows,
        },
    };

    let combined = Combiner::with_options(&args.dir, &args.prefix, options).combine(&indices)?;
    let out = combined.write(&args.out, &args.readme, header)?;
    print!("{}", crate::report::format_combined(&combined));
    println!("Wrote {}", out.display());
    Ok(())
}

fn handle_convert(args: ConvertArgs) -> Result<(), Error> {
    let value = crate::quantum::convert(args.value, args.from, args.to)?;
    println!("{} {} = {value:.9} {}", args.value, args.from, args.to);
    Ok(())
}

fn handle_glass(args: GlassArgs) -> Result<(), Error> {
    let glass = Glass::by_name(&args.name).ok_or_else(|| {
        let known: Vec<&str> = crate::optics::CATALOG.iter().map(|g| g.name()).collect();
        Error::invalid(format!("Unknown glass {:?}; known: {}.", args.name, known.join(", ")))
    })?;
    let lambda = args.wavelength * 1e-9;
    let index = glass.refractive_index(lambda)?;
    let dispersion = glass.chromatic_dispersion(lambda)?;

    let lens = match (args.r1, args.r2, args.thickness) {
        (Some(r1), None, _) => Some(Lens::PlanoConvex { r1: r1 * 1e-3 }),
        (Some(r1), Some(r2), Some(d)) => Some(Lens::Thick {
            r1: r1 * 1e-3,
            r2: r2 * 1e-3,
            thickness: d * 1e-3,
        }),
        (Some(_), Some(_), None) => return Err(Error::invalid("A thick lens needs --thickness.")),
        (None, ..) => None,
    };
    let focal = lens.map(|l| glass.focal_length(lambda, l)).transpose()?;

    print!(
        "{}",
        crate::report::format_glass(&glass, args.wavelength, index, dispersion, focal)
    );
    Ok(())
}

fn handle_rabi(args: RabiArgs) -> Result<(), Error> {
    let options = RabiOptions {
        delimiter: delimiter_byte(args.delimiter)?,
        percent: args.percent,
        use_errorbars: !args.no_errorbars,
        skip_rows: args.skip_rows,
    };
    let flop = RabiFlop::load(&args.input, &options)?;
    let fit = flop.fit(args.f0, args.tau)?;
    println!("{}", crate::report::format_fit_summary(&fit, None, None));
    println!("Rabi frequency: {:.6}", fit.params[1]);

    if let Some(path) = &args.svg {
        flop.plot(Some(&fit), path)?;
    }
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        input: args.input.clone(),
        profile: args.profile,
        p0: args.p0.clone(),
        window: args.xmin.zip(args.xmax),
        start_min_scale: args.min_scale,
        start_max_scale: args.max_scale,
        start_steps: args.starts,
        max_iterations: args.max_iter,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        svg: args.svg.clone(),
        export_fit: args.export_fit.clone(),
    }
}

fn wavelength_span(spectrum: &OceanOpticsSpectrum) -> (f64, f64) {
    crate::plot::finite_range(spectrum.wavelength.iter().copied()).unwrap_or((0.0, 1.0))
}
