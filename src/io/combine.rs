//! Combine repeated measurements into mean ± standard deviation.
//!
//! Files are named `{prefix}{index}.{suffix}` with a zero-padded index, e.g.
//! `rabi_0006.dat`. Every file must share the x values of the first one.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Error;
use crate::io::columns::{ColumnOptions, read_columns};
use crate::math::stats;

/// Relative tolerance when comparing x values across files.
const X_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct CombinerOptions {
    /// Zero padding for file indices.
    pub zpad: usize,
    /// File extension without the dot.
    pub suffix: String,
    pub columns: ColumnOptions,
}

impl Default for CombinerOptions {
    fn default() -> Self {
        Self {
            zpad: 4,
            suffix: "dat".to_string(),
            columns: ColumnOptions::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Combiner {
    dir: PathBuf,
    prefix: String,
    options: CombinerOptions,
}

/// Averaged data plus where it came from.
#[derive(Debug, Clone)]
pub struct Combined {
    pub dir: PathBuf,
    pub prefix: String,
    pub zpad: usize,
    pub indices: Vec<u32>,
    pub x: Vec<f64>,
    /// Mean of y over all files.
    pub y: Vec<f64>,
    /// Population standard deviation of y over all files.
    pub yerr: Vec<f64>,
}

impl Combiner {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self::with_options(dir, prefix, CombinerOptions::default())
    }

    pub fn with_options(dir: impl Into<PathBuf>, prefix: impl Into<String>, options: CombinerOptions) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            options,
        }
    }

    /// Path of the data file for `index`.
    pub fn file_path(&self, index: u32) -> PathBuf {
        let name = format!(
            "{}{:0width$}.{}",
            self.prefix,
            index,
            self.options.suffix,
            width = self.options.zpad
        );
        self.dir.join(name)
    }

    /// Load every indexed file and average them point by point.
    pub fn combine(&self, indices: &[u32]) -> Result<Combined, Error> {
        if indices.is_empty() {
            return Err(Error::invalid("No file indices given to combine."));
        }

        let mut x_ref: Option<Vec<f64>> = None;
        let mut ys: Vec<Vec<f64>> = Vec::with_capacity(indices.len());
        for &index in indices {
            let path = self.file_path(index);
            let mut cols = read_columns(&path, &self.options.columns)?.into_columns();
            if cols.len() < 2 {
                return Err(Error::parse(format!(
                    "{}: expected at least two columns, got {}.",
                    path.display(),
                    cols.len()
                )));
            }
            let y = cols.swap_remove(1);
            let x = cols.swap_remove(0);

            match &x_ref {
                None => x_ref = Some(x),
                Some(first) if same_axis(first, &x) => {}
                Some(_) => {
                    return Err(Error::combine(format!(
                        "{}: x data must match the first file.",
                        path.display()
                    )));
                }
            }
            ys.push(y);
        }

        let Some(x) = x_ref else {
            return Err(Error::invalid("No file indices given to combine."));
        };
        let mut y = Vec::with_capacity(x.len());
        let mut yerr = Vec::with_capacity(x.len());
        let mut column = Vec::with_capacity(ys.len());
        for i in 0..x.len() {
            column.clear();
            column.extend(ys.iter().map(|series| series[i]));
            y.push(stats::mean(&column).unwrap_or(f64::NAN));
            yerr.push(stats::std_dev(&column).unwrap_or(f64::NAN));
        }

        info!(
            "Combined {} files with prefix '{}' ({} points)",
            indices.len(),
            self.prefix,
            x.len()
        );

        Ok(Combined {
            dir: self.dir.clone(),
            prefix: self.prefix.clone(),
            zpad: self.options.zpad,
            indices: indices.to_vec(),
            x,
            y,
            yerr,
        })
    }
}

impl Combined {
    /// Write `{prefix}_combined_{i}.csv` (first unused `i` from 1) into
    /// `location`, plus a `.README.txt` noting where the data came from.
    ///
    /// Returns the path of the CSV file.
    pub fn write(&self, location: &Path, readme: &str, header: [&str; 3]) -> Result<PathBuf, Error> {
        let (path, mut file) = self.create_output(location)?;

        writeln!(file, "# {},{},{}", header[0], header[1], header[2])
            .map_err(|e| Error::io(format!("Failed to write '{}': {e}", path.display())))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        for ((x, y), e) in self.x.iter().zip(&self.y).zip(&self.yerr) {
            writer
                .write_record([format!("{x:.6}"), format!("{y:.6}"), format!("{e:.6}")])
                .map_err(|e| Error::io(format!("Failed to write combined CSV row: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| Error::io(format!("Failed to write '{}': {e}", path.display())))?;

        let readme_path = path.with_extension("README.txt");
        let text = format!(
            "Data directory: {}\nData prefix: {}\nData indices: {:?}\n\n{readme}",
            self.dir.display(),
            self.prefix,
            self.indices
        );
        std::fs::write(&readme_path, text)
            .map_err(|e| Error::io(format!("Failed to write '{}': {e}", readme_path.display())))?;

        info!("Wrote {}", path.display());
        Ok(path)
    }

    fn create_output(&self, location: &Path) -> Result<(PathBuf, File), Error> {
        for i in 1..=u32::MAX {
            let name = format!("{}_combined_{:0width$}.csv", self.prefix, i, width = self.zpad);
            let path = location.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == IoErrorKind::AlreadyExists => continue,
                Err(e) => return Err(Error::io(format!("Failed to create '{}': {e}", path.display()))),
            }
        }
        Err(Error::io(format!(
            "No free output file name in '{}'.",
            location.display()
        )))
    }
}

fn same_axis(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(p, q)| (p - q).abs() <= X_TOLERANCE * p.abs().max(q.abs()).max(1.0))
}
