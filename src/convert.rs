use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use rayon::prelude::*;
use tracing::{info, info_span, warn};

use crate::color::Palette;
use crate::error::{ConvertError, Result};
use crate::extract::extract;
use crate::io::{load_palette_or_empty, read_pixels, save_palette, write_pixels};
use crate::quantize::quantize;

/// File naming and format settings shared by every conversion.
#[derive(Clone, Debug)]
pub struct ConverterConfig {
    /// Where the palette artifact is written and read.
    pub palette_path: PathBuf,
    /// Appended to file stems and directory names of converted output.
    pub suffix: String,
    /// Encoding used for the palette artifact and converted images.
    pub format: ImageFormat,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            palette_path: PathBuf::from("palette.png"),
            suffix: "_converted".to_string(),
            format: ImageFormat::Png,
        }
    }
}

impl ConverterConfig {
    fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("png")
    }

    /// `player.png` -> `player_converted.png`
    pub fn converted_file_name(&self, input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{stem}{}.{}", self.suffix, self.extension()))
    }

    /// `sprites/` -> `sprites_converted/`, next to the source directory.
    pub fn converted_dir_name(&self, dir: &Path) -> PathBuf {
        let mut name: OsString = match dir.file_name() {
            Some(n) => n.to_os_string(),
            None => dir.as_os_str().to_os_string(),
        };
        name.push(&self.suffix);
        match dir.parent() {
            Some(parent) if dir.file_name().is_some() => parent.join(name),
            _ => PathBuf::from(name),
        }
    }
}

/// Extract the palette of `reference` and write it to the configured
/// palette path.
pub fn create_palette(config: &ConverterConfig, reference: &Path) -> Result<Palette> {
    let image = read_pixels(reference)?;
    let palette = extract(&image)?;
    save_palette(&palette, &config.palette_path, config.format)?;

    info!(
        reference = %reference.display(),
        palette = %config.palette_path.display(),
        colors = palette.len(),
        "palette written"
    );
    Ok(palette)
}

/// Remap `input` onto `palette` and write the result to `output`.
pub fn convert_file(
    config: &ConverterConfig,
    palette: &Palette,
    input: &Path,
    output: &Path,
) -> Result<()> {
    if palette.is_empty() {
        return Err(ConvertError::EmptyPalette);
    }

    let source = read_pixels(input)?;
    let converted = quantize(&source, palette)?;
    write_pixels(&converted, output, config.format)?;

    info!(input = %input.display(), output = %output.display(), "image converted");
    Ok(())
}

/// Convert `input` into `out_dir`, named after the input plus the suffix.
/// Returns the written path.
pub fn convert_into(
    config: &ConverterConfig,
    palette: &Palette,
    input: &Path,
    out_dir: &Path,
) -> Result<PathBuf> {
    let output = out_dir.join(config.converted_file_name(input));
    convert_file(config, palette, input, &output)?;
    Ok(output)
}

// ------------------------------------------------------------
// Directory batches
// ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Converted,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: Outcome,
}

/// Per-file results of converting one directory tree.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.files.iter().filter(|f| f.outcome == Outcome::Converted).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.converted()
    }
}

/// Convert every image under `dir` whose extension matches the configured
/// format, mirroring the tree into the sibling `<dir><suffix>` directory.
///
/// A file that fails is recorded in the report and the rest of the batch
/// carries on. Files are converted in parallel.
pub fn convert_directory(
    config: &ConverterConfig,
    palette: &Palette,
    dir: &Path,
) -> Result<BatchReport> {
    let _span = info_span!("batch", dir = %dir.display()).entered();

    if palette.is_empty() {
        return Err(ConvertError::EmptyPalette);
    }

    let output_dir = config.converted_dir_name(dir);
    let mut inputs = Vec::new();
    collect_images(dir, config.extension(), &mut inputs)?;
    inputs.sort();

    fs::create_dir_all(&output_dir).map_err(|source| ConvertError::Io {
        path: output_dir.clone(),
        source,
    })?;
    info!(files = inputs.len(), output = %output_dir.display(), "converting directory");

    let files: Vec<FileOutcome> = inputs
        .par_iter()
        .map(|input| {
            let relative = input.strip_prefix(dir).unwrap_or(input);
            let output = output_dir.join(relative);
            let outcome = match convert_mirrored(config, palette, input, &output) {
                Ok(()) => Outcome::Converted,
                Err(e) => {
                    warn!(input = %input.display(), error = %e, "conversion failed");
                    Outcome::Failed(e.to_string())
                }
            };
            FileOutcome {
                input: input.clone(),
                output,
                outcome,
            }
        })
        .collect();

    Ok(BatchReport {
        source_dir: dir.to_path_buf(),
        output_dir,
        files,
    })
}

fn convert_mirrored(
    config: &ConverterConfig,
    palette: &Palette,
    input: &Path,
    output: &Path,
) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|source| ConvertError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    convert_file(config, palette, input, output)
}

/// Gather matching files under `dir`. Only `dir` itself must be readable;
/// unreadable entries and subdirectories below it are logged and skipped.
fn collect_images(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|source| ConvertError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "unreadable entry skipped");
                continue;
            }
        };

        if path.is_dir() {
            if let Err(e) = collect_images(&path, extension, out) {
                warn!(error = %e, "subdirectory skipped");
            }
        } else if path
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Load the configured palette once and convert each directory in turn.
///
/// Stops with [`ConvertError::EmptyPalette`] when the palette is missing or
/// empty. Paths that are not directories, and directories that cannot be
/// traversed, are logged and skipped.
pub fn convert_directories(config: &ConverterConfig, dirs: &[PathBuf]) -> Result<Vec<BatchReport>> {
    let palette = load_palette_or_empty(&config.palette_path);
    if palette.is_empty() {
        return Err(ConvertError::EmptyPalette);
    }

    let mut reports = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if !dir.is_dir() {
            warn!(path = %dir.display(), "not a directory, skipping");
            continue;
        }
        match convert_directory(config, &palette, dir) {
            Ok(report) => reports.push(report),
            Err(e) => warn!(path = %dir.display(), error = %e, "directory skipped"),
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_get_suffix() {
        let config = ConverterConfig::default();
        assert_eq!(
            config.converted_file_name(Path::new("art/player.png")),
            PathBuf::from("player_converted.png")
        );
        assert_eq!(
            config.converted_file_name(Path::new("player.bmp")),
            PathBuf::from("player_converted.png")
        );
    }

    #[test]
    fn directory_names_get_suffix() {
        let config = ConverterConfig {
            suffix: "_nes".into(),
            ..Default::default()
        };
        assert_eq!(
            config.converted_dir_name(Path::new("assets/Sprites")),
            PathBuf::from("assets/Sprites_nes")
        );
        assert_eq!(
            config.converted_dir_name(Path::new("Sprites")),
            PathBuf::from("Sprites_nes")
        );
    }

    #[test]
    fn empty_palette_stops_before_reading() {
        let config = ConverterConfig::default();
        let err = convert_file(
            &config,
            &Palette::default(),
            Path::new("does-not-exist.png"),
            Path::new("never-written.png"),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::EmptyPalette));
    }
}
