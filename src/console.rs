//! Handling the optrace CLI
//!
//! This module handles the command line parsing as well as basic information (e.g. version information).
use std::path::{Path, PathBuf};

use clap::{builder::Str, Parser};
use uom::si::f64::Length;

use crate::{
    error::{OptResult, OptraceError},
    get_version, nanometer,
};

/// Validated command line arguments of the optrace application.
#[derive(Debug, PartialEq)]
pub struct Args {
    /// file path of the scene, which should be read in
    pub scene_path: PathBuf,
    /// optional destination file of the CSV path export
    pub csv_path: Option<PathBuf>,
    /// print the imaging result of the selected source / lens pair
    pub imaging: bool,
    /// wavelengths of a dispersion sweep. Empty for a single pass using the source wavelengths.
    pub wavelengths: Vec<Length>,
}

/// Raw command line arguments.
#[derive(Parser, Debug)]
#[command(author, version = Str::from(get_version()), about, long_about = None)]
pub struct PartialArgs {
    /// path of the scene file (YAML)
    #[arg(short, long)]
    scene: String,

    /// write the traced ray paths as CSV to this file
    #[arg(short, long)]
    csv: Option<String>,

    /// print the thin lens imaging result of the selected (or first) source and lens
    #[arg(short, long)]
    imaging: bool,

    /// trace one pass per wavelength (in nm) instead of the source wavelengths
    #[arg(short, long, value_delimiter = ',')]
    wavelengths: Vec<f64>,
}

/// Checks if the passed scene file path is valid (an existing file with extension `yaml` or `yml`).
fn file_path_is_valid(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

/// Checks if the parent directory of the given CSV path exists.
fn csv_path_is_valid(path: &Path) -> bool {
    path.parent()
        .map_or(true, |dir| dir.as_os_str().is_empty() || dir.is_dir())
}

impl TryFrom<PartialArgs> for Args {
    type Error = OptraceError;

    fn try_from(part_args: PartialArgs) -> OptResult<Self> {
        let scene_path = PathBuf::from(&part_args.scene);
        if !file_path_is_valid(&scene_path) {
            return Err(OptraceError::Console(format!(
                "invalid scene file: {}",
                scene_path.display()
            )));
        }
        let csv_path = part_args.csv.map(PathBuf::from);
        if let Some(path) = &csv_path {
            if !csv_path_is_valid(path) {
                return Err(OptraceError::Console(format!(
                    "directory of csv file {} does not exist",
                    path.display()
                )));
            }
        }
        if part_args
            .wavelengths
            .iter()
            .any(|w| !w.is_finite() || *w <= 0.0)
        {
            return Err(OptraceError::Console(
                "wavelengths must be >0.0 and finite".into(),
            ));
        }
        Ok(Self {
            scene_path,
            csv_path,
            imaging: part_args.imaging,
            wavelengths: part_args
                .wavelengths
                .into_iter()
                .map(|w| nanometer!(w))
                .collect(),
        })
    }
}

/// Creates the intro line containing the program name and version.
#[must_use]
fn create_intro() -> String {
    format!(
        "optrace - 2D geometric optics ray tracer\nversion {}\n",
        get_version()
    )
}

/// Show the intro and the CLI version information.
pub fn show_intro() {
    println!("{}", create_intro());
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs::File;
    fn partial(scene: &str) -> PartialArgs {
        PartialArgs {
            scene: scene.to_owned(),
            csv: None,
            imaging: false,
            wavelengths: Vec::new(),
        }
    }
    #[test]
    fn file_path_is_valid_test() {
        let dir = tempfile::tempdir().unwrap();
        let valid = dir.path().join("scene.yaml");
        File::create(&valid).unwrap();
        let also_valid = dir.path().join("scene.yml");
        File::create(&also_valid).unwrap();
        let not_yaml = dir.path().join("scene.txt");
        File::create(&not_yaml).unwrap();
        assert!(file_path_is_valid(&valid));
        assert!(file_path_is_valid(&also_valid));
        assert!(!file_path_is_valid(&not_yaml));
        assert!(!file_path_is_valid(&dir.path().join("missing.yaml")));
        assert!(!file_path_is_valid(dir.path()));
    }
    #[test]
    fn csv_path_is_valid_test() {
        let dir = tempfile::tempdir().unwrap();
        assert!(csv_path_is_valid(Path::new("paths.csv")));
        assert!(csv_path_is_valid(&dir.path().join("paths.csv")));
        assert!(!csv_path_is_valid(&dir.path().join("missing/paths.csv")));
    }
    #[test]
    fn try_from() {
        let dir = tempfile::tempdir().unwrap();
        let scene = dir.path().join("scene.yaml");
        File::create(&scene).unwrap();
        let scene_str = scene.to_str().unwrap();
        let args = Args::try_from(partial(scene_str)).unwrap();
        assert_eq!(args.scene_path, scene);
        assert_eq!(args.csv_path, None);
        assert!(!args.imaging);
        assert!(args.wavelengths.is_empty());
        assert!(Args::try_from(partial("does_not_exist.yaml")).is_err());
        let mut p = partial(scene_str);
        p.wavelengths = vec![500.0, 600.0];
        p.imaging = true;
        let args = Args::try_from(p).unwrap();
        assert_eq!(args.wavelengths, vec![nanometer!(500.0), nanometer!(600.0)]);
        assert!(args.imaging);
        let mut p = partial(scene_str);
        p.wavelengths = vec![-1.0];
        assert!(Args::try_from(p).is_err());
        let mut p = partial(scene_str);
        p.csv = Some(dir.path().join("nope/out.csv").to_str().unwrap().to_owned());
        assert!(Args::try_from(p).is_err());
    }
    #[test]
    fn parse() {
        let p = PartialArgs::try_parse_from([
            "optrace",
            "--scene",
            "a.yaml",
            "--wavelengths",
            "500,650.5",
            "-i",
        ])
        .unwrap();
        assert_eq!(p.scene, "a.yaml");
        assert_eq!(p.wavelengths, vec![500.0, 650.5]);
        assert!(p.imaging);
        assert!(PartialArgs::try_parse_from(["optrace"]).is_err());
    }
    #[test]
    fn intro_test() {
        assert!(create_intro().starts_with("optrace - 2D geometric optics ray tracer\nversion "));
    }
}
