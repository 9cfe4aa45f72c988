#![warn(missing_docs)]
//! Traced ray paths as handed to renderers
use std::{fmt::Display, io::Write};

use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::nanometer};

use crate::{
    error::{OptResult, OptraceError},
    ray::Ray,
    vector2::Vector2,
};

/// The way a traced ray ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathEnd {
    /// the ray was consumed by the component with the given scene index
    Component(usize),
    /// the ray did not hit any component and left the scene
    Escaped,
}
impl Display for PathEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Component(idx) => write!(f, "component {idx}"),
            Self::Escaped => write!(f, "escaped"),
        }
    }
}

/// The path of a single traced ray.
///
/// A path consists of the origin of the ray followed by its waypoints. Together with the `parent` index this
/// forms the lineage tree of all rays of a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayPath {
    points: Vec<Vector2>,
    wavelength: Length,
    intensity: f64,
    polarization: Option<f64>,
    depth: usize,
    parent: Option<usize>,
    terminated: bool,
    end: PathEnd,
}
impl RayPath {
    /// Record the path of a (finished) ray.
    #[must_use]
    pub fn new(ray: &Ray, parent: Option<usize>, end: PathEnd) -> Self {
        Self {
            points: ray.path().to_vec(),
            wavelength: ray.wavelength(),
            intensity: ray.intensity(),
            polarization: ray.polarization(),
            depth: ray.number_of_bounces(),
            parent,
            terminated: ray.terminated(),
            end,
        }
    }
    /// Returns the points of this path (starting with the ray origin).
    #[must_use]
    pub fn points(&self) -> &[Vector2] {
        &self.points
    }
    /// Returns the wavelength of the ray.
    #[must_use]
    pub const fn wavelength(&self) -> Length {
        self.wavelength
    }
    /// Returns the intensity of the ray.
    #[must_use]
    pub const fn intensity(&self) -> f64 {
        self.intensity
    }
    /// Returns the polarization angle of the ray (`None` if unpolarized).
    #[must_use]
    pub const fn polarization(&self) -> Option<f64> {
        self.polarization
    }
    /// Returns the number of interactions preceding this ray in its lineage.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
    /// Returns the index of the path of the parent ray (`None` for rays emitted by a source).
    #[must_use]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }
    /// Returns `true` if the ray was terminated.
    #[must_use]
    pub const fn terminated(&self) -> bool {
        self.terminated
    }
    /// Returns how the ray ended.
    #[must_use]
    pub const fn end(&self) -> PathEnd {
        self.end
    }
    /// Returns the last point of this path.
    #[must_use]
    pub fn last_point(&self) -> Option<Vector2> {
        self.points.last().copied()
    }
    /// Returns the geometric length of this path.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(w[1]))
            .sum()
    }
}

#[derive(Serialize)]
struct CsvRow {
    pass: usize,
    path: usize,
    parent: Option<usize>,
    depth: usize,
    point: usize,
    x: f64,
    y: f64,
    wavelength_nm: f64,
    intensity: f64,
    end: String,
}

/// Write the paths of a single trace pass as CSV (one row per path point) to the given writer.
///
/// # Errors
///
/// This function will return an error if writing to the underlying writer fails.
pub fn write_csv<W: Write>(paths: &[RayPath], writer: W) -> OptResult<()> {
    write_passes_csv([paths], writer)
}

/// Write the paths of several trace passes (e.g. of a wavelength sweep) as CSV to the given writer.
///
/// Paths are numbered consecutively over all passes and the `parent` column refers to this global numbering.
/// The `pass` column holds the index of the pass a path belongs to.
///
/// # Errors
///
/// This function will return an error if writing to the underlying writer fails.
pub fn write_passes_csv<'a, W, I>(passes: I, writer: W) -> OptResult<()>
where
    W: Write,
    I: IntoIterator<Item = &'a [RayPath]>,
{
    let mut writer = csv::Writer::from_writer(writer);
    let mut offset = 0;
    for (pass, paths) in passes.into_iter().enumerate() {
        for (path_idx, path) in paths.iter().enumerate() {
            let end = path.end.to_string();
            for (point_idx, point) in path.points.iter().enumerate() {
                writer
                    .serialize(CsvRow {
                        pass,
                        path: offset + path_idx,
                        parent: path.parent.map(|parent| offset + parent),
                        depth: path.depth,
                        point: point_idx,
                        x: point.x,
                        y: point.y,
                        wavelength_nm: path.wavelength.get::<nanometer>(),
                        intensity: path.intensity,
                        end: end.clone(),
                    })
                    .map_err(|e| OptraceError::Other(format!("csv export failed: {e}")))?;
            }
        }
        offset += paths.len();
    }
    writer
        .flush()
        .map_err(|e| OptraceError::Other(format!("csv export failed: {e}")))
}
