#![warn(missing_docs)]
//! Analytic thin lens imaging
//!
//! This module calculates the image of an object point (the tip of an object arrow) formed by a single
//! [`ThinLens`](crate::components::ThinLens) using the thin lens equation `1/f = 1/u + 1/v`. In addition, it
//! constructs the principal rays (parallel, focal and chief ray) as a list of line segments for rendering a lens
//! diagram. It is independent of the [`Tracer`](crate::tracer::Tracer).
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    components::{Component, ComponentKind},
    error::{OptResult, OptraceError},
    scene::Scene,
    utils::GEOM_EPSILON,
    vector2::Vector2,
};

/// Line style of a [`DiagramSegment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    /// a real ray or a real image
    Solid,
    /// a virtual ray extension or a virtual image
    Dashed,
}

/// Meaning of a [`DiagramSegment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// the object arrow
    Object,
    /// the image arrow
    Image,
    /// the ray incident parallel to the optical axis
    ParallelRay,
    /// the ray passing through the front focal point
    FocalRay,
    /// the undeviated ray through the lens center
    ChiefRay,
}

/// A line segment of a lens diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagramSegment {
    /// start point
    pub start: Vector2,
    /// end point
    pub end: Vector2,
    /// line style
    pub style: LineStyle,
    /// meaning of the segment
    pub kind: SegmentKind,
}
impl DiagramSegment {
    const fn new(start: Vector2, end: Vector2, style: LineStyle, kind: SegmentKind) -> Self {
        Self {
            start,
            end,
            style,
            kind,
        }
    }
}

/// Result of a thin lens imaging calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagingResult {
    /// object distance (positive for an object in front of the lens)
    pub u: f64,
    /// image distance (positive on the transmission side, infinite for an image at infinity)
    pub v: f64,
    /// (lateral) magnification `M = -v/u`
    pub magnification: f64,
    /// `true` if the image is located on the transmission side
    pub is_real_image: bool,
    /// `true` if the object is located in the front focal plane
    pub image_at_infinity: bool,
    /// tip of the image arrow (`None` for an image at infinity)
    pub image_tip: Option<Vector2>,
}
impl Display for ImagingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.image_at_infinity {
            return write!(f, "u: {:.3}, image at infinity", self.u);
        }
        let kind = if self.is_real_image { "real" } else { "virtual" };
        write!(
            f,
            "u: {:.3}, v: {:.3}, M: {:.3}, {kind} image",
            self.u, self.v, self.magnification
        )?;
        if let Some(tip) = self.image_tip {
            write!(f, " at {tip}")?;
        }
        Ok(())
    }
}

/// Configuration of the lens diagram construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagingConfig {
    /// length of the ray segments drawn beyond the image (or beyond the lens for virtual images). If `None`, twice
    /// the largest of `|f|`, `|u|` and `|v|` is used.
    pub extension: Option<f64>,
    /// relative tolerance for detecting an object in the focal plane or at the lens
    pub tolerance: f64,
}
impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            extension: None,
            tolerance: GEOM_EPSILON,
        }
    }
}

/// Imaging calculation of a single lens together with its diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct LensImaging {
    result: ImagingResult,
    segments: Vec<DiagramSegment>,
}
impl LensImaging {
    /// Calculate the image of `object_tip` formed by a lens centered at `lens_center` with the given optical axis
    /// direction and focal length.
    ///
    /// The axis is flipped if necessary such that the object is located in front of the lens. Degenerate cases
    /// are handled without errors:
    ///   - an object in the front focal plane yields an image at infinity.
    ///   - an object located at the lens yields an image coinciding with the object (`v = 0`, `M = 1`).
    #[must_use]
    pub fn calculate(
        lens_center: Vector2,
        lens_axis: Vector2,
        focal_length: f64,
        object_tip: Vector2,
        config: &ImagingConfig,
    ) -> Self {
        let mut axis = lens_axis.normalize();
        if axis.magnitude_squared() == 0.0 {
            axis = Vector2::new(1.0, 0.0);
        }
        if (lens_center - object_tip).dot(axis) < 0.0 {
            axis = -axis;
        }
        let geometry = Geometry {
            center: lens_center,
            axis,
            tangent: axis.perpendicular(),
            focal_length,
        };
        let u = (lens_center - object_tip).dot(axis);
        let height = (object_tip - lens_center).dot(geometry.tangent);
        let tolerance = config.tolerance.abs();
        let result = if u.abs() <= tolerance * focal_length.abs().max(1.0) {
            ImagingResult {
                u,
                v: 0.0,
                magnification: 1.0,
                is_real_image: false,
                image_at_infinity: false,
                image_tip: Some(object_tip),
            }
        } else if (u - focal_length).abs() <= tolerance * focal_length.abs().max(1.0) {
            ImagingResult {
                u,
                v: f64::INFINITY,
                magnification: f64::INFINITY,
                is_real_image: false,
                image_at_infinity: true,
                image_tip: None,
            }
        } else {
            let v = u * focal_length / (u - focal_length);
            let magnification = -v / u;
            ImagingResult {
                u,
                v,
                magnification,
                is_real_image: v > 0.0,
                image_at_infinity: false,
                image_tip: Some(
                    lens_center + axis * v + geometry.tangent * (magnification * height),
                ),
            }
        };
        let extension = config
            .extension
            .filter(|e| e.is_finite() && *e > 0.0)
            .unwrap_or_else(|| {
                let v = if result.v.is_finite() { result.v } else { 0.0 };
                2.0 * focal_length.abs().max(u.abs()).max(v.abs()).max(1.0)
            });
        let segments = geometry.segments(&result, object_tip, height, extension);
        Self { result, segments }
    }
    /// Calculate the image of the given object point formed by the given lens component.
    ///
    /// # Errors
    ///
    /// This function will return an error if the component is not a thin lens or has no usable focal length.
    pub fn from_lens(
        lens: &Component,
        object_tip: Vector2,
        config: &ImagingConfig,
    ) -> OptResult<Self> {
        let ComponentKind::ThinLens(thin_lens) = lens.kind() else {
            return Err(OptraceError::Analysis(format!(
                "component '{}' is not a thin lens",
                lens.name()
            )));
        };
        let focal_length = thin_lens.focal_length().ok_or_else(|| {
            OptraceError::Analysis(format!(
                "lens '{}' has no usable focal length",
                lens.name()
            ))
        })?;
        Ok(Self::calculate(
            lens.attr().position,
            lens.attr().axis(),
            focal_length,
            object_tip,
            config,
        ))
    }
    /// Calculate the image of the imaging pair selected in the given [`Scene`] (see [`select_imaging_pair`]).
    ///
    /// The position of the source is used as object tip.
    ///
    /// # Errors
    ///
    /// This function will return an error if the scene contains no suitable source / lens pair or the lens has no
    /// usable focal length.
    pub fn from_scene(scene: &Scene, config: &ImagingConfig) -> OptResult<Self> {
        let (source, lens) = select_imaging_pair(scene)?;
        Self::from_lens(
            scene.component(lens)?,
            scene.component(source)?.attr().position,
            config,
        )
    }
    /// Returns the imaging parameters.
    #[must_use]
    pub const fn result(&self) -> &ImagingResult {
        &self.result
    }
    /// Returns the diagram segments in drawing order.
    #[must_use]
    pub fn segments(&self) -> &[DiagramSegment] {
        &self.segments
    }
}

/// Select the source and the lens used for lens imaging.
///
/// Selected components are preferred. Otherwise the first source and the first thin lens of the scene are used.
/// Returns the indices of source and lens.
///
/// # Errors
///
/// This function will return an error if the scene does not contain a source or a thin lens.
pub fn select_imaging_pair(scene: &Scene) -> OptResult<(usize, usize)> {
    let pick = |predicate: &dyn Fn(&Component) -> bool| {
        let candidates: Vec<usize> = scene
            .components()
            .iter()
            .enumerate()
            .filter(|(_, c)| predicate(c))
            .map(|(i, _)| i)
            .collect();
        candidates
            .iter()
            .copied()
            .find(|i| scene.components()[*i].attr().selected)
            .or_else(|| candidates.first().copied())
    };
    let source = pick(&Component::is_source)
        .ok_or_else(|| OptraceError::Analysis("scene contains no source".into()))?;
    let lens = pick(&|c: &Component| matches!(c.kind(), ComponentKind::ThinLens(_)))
        .ok_or_else(|| OptraceError::Analysis("scene contains no thin lens".into()))?;
    Ok((source, lens))
}

struct Geometry {
    center: Vector2,
    axis: Vector2,
    tangent: Vector2,
    focal_length: f64,
}
impl Geometry {
    fn segments(
        &self,
        result: &ImagingResult,
        object_tip: Vector2,
        height: f64,
        extension: f64,
    ) -> Vec<DiagramSegment> {
        let object_foot = self.center - self.axis * result.u;
        if result.v == 0.0 && !result.image_at_infinity {
            // object at the lens: the (virtual) image coincides with the object
            return vec![
                DiagramSegment::new(object_tip, object_foot, LineStyle::Solid, SegmentKind::Object),
                DiagramSegment::new(object_foot, object_tip, LineStyle::Dashed, SegmentKind::Image),
            ];
        }
        let mut segments = vec![DiagramSegment::new(
            object_foot,
            object_tip,
            LineStyle::Solid,
            SegmentKind::Object,
        )];
        let sign = self.focal_length.signum();
        // parallel ray: leaves towards (or away from) the back focal point
        let parallel_hit = self.center + self.tangent * height;
        let parallel_dir =
            (self.axis * self.focal_length.abs() - self.tangent * (height * sign)).normalize();
        segments.push(DiagramSegment::new(
            object_tip,
            parallel_hit,
            LineStyle::Solid,
            SegmentKind::ParallelRay,
        ));
        self.outgoing(
            &mut segments,
            result,
            parallel_hit,
            parallel_dir,
            extension,
            SegmentKind::ParallelRay,
        );
        // focal ray: leaves parallel to the axis
        if !result.image_at_infinity {
            let focal_hit = self.center + self.tangent * (result.magnification * height);
            segments.push(DiagramSegment::new(
                object_tip,
                focal_hit,
                LineStyle::Solid,
                SegmentKind::FocalRay,
            ));
            self.outgoing(
                &mut segments,
                result,
                focal_hit,
                self.axis,
                extension,
                SegmentKind::FocalRay,
            );
        }
        // chief ray: undeviated through the lens center
        segments.push(DiagramSegment::new(
            object_tip,
            self.center,
            LineStyle::Solid,
            SegmentKind::ChiefRay,
        ));
        let chief_dir = (self.center - object_tip).normalize();
        self.outgoing(
            &mut segments,
            result,
            self.center,
            chief_dir,
            extension,
            SegmentKind::ChiefRay,
        );
        if let Some(tip) = result.image_tip {
            let image_foot = self.center + self.axis * result.v;
            let style = if result.is_real_image {
                LineStyle::Solid
            } else {
                LineStyle::Dashed
            };
            segments.push(DiagramSegment::new(
                image_foot,
                tip,
                style,
                SegmentKind::Image,
            ));
        }
        segments
    }
    fn outgoing(
        &self,
        segments: &mut Vec<DiagramSegment>,
        result: &ImagingResult,
        lens_point: Vector2,
        direction: Vector2,
        extension: f64,
        kind: SegmentKind,
    ) {
        match result.image_tip {
            Some(tip) if result.is_real_image => {
                segments.push(DiagramSegment::new(lens_point, tip, LineStyle::Solid, kind));
                segments.push(DiagramSegment::new(
                    tip,
                    tip + direction * extension,
                    LineStyle::Solid,
                    kind,
                ));
            }
            Some(tip) => {
                segments.push(DiagramSegment::new(
                    lens_point,
                    lens_point + direction * extension,
                    LineStyle::Solid,
                    kind,
                ));
                segments.push(DiagramSegment::new(lens_point, tip, LineStyle::Dashed, kind));
            }
            None => segments.push(DiagramSegment::new(
                lens_point,
                lens_point + direction * extension,
                LineStyle::Solid,
                kind,
            )),
        }
    }
}
