#![warn(missing_docs)]
//! Infinitely thin mirror with a flat or circular surface
use log::warn;
use serde::{Deserialize, Serialize};

use super::{reflect, ComponentAttr};
use crate::{
    error::{OptResult, OptraceError},
    ray::Ray,
    surface::{ArcSurface, GeoSurface, Hit},
};

/// An infinitely thin, double sided mirror.
///
/// Curvature convention (as seen from the side the axis points to):
/// - negative radius of curvature will be a concave (focusing) mirror
/// - positive radius of curvature will be a convex (defocusing) mirror
/// - no (or an infinite) radius of curvature corresponds to a flat mirror
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mirror {
    reflectivity: f64,
    radius_of_curvature: Option<f64>,
}
impl Default for Mirror {
    /// Create a flat, lossless mirror.
    fn default() -> Self {
        Self {
            reflectivity: 1.0,
            radius_of_curvature: None,
        }
    }
}
impl Mirror {
    /// Creates a new flat [`Mirror`] with the given reflectivity.
    ///
    /// # Errors
    ///
    /// This function will return an error if the reflectivity is outside the interval `[0.0, 1.0]`.
    pub fn new(reflectivity: f64) -> OptResult<Self> {
        if !(0.0..=1.0).contains(&reflectivity) {
            return Err(OptraceError::Component(
                "reflectivity must be within [0.0;1.0]".into(),
            ));
        }
        Ok(Self {
            reflectivity,
            radius_of_curvature: None,
        })
    }
    /// Modifies a [`Mirror`]'s curvature.
    ///
    /// The given radius of curvature must not be zero or `NaN`. A radius of curvature of +/- infinity
    /// corresponds to a flat surface. This function can be used with the "builder pattern".
    ///
    /// # Errors
    ///
    /// This function will return an error if the given radius of curvature is zero or `NaN`.
    pub fn with_curvature(mut self, radius_of_curvature: f64) -> OptResult<Self> {
        if radius_of_curvature == 0.0 || radius_of_curvature.is_nan() {
            return Err(OptraceError::Component(
                "curvature must not be 0.0 or NaN".into(),
            ));
        }
        self.radius_of_curvature = radius_of_curvature
            .is_finite()
            .then_some(radius_of_curvature);
        Ok(self)
    }
    /// Returns the reflectivity of this [`Mirror`].
    #[must_use]
    pub const fn reflectivity(&self) -> f64 {
        self.reflectivity
    }
    /// Returns the radius of curvature of this [`Mirror`] (`None` for a flat mirror).
    #[must_use]
    pub const fn radius_of_curvature(&self) -> Option<f64> {
        self.radius_of_curvature
    }
    /// Returns the geometric surface of this mirror.
    pub(super) fn surface(&self, attr: &ComponentAttr) -> Box<dyn GeoSurface> {
        match self.radius_of_curvature {
            Some(radius) if radius.is_finite() && radius != 0.0 => Box::new(ArcSurface::new(
                attr.position,
                attr.axis(),
                radius,
                attr.size,
            )),
            _ => Box::new(attr.flat_surface()),
        }
    }
    pub(super) fn interact(&self, ray: &Ray, hit: &Hit) -> Vec<Ray> {
        let reflectivity = if (0.0..=1.0).contains(&self.reflectivity) {
            self.reflectivity
        } else {
            warn!("mirror reflectivity outside [0.0;1.0]. Clamping.");
            if self.reflectivity.is_nan() {
                0.0
            } else {
                self.reflectivity.clamp(0.0, 1.0)
            }
        };
        let direction = reflect(ray.direction(), hit.normal);
        vec![ray.spawn(hit.point, direction, reflectivity)]
    }
}
