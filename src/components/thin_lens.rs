#![warn(missing_docs)]
//! An ideal thin lens
use log::warn;
use serde::{Deserialize, Serialize};

use super::ComponentAttr;
use crate::{
    error::{OptResult, OptraceError},
    ray::Ray,
    surface::Hit,
};

/// An ideal (aberration free) thin lens.
///
/// A positive `focal length` corresponds to a focussing (convex) lens while a negative `focal length` represents a
/// defocussing (concave) lens. Rays are redirected such that all rays of a parallel bundle pass through the same point
/// in the focal plane on the transmission side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinLens {
    focal_length: Option<f64>,
    transmission: f64,
}
impl Default for ThinLens {
    /// Create a lossless lens with a focal length of 100 scene units.
    fn default() -> Self {
        Self {
            focal_length: Some(100.0),
            transmission: 1.0,
        }
    }
}
impl ThinLens {
    /// Creates a new lossless [`ThinLens`] of the given focal length.
    ///
    /// # Errors
    /// This function returns an error if the given `focal_length` is 0.0 or not finite.
    pub fn new(focal_length: f64) -> OptResult<Self> {
        if focal_length == 0.0 || !focal_length.is_finite() {
            return Err(OptraceError::Component(
                "focal length must be != 0.0 & finite".into(),
            ));
        }
        Ok(Self {
            focal_length: Some(focal_length),
            transmission: 1.0,
        })
    }
    /// Modifies the transmission of this [`ThinLens`]. This function can be used with the "builder pattern".
    ///
    /// # Errors
    /// This function returns an error if the transmission is outside the interval `[0.0, 1.0]`.
    pub fn with_transmission(mut self, transmission: f64) -> OptResult<Self> {
        if !(0.0..=1.0).contains(&transmission) {
            return Err(OptraceError::Component(
                "transmission must be within [0.0;1.0]".into(),
            ));
        }
        self.transmission = transmission;
        Ok(self)
    }
    /// Returns the focal length of this [`ThinLens`] if it is usable (finite and non-zero).
    #[must_use]
    pub fn focal_length(&self) -> Option<f64> {
        self.focal_length.filter(|f| *f != 0.0 && f.is_finite())
    }
    /// Returns the transmission of this [`ThinLens`].
    #[must_use]
    pub const fn transmission(&self) -> f64 {
        self.transmission
    }
    pub(super) fn interact(&self, attr: &ComponentAttr, ray: &Ray, hit: &Hit) -> Vec<Ray> {
        let transmission = if self.transmission.is_nan() {
            0.0
        } else {
            self.transmission.clamp(0.0, 1.0)
        };
        let Some(focal_length) = self.focal_length() else {
            warn!(
                "lens '{}' has no usable focal length. Ray passes unaffected.",
                attr.name
            );
            return vec![ray.spawn(hit.point, ray.direction(), transmission)];
        };
        let direction = ray.direction();
        let tangent = attr.tangent();
        let mut axis = attr.axis();
        let mut axial = direction.dot(axis);
        if axial < 0.0 {
            axis = -axis;
            axial = -axial;
        }
        if axial < f64::EPSILON {
            // grazing incidence, no meaningful deflection
            return vec![ray.spawn(hit.point, direction, transmission)];
        }
        let slope = direction.dot(tangent) / axial;
        let height = (hit.point - attr.position).dot(tangent);
        // Aim at the point in the focal plane where the parallel chief ray would cross it.
        let f_abs = focal_length.abs();
        let new_direction =
            axis * f_abs + tangent * (f_abs * slope - focal_length.signum() * height);
        vec![ray.spawn(hit.point, new_direction, transmission)]
    }
}
