#![warn(missing_docs)]
//! Module for handling optical rays
use std::fmt::Display;

use num::Zero;
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::nanometer};

use crate::{
    error::{OptResult, OptraceError},
    vector2::Vector2,
};

///Struct that contains all information about an optical ray
///
/// A [`Ray`] is a directed half line starting at its `origin`. It is consumed by the first surface it hits:
/// the tracer appends the hit point to its path and the hit component terminates it, possibly spawning
/// new (child) rays.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ray {
    /// Start point of the ray
    origin: Vector2,
    /// Propagation direction. Always normalized.
    direction: Vector2,
    /// Wavelength of the ray
    wavelength: Length,
    /// Intensity of the ray (relative, 1.0 = full source intensity)
    intensity: f64,
    /// Polarization angle in radians. `None` denotes unpolarized light.
    polarization: Option<f64>,
    /// Number of interactions in the lineage of this ray
    number_of_bounces: usize,
    /// True if the ray was consumed by a component or left the scene
    terminated: bool,
    /// Waypoints of this ray (starting with its origin)
    path: Vec<Vector2>,
}
impl Ray {
    /// Creates a new [`Ray`].
    ///
    /// The direction vector is normalized.
    ///
    /// # Errors
    /// This function returns an error if
    ///  - the given wavelength is <= 0.0, `NaN` or +inf
    ///  - the given intensity is outside the interval `[0.0, 1.0]` or `NaN`
    ///  - the direction vector has a zero length or is not finite
    ///  - the origin is not finite
    pub fn new(
        origin: Vector2,
        direction: Vector2,
        wavelength: Length,
        intensity: f64,
    ) -> OptResult<Self> {
        if wavelength.is_zero() || wavelength.is_sign_negative() || !wavelength.is_finite() {
            return Err(OptraceError::Ray("wavelength must be >0".into()));
        }
        if !(0.0..=1.0).contains(&intensity) {
            return Err(OptraceError::Ray(
                "intensity must be within [0.0;1.0]".into(),
            ));
        }
        if !origin.is_finite() {
            return Err(OptraceError::Ray("origin must be finite".into()));
        }
        let direction = direction.normalize();
        if direction.magnitude_squared().is_zero() {
            return Err(OptraceError::Ray(
                "length of direction must be >0 and finite".into(),
            ));
        }
        Ok(Self {
            origin,
            direction,
            wavelength,
            intensity,
            polarization: None,
            number_of_bounces: 0,
            terminated: false,
            path: vec![origin],
        })
    }
    /// Modifies the polarization of a [`Ray`]. This function can be used with the "builder pattern".
    #[must_use]
    pub fn with_polarization(mut self, polarization: Option<f64>) -> Self {
        self.polarization = polarization.filter(|p| p.is_finite());
        self
    }
    /// Returns the origin of this [`Ray`].
    #[must_use]
    pub const fn origin(&self) -> Vector2 {
        self.origin
    }
    /// Returns the (normalized) direction of this [`Ray`].
    #[must_use]
    pub const fn direction(&self) -> Vector2 {
        self.direction
    }
    /// Returns the wavelength of this [`Ray`].
    #[must_use]
    pub const fn wavelength(&self) -> Length {
        self.wavelength
    }
    /// Returns the intensity of this [`Ray`].
    #[must_use]
    pub const fn intensity(&self) -> f64 {
        self.intensity
    }
    /// Returns the polarization angle of this [`Ray`] or `None` if it is unpolarized.
    #[must_use]
    pub const fn polarization(&self) -> Option<f64> {
        self.polarization
    }
    /// Returns the number of interactions in the lineage of this [`Ray`].
    #[must_use]
    pub const fn number_of_bounces(&self) -> usize {
        self.number_of_bounces
    }
    /// Returns `true` if this [`Ray`] has been terminated.
    #[must_use]
    pub const fn terminated(&self) -> bool {
        self.terminated
    }
    /// Returns the waypoints of this [`Ray`]. The first point is always the origin.
    #[must_use]
    pub fn path(&self) -> &[Vector2] {
        &self.path
    }
    /// Returns the point at the given distance along the ray.
    #[must_use]
    pub fn point_at(&self, distance: f64) -> Vector2 {
        self.origin + self.direction * distance
    }
    /// Append the waypoint `origin + direction * distance` to the path.
    ///
    /// The origin itself is not modified. Non-finite distances are ignored.
    pub fn advance(&mut self, distance: f64) {
        if distance.is_finite() {
            let point = self.point_at(distance);
            self.path.push(point);
        }
    }
    /// Terminate this [`Ray`]. Calling this function more than once has no further effect.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }
    /// Create a child ray.
    ///
    /// The new ray starts at `new_origin`, inherits wavelength and polarization and carries
    /// `intensity * intensity_fraction`. The fraction is clamped to `[0.0, 1.0]` so that a child never carries
    /// more intensity than its parent. A degenerate (zero or non-finite) direction falls back to the direction of
    /// this ray.
    #[must_use]
    pub fn spawn(&self, new_origin: Vector2, new_direction: Vector2, intensity_fraction: f64) -> Self {
        let direction = new_direction.normalize();
        let direction = if direction.magnitude_squared().is_zero() {
            self.direction
        } else {
            direction
        };
        let fraction = if intensity_fraction.is_nan() {
            0.0
        } else {
            intensity_fraction.clamp(0.0, 1.0)
        };
        Self {
            origin: new_origin,
            direction,
            wavelength: self.wavelength,
            intensity: self.intensity * fraction,
            polarization: self.polarization,
            number_of_bounces: self.number_of_bounces + 1,
            terminated: false,
            path: vec![new_origin],
        }
    }
    /// Returns a copy of this ray moved to `origin` and pointing along `direction`, with a fresh path.
    ///
    /// Wavelength, intensity, polarization and bounce count are kept. A non-finite origin or a degenerate direction
    /// keeps the respective value of this ray.
    #[must_use]
    pub fn relocated(&self, origin: Vector2, direction: Vector2) -> Self {
        let origin = if origin.is_finite() {
            origin
        } else {
            self.origin
        };
        let direction = direction.normalize();
        let direction = if direction.magnitude_squared().is_zero() {
            self.direction
        } else {
            direction
        };
        Self {
            origin,
            direction,
            path: vec![origin],
            terminated: false,
            ..self.clone()
        }
    }
    /// Set the polarization angle. Used by polarizing components on freshly spawned rays.
    pub fn set_polarization(&mut self, polarization: Option<f64>) {
        self.polarization = polarization.filter(|p| p.is_finite());
    }
    /// Replace the wavelength of this ray. Used for spectral sweeps.
    ///
    /// # Errors
    /// This function returns an error if the wavelength is <= 0.0 or not finite.
    pub fn set_wavelength(&mut self, wavelength: Length) -> OptResult<()> {
        if wavelength.is_zero() || wavelength.is_sign_negative() || !wavelength.is_finite() {
            return Err(OptraceError::Ray("wavelength must be >0".into()));
        }
        self.wavelength = wavelength;
        Ok(())
    }
}
impl Display for Ray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nm = Length::format_args(nanometer, uom::fmt::DisplayStyle::Abbreviation);
        write!(
            f,
            "origin: {}, dir: {}, intensity: {:.6}, wavelength: {:.4}, terminated: {}",
            self.origin,
            self.direction,
            self.intensity,
            nm.with(self.wavelength),
            self.terminated
        )
    }
}
