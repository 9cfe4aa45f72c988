#![warn(missing_docs)]
//! An optical fiber with an input and an output face
use serde::{Deserialize, Serialize};

use super::{ComponentAttr, InteractionContext};
use crate::{
    error::{OptResult, OptraceError},
    ray::Ray,
    surface::{FlatSurface, GeoSurface, Hit},
    vector2::Vector2,
};

/// An optical fiber.
///
/// The input face is centered at the component position, perpendicular to the fiber axis (the component's
/// axis, pointing into the fiber) and spans the core diameter. Light is coupled into the fiber depending on its
/// angle of incidence relative to the acceptance cone given by the numerical aperture. Coupled light leaves the
/// output face along the output axis.
///
/// Without an explicit output placement, the output face lies on the fiber axis at a distance of `length` behind
/// the input face (straight fiber).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpticalFiber {
    numerical_aperture: f64,
    core_radius: f64,
    length: f64,
    output_position: Option<Vector2>,
    output_angle: Option<f64>,
}
impl Default for OpticalFiber {
    /// Create a straight fiber with NA = 0.22, a core radius of 5 and a length of 100 scene units.
    fn default() -> Self {
        Self {
            numerical_aperture: 0.22,
            core_radius: 5.0,
            length: 100.0,
            output_position: None,
            output_angle: None,
        }
    }
}
impl OpticalFiber {
    /// Creates a new straight [`OpticalFiber`].
    ///
    /// # Errors
    /// This function returns an error if
    ///  - the numerical aperture is outside the interval `[0.0, 1.0]`
    ///  - the core radius is <= 0.0 or not finite
    ///  - the length is < 0.0 or not finite
    pub fn new(numerical_aperture: f64, core_radius: f64, length: f64) -> OptResult<Self> {
        if !(0.0..=1.0).contains(&numerical_aperture) {
            return Err(OptraceError::Component(
                "numerical aperture must be within [0.0;1.0]".into(),
            ));
        }
        if !core_radius.is_finite() || core_radius <= 0.0 {
            return Err(OptraceError::Component(
                "core radius must be >0.0 and finite".into(),
            ));
        }
        if !length.is_finite() || length < 0.0 {
            return Err(OptraceError::Component(
                "fiber length must be >=0.0 and finite".into(),
            ));
        }
        Ok(Self {
            numerical_aperture,
            core_radius,
            length,
            output_position: None,
            output_angle: None,
        })
    }
    /// Place the output face explicitly. `angle` denotes the direction of the emitted light.
    #[must_use]
    pub const fn with_output(mut self, position: Vector2, angle: f64) -> Self {
        self.output_position = Some(position);
        self.output_angle = Some(angle);
        self
    }
    /// Returns the numerical aperture of this [`OpticalFiber`].
    #[must_use]
    pub const fn numerical_aperture(&self) -> f64 {
        self.numerical_aperture
    }
    /// Returns the core radius of this [`OpticalFiber`].
    #[must_use]
    pub const fn core_radius(&self) -> f64 {
        self.core_radius
    }
    /// Returns the (geometric) length of this [`OpticalFiber`].
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }
    /// Returns the input face of this fiber.
    #[must_use]
    pub fn input_face(&self, attr: &ComponentAttr) -> FlatSurface {
        let radius = if self.core_radius.is_finite() {
            self.core_radius.max(0.0)
        } else {
            0.0
        };
        FlatSurface::new(attr.position, attr.axis(), 2.0 * radius)
    }
    /// Returns center and (unit) emission direction of the output face.
    #[must_use]
    pub fn output_face(&self, attr: &ComponentAttr) -> (Vector2, Vector2) {
        let length = if self.length.is_finite() {
            self.length
        } else {
            0.0
        };
        let position = self
            .output_position
            .unwrap_or_else(|| attr.position + attr.axis() * length);
        let angle = self
            .output_angle
            .filter(|a| a.is_finite())
            .unwrap_or(attr.angle);
        (position, Vector2::from_angle(angle))
    }
    /// Returns the fraction of light coupled into the fiber for a ray with the given origin and direction.
    ///
    /// The factor is 1.0 for light incident along the fiber axis and decreases to 0.0 at the edge of the acceptance
    /// cone (`sin θ = NA`). Rays missing the core, arriving from the back or outside the acceptance cone are not
    /// coupled at all. A numerical aperture outside `[0.0, 1.0]` is clamped into this interval.
    #[must_use]
    pub fn check_input_coupling(
        &self,
        attr: &ComponentAttr,
        origin: Vector2,
        direction: Vector2,
    ) -> f64 {
        let direction = direction.normalize();
        if self.input_face(attr).intersect(origin, direction).is_empty() {
            return 0.0;
        }
        let axis = attr.axis();
        if direction.dot(axis) <= 0.0 {
            return 0.0;
        }
        let na = if self.numerical_aperture.is_nan() {
            0.0
        } else {
            self.numerical_aperture.clamp(0.0, 1.0)
        };
        if na == 0.0 {
            return 0.0;
        }
        let sin_incidence = direction.cross(axis).abs();
        let normalized = sin_incidence / na;
        normalized.mul_add(-normalized, 1.0).clamp(0.0, 1.0)
    }
    /// Consume the incoming ray at the input face and count the hit.
    pub fn handle_input_interaction(&self, ray: &mut Ray, ctx: &InteractionContext<'_>) {
        ray.terminate();
        ctx.counters.increment(ctx.component_index);
    }
    /// Emit the ray leaving the output face for a consumed input ray with the given coupling factor.
    #[must_use]
    pub fn generate_output_rays(
        &self,
        attr: &ComponentAttr,
        input: &Ray,
        coupling: f64,
    ) -> Vec<Ray> {
        if coupling.is_nan() || coupling <= 0.0 {
            return Vec::new();
        }
        let (position, direction) = self.output_face(attr);
        vec![input.spawn(position, direction, coupling)]
    }
    pub(super) fn interact(
        &self,
        attr: &ComponentAttr,
        ray: &mut Ray,
        _hit: &Hit,
        ctx: &InteractionContext<'_>,
    ) -> Vec<Ray> {
        let coupling = self.check_input_coupling(attr, ray.origin(), ray.direction());
        self.handle_input_interaction(ray, ctx);
        self.generate_output_rays(attr, ray, coupling)
    }
}
