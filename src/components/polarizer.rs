#![warn(missing_docs)]
//! An ideal linear polarizer
use serde::{Deserialize, Serialize};

use crate::{ray::Ray, surface::Hit};

/// An ideal linear polarizer.
///
/// Polarized light is attenuated according to Malus' law `I = I_0 cos²(θ_pol - θ_axis)`. Unpolarized light
/// is attenuated by one half. The transmitted ray is polarized along the transmission axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Polarizer {
    transmission_axis: f64,
}
impl Polarizer {
    /// Creates a new [`Polarizer`] with the given transmission axis angle (in radians).
    #[must_use]
    pub const fn new(transmission_axis: f64) -> Self {
        Self { transmission_axis }
    }
    /// Returns the transmission axis angle of this [`Polarizer`].
    #[must_use]
    pub const fn transmission_axis(&self) -> f64 {
        self.transmission_axis
    }
    /// Returns the transmitted fraction of a ray with the given polarization.
    #[must_use]
    pub fn transmittance(&self, polarization: Option<f64>) -> f64 {
        if !self.transmission_axis.is_finite() {
            return 1.0;
        }
        polarization.map_or(0.5, |p| (p - self.transmission_axis).cos().powi(2))
    }
    pub(super) fn interact(&self, ray: &Ray, hit: &Hit) -> Vec<Ray> {
        let mut transmitted = ray.spawn(
            hit.point,
            ray.direction(),
            self.transmittance(ray.polarization()),
        );
        if self.transmission_axis.is_finite() {
            transmitted.set_polarization(Some(self.transmission_axis));
        }
        vec![transmitted]
    }
}
