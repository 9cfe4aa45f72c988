#![warn(missing_docs)]
//! A laser source emitting a beam of rays
use log::warn;
use num::ToPrimitive;
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use super::ComponentAttr;
use crate::{error::OptResult, nanometer, ray::Ray, vector2::Vector2};

/// A laser source emitting `ray_count` rays along its axis.
///
/// The rays are distributed evenly across the source `size` (beam width) and fanned out symmetrically over the
/// full `divergence` angle. With a `size` of zero and a non-zero divergence the source acts as a point source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserSource {
    wavelength: Length,
    intensity: f64,
    ray_count: usize,
    divergence: f64,
    polarization: Option<f64>,
    split_intensity: bool,
}
impl Default for LaserSource {
    /// Create an unpolarized source emitting a single ray at 632.8 nm with full intensity.
    fn default() -> Self {
        Self {
            wavelength: nanometer!(632.8),
            intensity: 1.0,
            ray_count: 1,
            divergence: 0.0,
            polarization: None,
            split_intensity: false,
        }
    }
}
impl LaserSource {
    /// Creates a new [`LaserSource`] emitting a single ray of the given wavelength and intensity.
    #[must_use]
    pub fn new(wavelength: Length, intensity: f64) -> Self {
        Self {
            wavelength,
            intensity,
            ..Self::default()
        }
    }
    /// Modifies the number of emitted rays. This function can be used with the "builder pattern".
    #[must_use]
    pub const fn with_ray_count(mut self, ray_count: usize) -> Self {
        self.ray_count = ray_count;
        self
    }
    /// Modifies the full divergence angle (in radians). This function can be used with the "builder pattern".
    #[must_use]
    pub const fn with_divergence(mut self, divergence: f64) -> Self {
        self.divergence = divergence;
        self
    }
    /// Modifies the polarization angle (in radians, `None` for unpolarized light).
    #[must_use]
    pub const fn with_polarization(mut self, polarization: Option<f64>) -> Self {
        self.polarization = polarization;
        self
    }
    /// If set, the source intensity is distributed evenly over all emitted rays.
    #[must_use]
    pub const fn with_split_intensity(mut self, split_intensity: bool) -> Self {
        self.split_intensity = split_intensity;
        self
    }
    /// Returns the wavelength of this [`LaserSource`].
    #[must_use]
    pub const fn wavelength(&self) -> Length {
        self.wavelength
    }
    /// Returns the intensity of this [`LaserSource`].
    #[must_use]
    pub const fn intensity(&self) -> f64 {
        self.intensity
    }
    /// Returns the number of rays emitted by this [`LaserSource`].
    #[must_use]
    pub const fn ray_count(&self) -> usize {
        self.ray_count
    }
    /// Generate the rays of this source placed according to the given attributes.
    ///
    /// The rays are created lazily, one per call of [`Iterator::next`]. Invalid source parameters (e.g. a negative
    /// wavelength) do not abort the simulation. A warning is logged and no rays are emitted.
    pub(super) fn emit(&self, attr: &ComponentAttr) -> Emission {
        let Some(count) = self.ray_count.to_f64().filter(|c| *c > 0.0) else {
            return Emission::default();
        };
        let intensity = if self.split_intensity {
            self.intensity / count
        } else {
            self.intensity
        };
        if !attr.size.is_finite() {
            warn!("source '{}' has a non-finite size. No rays emitted.", attr.name);
            return Emission::default();
        }
        let template = match Ray::new(attr.position, attr.axis(), self.wavelength, intensity) {
            Ok(ray) => ray.with_polarization(self.polarization),
            Err(e) => {
                warn!("source '{}' cannot emit rays: {e}", attr.name);
                return Emission::default();
            }
        };
        Emission {
            template: Some(template),
            tangent: attr.tangent(),
            size: attr.size,
            divergence: if self.divergence.is_finite() {
                self.divergence
            } else {
                0.0
            },
            count: self.ray_count,
            next: 0,
        }
    }
}

/// The rays emitted by a source.
///
/// Rays are generated on demand, so the ray count of a source is not limited by memory. The number of remaining rays
/// is always known ([`ExactSizeIterator`]) and all rays of an emission carry the same intensity.
#[derive(Debug, Clone, Default)]
pub struct Emission {
    template: Option<Ray>,
    tangent: Vector2,
    size: f64,
    divergence: f64,
    count: usize,
    next: usize,
}
impl Emission {
    /// Returns the intensity carried by each ray of this [`Emission`] (zero if no rays are emitted).
    #[must_use]
    pub fn ray_intensity(&self) -> f64 {
        self.template.as_ref().map_or(0.0, Ray::intensity)
    }
    /// Replace the wavelength of all rays of this [`Emission`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the wavelength is <= 0.0 or not finite.
    pub fn with_wavelength(mut self, wavelength: Length) -> OptResult<Self> {
        if let Some(template) = &mut self.template {
            template.set_wavelength(wavelength)?;
        }
        Ok(self)
    }
}
impl Iterator for Emission {
    type Item = Ray;

    fn next(&mut self) -> Option<Ray> {
        let template = self.template.as_ref()?;
        if self.next >= self.count {
            return None;
        }
        // position within [-0.5, 0.5], zero for a single ray
        let fraction = if self.count == 1 {
            0.0
        } else {
            self.next.to_f64().unwrap_or_default() / (self.count - 1).to_f64().unwrap_or(1.0) - 0.5
        };
        self.next += 1;
        let origin = template.origin() + self.tangent * (fraction * self.size);
        let direction = template.direction().rotate(fraction * self.divergence);
        Some(template.relocated(origin, direction))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.template.is_some() {
            self.count.saturating_sub(self.next)
        } else {
            0
        };
        (remaining, Some(remaining))
    }
}
impl ExactSizeIterator for Emission {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::components::{Component, ComponentKind};
    use approx::assert_abs_diff_eq;
    fn source(src: LaserSource, size: f64) -> Component {
        Component::new(
            ComponentAttr::new("laser", Vector2::new(1.0, 2.0), 0.0, size),
            ComponentKind::LaserSource(src),
        )
    }
    #[test]
    fn default() {
        let s = LaserSource::default();
        assert_eq!(s.wavelength(), nanometer!(632.8));
        assert_eq!(s.intensity(), 1.0);
        assert_eq!(s.ray_count(), 1);
    }
    #[test]
    fn single_ray() {
        let rays: Vec<Ray> = source(LaserSource::new(nanometer!(1053.0), 0.8), 10.0)
            .emit()
            .collect();
        assert_eq!(rays.len(), 1);
        assert_eq!(rays[0].origin(), Vector2::new(1.0, 2.0));
        assert_eq!(rays[0].direction(), Vector2::new(1.0, 0.0));
        assert_eq!(rays[0].intensity(), 0.8);
        assert_eq!(rays[0].wavelength(), nanometer!(1053.0));
    }
    #[test]
    fn collimated_beam() {
        let rays: Vec<Ray> = source(LaserSource::default().with_ray_count(5), 8.0)
            .emit()
            .collect();
        assert_eq!(rays.len(), 5);
        let ys: Vec<f64> = rays.iter().map(|r| r.origin().y).collect();
        for (y, expected) in ys.iter().zip([-2.0, 0.0, 2.0, 4.0, 6.0]) {
            assert_abs_diff_eq!(*y, expected, epsilon = 1e-12);
        }
        for ray in &rays {
            assert_eq!(ray.direction(), Vector2::new(1.0, 0.0));
            assert_eq!(ray.intensity(), 1.0);
        }
    }
    #[test]
    fn point_source_fan() {
        let rays = source(
            LaserSource::default()
                .with_ray_count(3)
                .with_divergence(1.0)
                .with_split_intensity(true)
                .with_polarization(Some(0.0)),
            0.0,
        )
        .emit()
        .collect::<Vec<_>>();
        assert_eq!(rays.len(), 3);
        assert_abs_diff_eq!(rays[0].direction().angle(), -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rays[2].direction().angle(), 0.5, epsilon = 1e-12);
        for ray in &rays {
            assert_eq!(ray.origin(), Vector2::new(1.0, 2.0));
            assert_abs_diff_eq!(ray.intensity(), 1.0 / 3.0);
            assert_eq!(ray.polarization(), Some(0.0));
        }
    }
    #[test]
    fn no_rays() {
        assert_eq!(
            source(LaserSource::default().with_ray_count(0), 1.0)
                .emit()
                .len(),
            0
        );
        assert_eq!(
            source(LaserSource::new(nanometer!(-1.0), 1.0), 1.0)
                .emit()
                .len(),
            0
        );
        assert_eq!(
            source(LaserSource::new(nanometer!(500.0), 2.0), 1.0)
                .emit()
                .len(),
            0
        );
        assert_eq!(source(LaserSource::default(), f64::INFINITY).emit().len(), 0);
    }
    #[test]
    fn huge_ray_count_is_lazy() {
        let mut rays = source(
            LaserSource::default()
                .with_ray_count(usize::MAX)
                .with_split_intensity(true),
            10.0,
        )
        .emit();
        assert_eq!(rays.len(), usize::MAX);
        assert!(rays.ray_intensity() > 0.0);
        let first = rays.next().unwrap();
        assert_abs_diff_eq!(first.origin().y, -3.0, epsilon = 1e-9);
        assert_eq!(rays.len(), usize::MAX - 1);
        assert_eq!(rays.by_ref().take(3).count(), 3);
        assert_eq!(rays.len(), usize::MAX - 4);
    }
    #[test]
    fn emission_wavelength() {
        let emission = source(LaserSource::default().with_ray_count(2), 1.0)
            .emit()
            .with_wavelength(nanometer!(1064.0))
            .unwrap();
        assert!(emission.map(|r| r.wavelength()).all(|w| w == nanometer!(1064.0)));
        assert!(source(LaserSource::default(), 1.0)
            .emit()
            .with_wavelength(nanometer!(0.0))
            .is_err());
        assert!(Emission::default().with_wavelength(nanometer!(0.0)).is_ok());
    }
}
