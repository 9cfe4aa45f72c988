#![warn(missing_docs)]
//! An infinitely thin diffraction grating
use std::collections::BTreeMap;

use log::warn;
use num::ToPrimitive;
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use super::ComponentAttr;
use crate::{
    error::{OptResult, OptraceError},
    micrometer,
    ray::Ray,
    surface::Hit,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// An infinitely thin (transmissive or reflective) diffraction grating.
///
/// For every order `m` within the configured range, the diffraction angle is given by the grating equation
/// `d (sin θ_m - sin θ_i) = m λ` where the angles are measured against the grating normal. Orders with
/// `|sin θ_m| > 1` are evanescent and not emitted. The zero order is always part of the range.
///
/// Each order carries a weight (fraction of the incoming intensity). Without explicit weights the intensity is
/// distributed evenly over all orders of the range. Weights summing up to more than 1.0 are normalized.
pub struct DiffractionGrating {
    period: Length,
    min_order: i32,
    max_order: i32,
    order_weights: BTreeMap<i32, f64>,
    reflective: bool,
}
impl Default for DiffractionGrating {
    /// Create a transmission grating with a period of 1 µm diffracting into the orders -1, 0, and 1.
    fn default() -> Self {
        Self {
            period: micrometer!(1.0),
            min_order: -1,
            max_order: 1,
            order_weights: BTreeMap::new(),
            reflective: false,
        }
    }
}
impl DiffractionGrating {
    /// Creates a new transmission [`DiffractionGrating`].
    ///
    /// # Errors
    /// This function returns an error if
    ///  - the period is <= 0.0 or not finite
    ///  - `min_order` is larger than `max_order`
    pub fn new(period: Length, min_order: i32, max_order: i32) -> OptResult<Self> {
        if !period.is_finite() || period.value <= 0.0 {
            return Err(OptraceError::Component(
                "grating period must be >0.0 and finite".into(),
            ));
        }
        if min_order > max_order {
            return Err(OptraceError::Component(
                "minimum diffraction order must not exceed maximum order".into(),
            ));
        }
        Ok(Self {
            period,
            min_order,
            max_order,
            ..Self::default()
        })
    }
    /// Set the intensity weights of individual orders. Orders missing in the map are not emitted.
    ///
    /// # Errors
    /// This function returns an error if a weight is negative or not finite.
    pub fn with_order_weights(mut self, weights: BTreeMap<i32, f64>) -> OptResult<Self> {
        if weights.values().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(OptraceError::Component(
                "order weights must be >=0.0 and finite".into(),
            ));
        }
        self.order_weights = weights;
        Ok(self)
    }
    /// Make this grating reflective (or transmissive). This function can be used with the "builder pattern".
    #[must_use]
    pub const fn with_reflective(mut self, reflective: bool) -> Self {
        self.reflective = reflective;
        self
    }
    /// Returns the grating period.
    #[must_use]
    pub const fn period(&self) -> Length {
        self.period
    }
    /// Returns the configured range of diffraction orders, extended to contain the zero order.
    #[must_use]
    pub fn order_range(&self) -> (i32, i32) {
        (self.min_order.min(0), self.max_order.max(0))
    }
    /// Returns `true` for a reflective grating.
    #[must_use]
    pub const fn is_reflective(&self) -> bool {
        self.reflective
    }
    /// Returns the (normalized) intensity weights of the orders which can propagate at the given wavelength for
    /// some angle of incidence (`|m| <= 2 d / λ`).
    ///
    /// The normalization always refers to the full configured range.
    #[must_use]
    pub fn weights(&self, wavelength: Length) -> Vec<(i32, f64)> {
        let ratio = (wavelength / self.period).value;
        if !ratio.is_finite() || ratio <= 0.0 {
            return self.weights_within(0, 0);
        }
        let max_realizable = clamp_order((2.0 / ratio).floor());
        self.weights_within(-max_realizable, max_realizable)
    }
    /// Weights of the orders of the configured range lying within `[lo, hi]`.
    fn weights_within(&self, lo: i32, hi: i32) -> Vec<(i32, f64)> {
        let (min, max) = self.order_range();
        let (lo, hi) = (lo.max(min), hi.min(max));
        if lo > hi {
            return Vec::new();
        }
        if self.order_weights.is_empty() {
            let count = (i64::from(max) - i64::from(min) + 1)
                .to_f64()
                .unwrap_or(1.0);
            return (lo..=hi).map(|m| (m, 1.0 / count)).collect();
        }
        let sanitize = |w: f64| if w.is_finite() { w.max(0.0) } else { 0.0 };
        let total: f64 = self
            .order_weights
            .range(min..=max)
            .map(|(_, w)| sanitize(*w))
            .sum();
        let scale = if total > 1.0 { total.recip() } else { 1.0 };
        self.order_weights
            .range(lo..=hi)
            .map(|(m, w)| (*m, sanitize(*w) * scale))
            .collect()
    }
    pub(super) fn interact(&self, attr: &ComponentAttr, ray: &Ray, hit: &Hit) -> Vec<Ray> {
        let tangent = attr.tangent();
        let axis = attr.axis();
        let direction = ray.direction();
        let side = if direction.dot(axis) < 0.0 { -1.0 } else { 1.0 };
        let out_axis = if self.reflective {
            axis * -side
        } else {
            axis * side
        };
        let sin_incidence = direction.dot(tangent);
        let ratio = (ray.wavelength() / self.period).value;
        if !ratio.is_finite() || self.period.value <= 0.0 {
            warn!(
                "grating '{}' has no usable period. Only the zero order is propagated.",
                attr.name
            );
            let zero_dir = tangent * sin_incidence + out_axis * direction.dot(axis).abs();
            return vec![ray.spawn(hit.point, zero_dir, 1.0)];
        }
        // only orders with |sin θ_m| <= 1 propagate
        let lo = clamp_order(((-1.0 - sin_incidence) / ratio).ceil());
        let hi = clamp_order(((1.0 - sin_incidence) / ratio).floor());
        self.weights_within(lo, hi)
            .into_iter()
            .filter(|(_, w)| *w > 0.0)
            .filter_map(|(m, w)| {
                let sin_diffracted = f64::from(m).mul_add(ratio, sin_incidence);
                if sin_diffracted.abs() > 1.0 {
                    return None;
                }
                let cos_diffracted = sin_diffracted.mul_add(-sin_diffracted, 1.0).sqrt();
                let new_direction = tangent * sin_diffracted + out_axis * cos_diffracted;
                Some(ray.spawn(hit.point, new_direction, w))
            })
            .collect()
    }
}

/// Convert a (possibly huge) order number into the `i32` domain.
fn clamp_order(order: f64) -> i32 {
    order
        .clamp(f64::from(i32::MIN), f64::from(i32::MAX))
        .to_i32()
        .unwrap_or(0)
}
