#![warn(missing_docs)]
//! An ideal, lossless beam splitter
use serde::{Deserialize, Serialize};

use super::reflect;
use crate::{
    error::{OptResult, OptraceError},
    ray::Ray,
    surface::Hit,
};

/// An ideal beam splitter with a fixed splitting ratio.
///
/// Every incoming ray is split into a reflected ray carrying `ratio` of its intensity and a transmitted
/// (undeviated) ray carrying the remaining `1 - ratio`. No energy is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSplitter {
    ratio: f64,
}
impl Default for BeamSplitter {
    /// Create a 50:50 beam splitter.
    fn default() -> Self {
        Self { ratio: 0.5 }
    }
}
impl BeamSplitter {
    /// Creates a new [`BeamSplitter`] with the given (reflection) splitting ratio.
    ///
    /// # Errors
    /// This function returns an error if the ratio is outside the interval `[0.0, 1.0]`.
    pub fn new(ratio: f64) -> OptResult<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(OptraceError::Component(
                "splitting ratio must be within [0.0;1.0]".into(),
            ));
        }
        Ok(Self { ratio })
    }
    /// Returns the splitting ratio of this [`BeamSplitter`].
    #[must_use]
    pub const fn ratio(&self) -> f64 {
        self.ratio
    }
    /// Returns the ratio actually used: clamped into `[0.0, 1.0]`, `NaN` treated as full transmission.
    fn effective_ratio(&self) -> f64 {
        if self.ratio.is_nan() {
            0.0
        } else {
            self.ratio.clamp(0.0, 1.0)
        }
    }
    pub(super) fn interact(&self, ray: &Ray, hit: &Hit) -> Vec<Ray> {
        let ratio = self.effective_ratio();
        let reflected = ray.spawn(hit.point, reflect(ray.direction(), hit.normal), ratio);
        let transmitted = ray.spawn(hit.point, ray.direction(), 1.0 - ratio);
        vec![reflected, transmitted]
    }
}
