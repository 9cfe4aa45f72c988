#![warn(missing_docs)]
//! Settings of a ray propagation pass
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::{OptResult, OptraceError};

/// Simulation mode requested by the surrounding application.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TraceMode {
    #[default]
    /// Geometric ray propagation. This is the only mode handled by the [`Tracer`](crate::tracer::Tracer).
    RayTrace,
    /// Wave optics rendering. Not handled by this crate; a ray tracing pass in this mode yields no paths.
    Wave,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
/// Configuration data of a ray propagation pass.
///
/// The config contains the following info
///   - simulation mode (see [`TraceMode`])
///   - maximum number of rays admitted per pass
///   - maximum number of bounces (interactions) per ray lineage
///   - minimum (relative) intensity of a ray
///   - distance an escaping ray is propagated before it is terminated
pub struct TraceConfig {
    mode: TraceMode,
    max_rays: usize,
    max_bounces: usize,
    min_intensity: f64,
    escape_distance: f64,
}
impl Default for TraceConfig {
    /// Create a default config with the following parameters:
    ///   - mode: [`TraceMode::RayTrace`]
    ///   - maximum number of rays: `10000`
    ///   - maximum number of bounces / ray: `200`
    ///   - mininum intensity / ray: `1e-3`
    ///   - escape distance: `1e4`
    fn default() -> Self {
        Self {
            mode: TraceMode::default(),
            max_rays: 10_000,
            max_bounces: 200,
            min_intensity: 1e-3,
            escape_distance: 1e4,
        }
    }
}
impl TraceConfig {
    /// Returns the simulation mode of this config.
    #[must_use]
    pub const fn mode(&self) -> TraceMode {
        self.mode
    }
    /// Sets the simulation mode.
    pub fn set_mode(&mut self, mode: TraceMode) {
        self.mode = mode;
    }
    /// Returns the maximum number of rays admitted during one pass.
    #[must_use]
    pub const fn max_rays(&self) -> usize {
        self.max_rays
    }
    /// Sets the maximum number of rays admitted during one pass. Further rays are silently dropped.
    pub fn set_max_rays(&mut self, max_rays: usize) {
        self.max_rays = max_rays;
    }
    /// Returns the maximum number of bounces of a ray lineage.
    #[must_use]
    pub const fn max_bounces(&self) -> usize {
        self.max_bounces
    }
    /// Sets the maximum number of bounces of a ray lineage.
    pub fn set_max_bounces(&mut self, max_bounces: usize) {
        self.max_bounces = max_bounces;
    }
    /// Returns the lower intensity limit. Rays with intensities below this limit are dropped.
    #[must_use]
    pub const fn min_intensity(&self) -> f64 {
        self.min_intensity
    }
    /// Sets the lower intensity limit. Rays with intensities below this limit are dropped.
    ///
    /// # Errors
    ///
    /// This function will return an error if the given limit is negative or not finite.
    pub fn set_min_intensity(&mut self, min_intensity: f64) -> OptResult<()> {
        if !min_intensity.is_finite() || min_intensity.is_sign_negative() {
            return Err(OptraceError::Config(
                "minimum intensity must be >=0.0 and finite".into(),
            ));
        }
        self.min_intensity = min_intensity;
        Ok(())
    }
    /// Returns the distance an escaping ray is propagated before it is terminated.
    #[must_use]
    pub const fn escape_distance(&self) -> f64 {
        self.escape_distance
    }
    /// Sets the distance an escaping ray is propagated before it is terminated.
    ///
    /// # Errors
    ///
    /// This function will return an error if the given distance is <= 0.0 or not finite.
    pub fn set_escape_distance(&mut self, escape_distance: f64) -> OptResult<()> {
        if !escape_distance.is_finite() || escape_distance <= 0.0 {
            return Err(OptraceError::Config(
                "escape distance must be >0.0 and finite".into(),
            ));
        }
        self.escape_distance = escape_distance;
        Ok(())
    }
    /// Validate a (deserialized) config.
    ///
    /// # Errors
    ///
    /// This function will return an error if the minimum intensity or the escape distance is invalid.
    pub fn validate(&self) -> OptResult<()> {
        let mut check = Self::default();
        check.set_min_intensity(self.min_intensity)?;
        check.set_escape_distance(self.escape_distance)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    #[test]
    fn trace_mode_default() {
        assert_matches!(TraceMode::default(), TraceMode::RayTrace);
    }
    #[test]
    fn trace_mode_display() {
        assert_eq!(TraceMode::RayTrace.to_string(), "ray_trace");
        assert_eq!(TraceMode::Wave.to_string(), "wave");
    }
    #[test]
    fn trace_mode_serde() {
        let mode: TraceMode = serde_yaml::from_str("wave").unwrap();
        assert_eq!(mode, TraceMode::Wave);
        let mode: TraceMode = serde_yaml::from_str("ray_trace").unwrap();
        assert_eq!(mode, TraceMode::RayTrace);
        assert!(serde_yaml::from_str::<TraceMode>("fourier").is_err());
    }
    #[test]
    fn default() {
        let conf = TraceConfig::default();
        assert_matches!(conf.mode(), TraceMode::RayTrace);
        assert_eq!(conf.max_rays(), 10_000);
        assert_eq!(conf.max_bounces(), 200);
        assert_eq!(conf.min_intensity(), 1e-3);
        assert_eq!(conf.escape_distance(), 1e4);
    }
    #[test]
    fn set_min_intensity() {
        let mut conf = TraceConfig::default();
        assert!(conf.set_min_intensity(-0.1).is_err());
        assert!(conf.set_min_intensity(f64::NAN).is_err());
        assert!(conf.set_min_intensity(f64::INFINITY).is_err());
        assert!(conf.set_min_intensity(0.0).is_ok());
        assert!(conf.set_min_intensity(0.2).is_ok());
        assert_eq!(conf.min_intensity, 0.2);
    }
    #[test]
    fn set_escape_distance() {
        let mut conf = TraceConfig::default();
        assert!(conf.set_escape_distance(0.0).is_err());
        assert!(conf.set_escape_distance(-1.0).is_err());
        assert!(conf.set_escape_distance(f64::INFINITY).is_err());
        assert!(conf.set_escape_distance(500.0).is_ok());
        assert_eq!(conf.escape_distance(), 500.0);
    }
    #[test]
    fn setters() {
        let mut conf = TraceConfig::default();
        conf.set_max_rays(12);
        conf.set_max_bounces(34);
        conf.set_mode(TraceMode::Wave);
        assert_eq!(conf.max_rays, 12);
        assert_eq!(conf.max_bounces, 34);
        assert_eq!(conf.mode, TraceMode::Wave);
    }
    #[test]
    fn deserialize_partial() {
        let conf: TraceConfig = serde_yaml::from_str("max_rays: 50\nmode: wave\n").unwrap();
        assert_eq!(conf.max_rays(), 50);
        assert_eq!(conf.mode(), TraceMode::Wave);
        assert_eq!(conf.max_bounces(), 200);
        assert!(conf.validate().is_ok());
        let conf: TraceConfig = serde_yaml::from_str("min_intensity: -1.0").unwrap();
        assert!(conf.validate().is_err());
    }
}
