#![warn(missing_docs)]
//! This module contains the concrete optical components (mirrors, lenses, beam splitters, etc...)
//!
//! All components share a set of common attributes ([`ComponentAttr`]) and carry their variant specific
//! parameters in [`ComponentKind`]. Intersection and interaction are dispatched over this closed enum.
//!
//! # Orientation convention
//!
//! The `angle` of a component denotes the direction of its optical axis (measured counter-clockwise from the
//! positive x axis). Surfaces of components extend perpendicular to this axis, `size / 2` to both sides of the
//! component position. Sources emit along their axis.
mod beam_splitter;
mod diffraction_grating;
mod laser_source;
mod mirror;
mod optical_fiber;
mod polarizer;
mod thin_lens;

pub use beam_splitter::BeamSplitter;
pub use diffraction_grating::DiffractionGrating;
pub use laser_source::{Emission, LaserSource};
pub use mirror::Mirror;
pub use optical_fiber::OpticalFiber;
pub use polarizer::Polarizer;
pub use thin_lens::ThinLens;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{
    ray::Ray,
    scene::HitCounters,
    surface::{FlatSurface, GeoSurface, Hit},
    vector2::Vector2,
};

/// Attributes common to all optical components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentAttr {
    /// name of the component (for logging and reports)
    pub name: String,
    /// position of the component center
    pub position: Vector2,
    /// direction of the optical axis in radians
    pub angle: f64,
    /// extent (aperture) of the component perpendicular to its axis
    pub size: f64,
    /// selection flag. Only used for choosing source and lens for lens imaging.
    pub selected: bool,
}
impl Default for ComponentAttr {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vector2::zero(),
            angle: 0.0,
            size: 10.0,
            selected: false,
        }
    }
}
impl ComponentAttr {
    /// Creates new [`ComponentAttr`] with the given name, position, axis angle and size.
    #[must_use]
    pub fn new(name: &str, position: Vector2, angle: f64, size: f64) -> Self {
        Self {
            name: name.to_owned(),
            position,
            angle,
            size,
            selected: false,
        }
    }
    /// Returns the unit vector of the optical axis.
    #[must_use]
    pub fn axis(&self) -> Vector2 {
        Vector2::from_angle(self.angle)
    }
    /// Returns the unit tangent (the axis rotated by +90°).
    #[must_use]
    pub fn tangent(&self) -> Vector2 {
        self.axis().perpendicular()
    }
    /// Returns the flat surface of the component (perpendicular to the axis, with length `size`).
    #[must_use]
    pub fn flat_surface(&self) -> FlatSurface {
        FlatSurface::new(self.position, self.axis(), self.size)
    }
}

/// The variant specific part of an optical component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display, EnumIter)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentKind {
    /// a laser source emitting one or more rays
    #[strum(serialize = "laser source")]
    LaserSource(LaserSource),
    /// a flat or curved mirror
    #[strum(serialize = "mirror")]
    Mirror(Mirror),
    /// an ideal thin lens
    #[strum(serialize = "thin lens")]
    ThinLens(ThinLens),
    /// a (lossless) beam splitter
    #[strum(serialize = "beam splitter")]
    BeamSplitter(BeamSplitter),
    /// a diffraction grating
    #[strum(serialize = "diffraction grating")]
    DiffractionGrating(DiffractionGrating),
    /// a linear polarizer
    #[strum(serialize = "polarizer")]
    Polarizer(Polarizer),
    /// an optical fiber with an input and an output face
    #[strum(serialize = "optical fiber")]
    OpticalFiber(OpticalFiber),
    /// an opaque stop absorbing every ray
    #[strum(serialize = "blocker")]
    Blocker,
}

/// Context handed to [`Component::interact`].
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext<'a> {
    /// index of the interacting component within the scene
    pub component_index: usize,
    /// diagnostic hit counters of the scene
    pub counters: &'a HitCounters,
}

/// An optical component placed in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(flatten)]
    attr: ComponentAttr,
    #[serde(flatten)]
    kind: ComponentKind,
}
impl Component {
    /// Creates a new [`Component`].
    #[must_use]
    pub const fn new(attr: ComponentAttr, kind: ComponentKind) -> Self {
        Self { attr, kind }
    }
    /// Returns the common attributes of this [`Component`].
    #[must_use]
    pub const fn attr(&self) -> &ComponentAttr {
        &self.attr
    }
    /// Returns a mutable reference to the common attributes of this [`Component`].
    pub fn attr_mut(&mut self) -> &mut ComponentAttr {
        &mut self.attr
    }
    /// Returns the variant specific part of this [`Component`].
    #[must_use]
    pub const fn kind(&self) -> &ComponentKind {
        &self.kind
    }
    /// Returns the name of this [`Component`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.attr.name
    }
    /// Modifies the selection flag. This function can be used with the "builder pattern".
    #[must_use]
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.attr.selected = selected;
        self
    }
    /// Returns `true` if this component emits rays.
    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(self.kind, ComponentKind::LaserSource(_))
    }
    /// Returns the rays initially emitted by this component. Non-source components emit no rays.
    #[must_use]
    pub fn emit(&self) -> Emission {
        match &self.kind {
            ComponentKind::LaserSource(source) => source.emit(&self.attr),
            _ => Emission::default(),
        }
    }
    /// Intersect a ray given by its `origin` and `direction` with this component.
    ///
    /// The hits are returned sorted by ascending distance. Sources are not intersectable.
    #[must_use]
    pub fn intersect(&self, origin: Vector2, direction: Vector2) -> Vec<Hit> {
        let direction = direction.normalize();
        if direction.magnitude_squared() == 0.0 || !origin.is_finite() {
            return Vec::new();
        }
        match &self.kind {
            ComponentKind::LaserSource(_) => Vec::new(),
            ComponentKind::Mirror(mirror) => mirror.surface(&self.attr).intersect(origin, direction),
            ComponentKind::OpticalFiber(fiber) => {
                fiber.input_face(&self.attr).intersect(origin, direction)
            }
            ComponentKind::ThinLens(_)
            | ComponentKind::BeamSplitter(_)
            | ComponentKind::DiffractionGrating(_)
            | ComponentKind::Polarizer(_)
            | ComponentKind::Blocker => self.attr.flat_surface().intersect(origin, direction),
        }
    }
    /// Let a ray interact with this component at the given hit.
    ///
    /// The incoming ray is always terminated. The returned vector contains the spawned rays. It is empty for
    /// fully absorbing interactions.
    pub fn interact(&self, ray: &mut Ray, hit: &Hit, ctx: &InteractionContext<'_>) -> Vec<Ray> {
        let spawned = match &self.kind {
            ComponentKind::LaserSource(_) | ComponentKind::Blocker => Vec::new(),
            ComponentKind::Mirror(mirror) => mirror.interact(ray, hit),
            ComponentKind::ThinLens(lens) => lens.interact(&self.attr, ray, hit),
            ComponentKind::BeamSplitter(splitter) => splitter.interact(ray, hit),
            ComponentKind::DiffractionGrating(grating) => grating.interact(&self.attr, ray, hit),
            ComponentKind::Polarizer(polarizer) => polarizer.interact(ray, hit),
            ComponentKind::OpticalFiber(fiber) => fiber.interact(&self.attr, ray, hit, ctx),
        };
        ray.terminate();
        spawned
    }
}

/// Reflect a direction vector on a surface with the given normal: `d' = d - 2(d·n)n`.
#[must_use]
pub fn reflect(direction: Vector2, normal: Vector2) -> Vector2 {
    let normal = normal.normalize();
    (direction - normal * (2.0 * direction.dot(normal))).normalize()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{nanometer, surface::Face};
    use approx::assert_abs_diff_eq;
    use strum::IntoEnumIterator;
    fn ray_along_x(y: f64) -> Ray {
        Ray::new(
            Vector2::new(0.0, y),
            Vector2::new(1.0, 0.0),
            nanometer!(633.0),
            1.0,
        )
        .unwrap()
    }
    #[test]
    fn attr_default() {
        let attr = ComponentAttr::default();
        assert_eq!(attr.name, "");
        assert_eq!(attr.position, Vector2::zero());
        assert_eq!(attr.angle, 0.0);
        assert_eq!(attr.size, 10.0);
        assert!(!attr.selected);
        assert_eq!(attr.axis(), Vector2::new(1.0, 0.0));
    }
    #[test]
    fn kind_display() {
        let names: Vec<String> = ComponentKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "laser source",
                "mirror",
                "thin lens",
                "beam splitter",
                "diffraction grating",
                "polarizer",
                "optical fiber",
                "blocker"
            ]
        );
    }
    #[test]
    fn reflect_on_normal() {
        let d = reflect(Vector2::new(1.0, -1.0), Vector2::new(0.0, 1.0));
        assert_abs_diff_eq!(d.x, 1.0 / 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(d.y, 1.0 / 2.0_f64.sqrt(), epsilon = 1e-12);
    }
    #[test]
    fn source_not_intersectable() {
        let c = Component::new(
            ComponentAttr::new("src", Vector2::new(5.0, 0.0), 0.0, 10.0),
            ComponentKind::LaserSource(LaserSource::default()),
        );
        assert!(c.is_source());
        assert!(c.intersect(Vector2::zero(), Vector2::new(1.0, 0.0)).is_empty());
        assert_eq!(c.emit().len(), 1);
    }
    #[test]
    fn intersect_degenerate_direction() {
        let c = Component::new(
            ComponentAttr::new("stop", Vector2::new(5.0, 0.0), 0.0, 10.0),
            ComponentKind::Blocker,
        );
        assert!(c.intersect(Vector2::zero(), Vector2::zero()).is_empty());
        assert!(c
            .intersect(Vector2::new(f64::NAN, 0.0), Vector2::new(1.0, 0.0))
            .is_empty());
    }
    #[test]
    fn blocker_absorbs() {
        let c = Component::new(
            ComponentAttr::new("stop", Vector2::new(5.0, 0.0), 0.0, 10.0),
            ComponentKind::Blocker,
        );
        assert!(!c.is_source());
        assert_eq!(c.emit().len(), 0);
        let mut ray = ray_along_x(1.0);
        let hits = c.intersect(ray.origin(), ray.direction());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].context.face, Face::Front);
        let counters = HitCounters::new(1);
        let ctx = InteractionContext {
            component_index: 0,
            counters: &counters,
        };
        assert!(c.interact(&mut ray, &hits[0], &ctx).is_empty());
        assert!(ray.terminated());
    }
    #[test]
    fn serde_yaml_round_trip() {
        let c = Component::new(
            ComponentAttr::new("m1", Vector2::new(1.0, 2.0), 0.5, 3.0),
            ComponentKind::Mirror(Mirror::default()),
        )
        .with_selected(true);
        let yaml = serde_yaml::to_string(&c).unwrap();
        assert!(yaml.contains("type: mirror"));
        let back: Component = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, c);
    }
    #[test]
    fn deserialize_blocker_with_defaults() {
        let c: Component = serde_yaml::from_str("type: blocker\nname: stop\n").unwrap();
        assert_eq!(c.name(), "stop");
        assert_eq!(c.kind(), &ComponentKind::Blocker);
        assert_eq!(c.attr().size, 10.0);
    }
}
