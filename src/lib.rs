//! This is the documentation for the **optrace** package, a two-dimensional geometric optics engine.
//!
//! A [`Scene`] holds an ordered list of optical [`components`] (sources, mirrors, thin lenses, beam splitters,
//! diffraction gratings, polarizers, fibers and stops) together with the settings of a trace pass. The
//! [`Tracer`] propagates the rays emitted by all sources through the scene and returns their paths for rendering.
//! Independently, [`LensImaging`](lens_imaging::LensImaging) analytically calculates the image formed by a single
//! thin lens and the principal rays of a lens diagram.
//!
//! ```rust
//! use optrace::components::{Component, ComponentAttr, ComponentKind, LaserSource, Mirror};
//! use optrace::vector2::Vector2;
//! use optrace::{Scene, Tracer};
//!
//! let mut scene = Scene::default();
//! scene.add_component(Component::new(
//!     ComponentAttr::new("laser", Vector2::zero(), 0.0, 1.0),
//!     ComponentKind::LaserSource(LaserSource::default()),
//! ));
//! scene.add_component(Component::new(
//!     ComponentAttr::new("mirror", Vector2::new(10.0, 0.0), 3.0 * std::f64::consts::FRAC_PI_4, 5.0),
//!     ComponentKind::Mirror(Mirror::default()),
//! ));
//! let outcome = Tracer::new(&scene).trace();
//! assert_eq!(outcome.paths.len(), 2);
//! ```
#![allow(clippy::module_name_repetitions)]
pub mod components;
pub mod console;
pub mod error;
pub mod lens_imaging;
pub mod ray;
pub mod ray_path;
pub mod scene;
pub mod surface;
pub mod trace_config;
pub mod tracer;
pub mod utils;
pub mod vector2;

pub use scene::Scene;
pub use tracer::Tracer;

/// Return the version information of the currently built optrace executable.
#[must_use]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_owned()
}
