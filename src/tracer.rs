#![warn(missing_docs)]
//! The ray propagation engine
//!
//! A trace pass seeds the rays of all sources of a [`Scene`] and propagates them through the scene using an explicit
//! work queue. Each queued ray is intersected with all components, advanced to the nearest hit and handed to the
//! hit component which terminates it and possibly spawns new rays. Spawned rays are queued again unless one of the
//! budgets of the [`TraceConfig`] is exhausted.
use std::collections::VecDeque;

use log::{debug, info, warn};
use num::ToPrimitive;
use rayon::prelude::*;
use uom::si::{f64::Length, length::nanometer};

use crate::{
    components::InteractionContext,
    error::OptResult,
    ray::Ray,
    ray_path::{PathEnd, RayPath},
    scene::Scene,
    surface::Hit,
    trace_config::{TraceConfig, TraceMode},
    vector2::Vector2,
};

/// Counters collected during a trace pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TraceStatistics {
    /// number of rays emitted by the sources
    pub seeded: usize,
    /// sum of the intensities of all seeded rays
    pub seeded_intensity: f64,
    /// number of rays propagated (= number of recorded paths)
    pub traced: usize,
    /// number of rays that did not hit any component
    pub escaped: usize,
    /// sum of the intensities of all escaped rays
    pub escaped_intensity: f64,
    /// number of rays consumed by a component without spawning new rays
    pub absorbed: usize,
    /// number of rays dropped because of the intensity floor
    pub dropped_intensity: usize,
    /// number of rays dropped because their lineage exceeded the bounce limit
    pub dropped_bounces: usize,
    /// number of rays dropped because the ray budget of the pass was exhausted
    pub dropped_budget: usize,
}
impl TraceStatistics {
    /// Returns the total number of dropped rays.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped_intensity
            .saturating_add(self.dropped_bounces)
            .saturating_add(self.dropped_budget)
    }
    fn record_drops(&mut self, admission: Admission, count: usize) {
        let counter = match admission {
            Admission::Admit => return,
            Admission::BelowFloor => &mut self.dropped_intensity,
            Admission::BounceLimit => &mut self.dropped_bounces,
            Admission::BudgetExhausted => &mut self.dropped_budget,
        };
        *counter = counter.saturating_add(count);
    }
}

/// Decision of the admission control for a ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Admit,
    BelowFloor,
    BounceLimit,
    BudgetExhausted,
}

/// Result of a trace pass: the recorded ray paths and the statistics of the pass.
#[derive(Debug, Default, Clone)]
pub struct TraceOutcome {
    /// paths of all traced rays in the order of their propagation
    pub paths: Vec<RayPath>,
    /// counters of the pass
    pub statistics: TraceStatistics,
}

struct PendingRay {
    ray: Ray,
    parent: Option<usize>,
}

/// The propagation engine for a given [`Scene`].
///
/// The tracer only reads the scene. The diagnostic hit counters of the scene are the only state modified during a
/// pass. Hence, several passes (e.g. for different wavelengths) may run concurrently.
pub struct Tracer<'a> {
    scene: &'a Scene,
    config: &'a TraceConfig,
}
impl<'a> Tracer<'a> {
    /// Creates a new [`Tracer`] using the settings of the given [`Scene`].
    #[must_use]
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            config: scene.settings(),
        }
    }
    /// Creates a new [`Tracer`] for the given [`Scene`] using a separate [`TraceConfig`].
    #[must_use]
    pub const fn with_config(scene: &'a Scene, config: &'a TraceConfig) -> Self {
        Self { scene, config }
    }
    /// Returns the config used by this [`Tracer`].
    #[must_use]
    pub const fn config(&self) -> &TraceConfig {
        self.config
    }
    /// Find the nearest component hit by a ray with the given origin and direction.
    ///
    /// Returns the index of the component together with the hit. Hits at equal distances are resolved in favor of
    /// the component declared first.
    #[must_use]
    pub fn intersect_scene(&self, origin: Vector2, direction: Vector2) -> Option<(usize, Hit)> {
        let mut nearest: Option<(usize, Hit)> = None;
        for (idx, component) in self.scene.components().iter().enumerate() {
            let Some(hit) = component.intersect(origin, direction).into_iter().next() else {
                continue;
            };
            if nearest
                .as_ref()
                .map_or(true, |(_, best)| hit.distance < best.distance)
            {
                nearest = Some((idx, hit));
            }
        }
        nearest
    }
    /// Perform a full trace pass.
    ///
    /// A pass never fails: degenerate components degrade gracefully and budget exhaustion silently truncates the
    /// result. If the scene is configured for [`TraceMode::Wave`], no rays are traced.
    #[must_use]
    pub fn trace(&self) -> TraceOutcome {
        if self.config.mode() != TraceMode::RayTrace {
            warn!(
                "scene is configured for '{}' mode. Nothing to be done by the ray tracer.",
                self.config.mode()
            );
            return TraceOutcome::default();
        }
        match self.run(None) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("trace pass aborted: {e}");
                TraceOutcome::default()
            }
        }
    }
    /// Perform a trace pass with all source rays set to the given wavelength.
    ///
    /// # Errors
    ///
    /// This function will return an error if the wavelength is <= 0.0 or not finite.
    pub fn trace_wavelength(&self, wavelength: Length) -> OptResult<TraceOutcome> {
        if self.config.mode() != TraceMode::RayTrace {
            warn!(
                "scene is configured for '{}' mode. Nothing to be done by the ray tracer.",
                self.config.mode()
            );
            return Ok(TraceOutcome::default());
        }
        self.run(Some(wavelength))
    }
    /// Perform independent trace passes for all given wavelengths in parallel.
    ///
    /// The results are returned in the order of the given wavelengths.
    ///
    /// # Errors
    ///
    /// This function will return an error if any of the wavelengths is <= 0.0 or not finite.
    pub fn trace_spectrum(&self, wavelengths: &[Length]) -> OptResult<Vec<(Length, TraceOutcome)>> {
        wavelengths
            .par_iter()
            .map(|wavelength| {
                self.trace_wavelength(*wavelength)
                    .map(|outcome| (*wavelength, outcome))
            })
            .collect()
    }
    fn admission(&self, intensity: f64, bounces: usize, admitted: usize) -> Admission {
        if intensity <= 0.0 || intensity < self.config.min_intensity() {
            Admission::BelowFloor
        } else if bounces > self.config.max_bounces() {
            Admission::BounceLimit
        } else if admitted >= self.config.max_rays() {
            Admission::BudgetExhausted
        } else {
            Admission::Admit
        }
    }
    fn admit(
        &self,
        ray: Ray,
        parent: Option<usize>,
        queue: &mut VecDeque<PendingRay>,
        statistics: &mut TraceStatistics,
        admitted: &mut usize,
    ) {
        let admission = self.admission(ray.intensity(), ray.number_of_bounces(), *admitted);
        if admission == Admission::Admit {
            *admitted += 1;
            queue.push_back(PendingRay { ray, parent });
        } else {
            statistics.record_drops(admission, 1);
        }
    }
    /// Seed the queue with the rays of all sources in declaration order.
    ///
    /// All rays of a source share the same intensity. Once a source's rays are no longer admitted, the rest of its
    /// emission is counted as dropped without being generated.
    fn seed(
        &self,
        wavelength: Option<Length>,
        queue: &mut VecDeque<PendingRay>,
        statistics: &mut TraceStatistics,
        admitted: &mut usize,
    ) -> OptResult<()> {
        for component in self.scene.components() {
            let mut emission = component.emit();
            if let Some(wavelength) = wavelength {
                emission = emission.with_wavelength(wavelength)?;
            }
            let count = emission.len();
            statistics.seeded = statistics.seeded.saturating_add(count);
            statistics.seeded_intensity +=
                emission.ray_intensity() * count.to_f64().unwrap_or_default();
            while emission.len() > 0 {
                let admission = self.admission(emission.ray_intensity(), 0, *admitted);
                if admission != Admission::Admit {
                    statistics.record_drops(admission, emission.len());
                    break;
                }
                let Some(ray) = emission.next() else {
                    break;
                };
                self.admit(ray, None, queue, statistics, admitted);
            }
        }
        Ok(())
    }
    fn run(&self, wavelength: Option<Length>) -> OptResult<TraceOutcome> {
        let mut statistics = TraceStatistics::default();
        let mut paths: Vec<RayPath> = Vec::new();
        let mut queue = VecDeque::new();
        let mut admitted = 0;
        self.seed(wavelength, &mut queue, &mut statistics, &mut admitted)?;
        let components = self.scene.components();
        while let Some(PendingRay { mut ray, parent }) = queue.pop_front() {
            let path_index = paths.len();
            statistics.traced += 1;
            let nearest = self
                .intersect_scene(ray.origin(), ray.direction())
                .and_then(|(idx, hit)| components.get(idx).map(|c| (idx, c, hit)));
            if let Some((idx, component, hit)) = nearest {
                ray.advance(hit.distance);
                let ctx = InteractionContext {
                    component_index: idx,
                    counters: self.scene.counters(),
                };
                let spawned = component.interact(&mut ray, &hit, &ctx);
                if spawned.is_empty() {
                    statistics.absorbed += 1;
                }
                paths.push(RayPath::new(&ray, parent, PathEnd::Component(idx)));
                for child in spawned {
                    self.admit(
                        child,
                        Some(path_index),
                        &mut queue,
                        &mut statistics,
                        &mut admitted,
                    );
                }
            } else {
                ray.advance(self.config.escape_distance());
                ray.terminate();
                statistics.escaped += 1;
                statistics.escaped_intensity += ray.intensity();
                paths.push(RayPath::new(&ray, parent, PathEnd::Escaped));
            }
        }
        if statistics.dropped_budget > 0 {
            debug!(
                "ray budget of {} exhausted. {} rays dropped.",
                self.config.max_rays(),
                statistics.dropped_budget
            );
        }
        if statistics.dropped_bounces > 0 {
            debug!(
                "bounce limit of {} exceeded by {} rays.",
                self.config.max_bounces(),
                statistics.dropped_bounces
            );
        }
        let wavelength = paths
            .first()
            .map(|p| format!(" at {:.2} nm", p.wavelength().get::<nanometer>()))
            .unwrap_or_default();
        info!(
            "trace pass{wavelength}: {} rays seeded, {} traced, {} escaped, {} absorbed, {} dropped",
            statistics.seeded,
            statistics.traced,
            statistics.escaped,
            statistics.absorbed,
            statistics.dropped()
        );
        Ok(TraceOutcome { paths, statistics })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        components::{
            BeamSplitter, Component, ComponentAttr, ComponentKind, LaserSource, Mirror, OpticalFiber,
        },
        nanometer,
        utils::test_helper::test_helper::check_logs,
    };
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_4, PI};
    fn laser(intensity: f64) -> Component {
        Component::new(
            ComponentAttr::new("laser", Vector2::zero(), 0.0, 1.0),
            ComponentKind::LaserSource(LaserSource::new(nanometer!(1053.0), intensity)),
        )
    }
    fn component(name: &str, x: f64, y: f64, angle: f64, kind: ComponentKind) -> Component {
        Component::new(ComponentAttr::new(name, Vector2::new(x, y), angle, 10.0), kind)
    }
    #[test]
    fn empty_scene() {
        let scene = Scene::default();
        let outcome = Tracer::new(&scene).trace();
        assert!(outcome.paths.is_empty());
        assert_eq!(outcome.statistics, TraceStatistics::default());
    }
    #[test]
    fn escaping_ray() {
        let mut scene = Scene::default();
        scene.add_component(laser(1.0));
        let outcome = Tracer::new(&scene).trace();
        assert_eq!(outcome.paths.len(), 1);
        let path = &outcome.paths[0];
        assert!(path.terminated());
        assert_eq!(path.end(), PathEnd::Escaped);
        assert_eq!(path.points().len(), 2);
        assert_abs_diff_eq!(path.last_point().unwrap().x, 1e4);
        assert_eq!(outcome.statistics.escaped, 1);
        assert_eq!(outcome.statistics.traced, 1);
        assert_abs_diff_eq!(outcome.statistics.escaped_intensity, 1.0);
    }
    #[test]
    fn mirror_reflection() {
        let mut scene = Scene::default();
        scene.add_component(laser(1.0));
        scene.add_component(component(
            "m1",
            10.0,
            0.0,
            3.0 * FRAC_PI_4,
            ComponentKind::Mirror(Mirror::default()),
        ));
        let outcome = Tracer::new(&scene).trace();
        assert_eq!(outcome.paths.len(), 2);
        assert_eq!(outcome.paths[0].end(), PathEnd::Component(1));
        assert_abs_diff_eq!(outcome.paths[0].last_point().unwrap().x, 10.0, epsilon = 1e-9);
        assert_eq!(outcome.paths[1].parent(), Some(0));
        assert_eq!(outcome.paths[1].depth(), 1);
        let end = outcome.paths[1].last_point().unwrap();
        assert_abs_diff_eq!(end.x, 10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(end.y, 1e4, epsilon = 1e-6);
    }
    #[test]
    fn nearest_hit_wins() {
        let mut scene = Scene::default();
        scene.add_component(laser(1.0));
        scene.add_component(component("far", 20.0, 0.0, 0.0, ComponentKind::Blocker));
        scene.add_component(component("near", 10.0, 0.0, 0.0, ComponentKind::Blocker));
        let tracer = Tracer::new(&scene);
        let (idx, hit) = tracer
            .intersect_scene(Vector2::zero(), Vector2::new(1.0, 0.0))
            .unwrap();
        assert_eq!(idx, 2);
        assert_abs_diff_eq!(hit.distance, 10.0);
        let outcome = tracer.trace();
        assert_eq!(outcome.paths.len(), 1);
        assert_eq!(outcome.paths[0].end(), PathEnd::Component(2));
        assert_eq!(outcome.statistics.absorbed, 1);
    }
    #[test]
    fn ties_resolved_by_declaration_order() {
        let mut scene = Scene::default();
        scene.add_component(component("first", 10.0, 0.0, 0.0, ComponentKind::Blocker));
        scene.add_component(component("second", 10.0, 0.0, 0.0, ComponentKind::Blocker));
        let (idx, _) = Tracer::new(&scene)
            .intersect_scene(Vector2::zero(), Vector2::new(1.0, 0.0))
            .unwrap();
        assert_eq!(idx, 0);
    }
    #[test]
    fn splitter_energy_conserved() {
        let mut scene = Scene::default();
        scene.add_component(laser(1.0));
        scene.add_component(component(
            "bs",
            10.0,
            0.0,
            3.0 * FRAC_PI_4,
            ComponentKind::BeamSplitter(BeamSplitter::new(0.3).unwrap()),
        ));
        let outcome = Tracer::new(&scene).trace();
        assert_eq!(outcome.paths.len(), 3);
        assert_eq!(outcome.statistics.escaped, 2);
        assert_abs_diff_eq!(outcome.statistics.escaped_intensity, 1.0, epsilon = 1e-12);
    }
    #[test]
    fn mirror_cavity_terminates() {
        let mut scene = Scene::default();
        scene.add_component(Component::new(
            ComponentAttr::new("laser", Vector2::new(5.0, 0.0), 0.0, 1.0),
            ComponentKind::LaserSource(LaserSource::default()),
        ));
        scene.add_component(component("m1", 10.0, 0.0, PI, ComponentKind::Mirror(Mirror::default())));
        scene.add_component(component("m2", 0.0, 0.0, 0.0, ComponentKind::Mirror(Mirror::default())));
        scene.settings_mut().set_max_bounces(20);
        let outcome = Tracer::new(&scene).trace();
        assert_eq!(outcome.paths.len(), 21);
        assert_eq!(outcome.statistics.dropped_bounces, 1);
        assert!(outcome.paths.iter().all(RayPath::terminated));
    }
    #[test]
    fn ray_budget() {
        let mut scene = Scene::default();
        scene.add_component(Component::new(
            ComponentAttr::new("laser", Vector2::zero(), 0.0, 4.0),
            ComponentKind::LaserSource(LaserSource::default().with_ray_count(10)),
        ));
        scene.settings_mut().set_max_rays(4);
        let outcome = Tracer::new(&scene).trace();
        assert_eq!(outcome.paths.len(), 4);
        assert_eq!(outcome.statistics.seeded, 10);
        assert_eq!(outcome.statistics.dropped_budget, 6);
    }
    #[test]
    fn oversized_source_respects_budget() {
        let scene = Scene::from_yaml(
            "settings: {max_rays: 10}\ncomponents: [{type: laser_source, ray_count: 18446744073709551615}]",
        )
        .unwrap();
        let outcome = Tracer::new(&scene).trace();
        assert_eq!(outcome.paths.len(), 10);
        assert_eq!(outcome.statistics.seeded, usize::MAX);
        assert_eq!(outcome.statistics.dropped_budget, usize::MAX - 10);
        assert_eq!(outcome.statistics.dropped(), usize::MAX - 10);
    }
    #[test]
    fn dim_source_dropped_without_emission() {
        let mut scene = Scene::default();
        scene.add_component(Component::new(
            ComponentAttr::new("laser", Vector2::zero(), 0.0, 4.0),
            ComponentKind::LaserSource(
                LaserSource::default()
                    .with_ray_count(usize::MAX)
                    .with_split_intensity(true),
            ),
        ));
        scene.add_component(laser(1.0));
        let outcome = Tracer::new(&scene).trace();
        assert_eq!(outcome.paths.len(), 1);
        assert_eq!(outcome.statistics.dropped_intensity, usize::MAX);
        assert_eq!(outcome.statistics.seeded, usize::MAX);
    }
    #[test]
    fn intensity_floor() {
        let mut scene = Scene::default();
        scene.add_component(laser(1.0));
        scene.add_component(component(
            "bs",
            10.0,
            0.0,
            3.0 * FRAC_PI_4,
            ComponentKind::BeamSplitter(BeamSplitter::new(0.01).unwrap()),
        ));
        scene.settings_mut().set_min_intensity(0.05).unwrap();
        let outcome = Tracer::new(&scene).trace();
        assert_eq!(outcome.paths.len(), 2);
        assert_eq!(outcome.statistics.dropped_intensity, 1);
    }
    #[test]
    fn fiber_counter() {
        let mut scene = Scene::default();
        scene.add_component(laser(1.0));
        scene.add_component(component(
            "fiber",
            10.0,
            0.0,
            0.0,
            ComponentKind::OpticalFiber(OpticalFiber::default()),
        ));
        let outcome = Tracer::new(&scene).trace();
        assert_eq!(outcome.paths.len(), 2);
        assert_eq!(scene.counters().get(1), 1);
        assert_eq!(scene.fiber_hits(), vec![(1, "fiber", 1)]);
        assert_abs_diff_eq!(outcome.paths[1].points()[0].x, 110.0);
    }
    #[test]
    fn wave_mode() {
        testing_logger::setup();
        let mut scene = Scene::default();
        scene.add_component(laser(1.0));
        scene.settings_mut().set_mode(TraceMode::Wave);
        let outcome = Tracer::new(&scene).trace();
        assert!(outcome.paths.is_empty());
        check_logs(
            log::Level::Warn,
            vec!["scene is configured for 'wave' mode. Nothing to be done by the ray tracer."],
        );
    }
    #[test]
    fn spectrum() {
        let mut scene = Scene::default();
        scene.add_component(laser(1.0));
        scene.add_component(component(
            "fiber",
            10.0,
            0.0,
            0.0,
            ComponentKind::OpticalFiber(OpticalFiber::default()),
        ));
        let wavelengths = [nanometer!(500.0), nanometer!(600.0), nanometer!(700.0)];
        let results = Tracer::new(&scene).trace_spectrum(&wavelengths).unwrap();
        assert_eq!(results.len(), 3);
        for ((wavelength, outcome), expected) in results.iter().zip(wavelengths) {
            assert_eq!(*wavelength, expected);
            assert!(outcome.paths.iter().all(|p| p.wavelength() == expected));
        }
        assert_eq!(scene.counters().get(1), 3);
        assert!(Tracer::new(&scene)
            .trace_spectrum(&[nanometer!(0.0)])
            .is_err());
    }
    #[test]
    fn separate_config() {
        let mut scene = Scene::default();
        scene.add_component(laser(1.0));
        let mut config = TraceConfig::default();
        config.set_escape_distance(50.0).unwrap();
        let tracer = Tracer::with_config(&scene, &config);
        assert_eq!(tracer.config().escape_distance(), 50.0);
        let outcome = tracer.trace();
        assert_abs_diff_eq!(outcome.paths[0].last_point().unwrap().x, 50.0);
    }
}
