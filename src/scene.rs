#![warn(missing_docs)]
//! The scene: an ordered list of optical components plus the trace settings
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::{
    components::{Component, ComponentKind},
    error::{OptResult, OptraceError},
    trace_config::TraceConfig,
};

/// Per-component diagnostic hit counters.
///
/// The counters are indexed by the component index within the [`Scene`]. They are only incremented during a
/// trace pass and can be shared between concurrent passes.
#[derive(Debug, Default)]
pub struct HitCounters {
    counts: Vec<AtomicUsize>,
}
impl HitCounters {
    /// Creates `size` counters, all set to zero.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            counts: (0..size).map(|_| AtomicUsize::new(0)).collect(),
        }
    }
    /// Increment the counter of the component with the given index. Indices out of range are ignored.
    pub fn increment(&self, index: usize) {
        if let Some(count) = self.counts.get(index) {
            count.fetch_add(1, Ordering::Relaxed);
        }
    }
    /// Returns the current count of the component with the given index (0 if out of range).
    #[must_use]
    pub fn get(&self, index: usize) -> usize {
        self.counts
            .get(index)
            .map_or(0, |count| count.load(Ordering::Relaxed))
    }
    /// Reset all counters to zero.
    pub fn reset(&self) {
        for count in &self.counts {
            count.store(0, Ordering::Relaxed);
        }
    }
    /// Returns the number of counters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }
    /// Returns `true` if there are no counters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
    fn resize(&mut self, size: usize) {
        self.counts.resize_with(size, || AtomicUsize::new(0));
    }
}
impl Clone for HitCounters {
    fn clone(&self) -> Self {
        Self {
            counts: self
                .counts
                .iter()
                .map(|c| AtomicUsize::new(c.load(Ordering::Relaxed)))
                .collect(),
        }
    }
}

/// An ordered collection of optical [`Component`]s together with the [`TraceConfig`] of the scene.
///
/// The component order matters: hits at equal distances are resolved in declaration order.
///
/// Deserialization validates the settings and sets up one hit counter per component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "SceneDocument")]
pub struct Scene {
    components: Vec<Component>,
    settings: TraceConfig,
    #[serde(skip)]
    counters: HitCounters,
}

/// Serialized form of a [`Scene`].
#[derive(Deserialize)]
struct SceneDocument {
    #[serde(default)]
    components: Vec<Component>,
    #[serde(default)]
    settings: TraceConfig,
}
impl TryFrom<SceneDocument> for Scene {
    type Error = OptraceError;

    fn try_from(document: SceneDocument) -> OptResult<Self> {
        document.settings.validate()?;
        Ok(Self {
            counters: HitCounters::new(document.components.len()),
            components: document.components,
            settings: document.settings,
        })
    }
}
impl Scene {
    /// Creates a new (empty) [`Scene`] with the given settings.
    #[must_use]
    pub fn new(settings: TraceConfig) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }
    /// Create a [`Scene`] from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the given path is not found or readable.
    ///   - the parsing of the file failed or the settings are invalid.
    pub fn from_file(path: &Path) -> OptResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            OptraceError::Scene(format!("cannot read file {} : {}", path.display(), e))
        })?;
        Self::from_yaml(&contents)
    }
    /// Create a [`Scene`] from the given YAML string.
    ///
    /// # Errors
    ///
    /// This function will return an error if the parsing failed or the settings are invalid.
    pub fn from_yaml(yaml: &str) -> OptResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| OptraceError::Scene(format!("parsing of scene failed: {e}")))
    }
    /// Return the YAML representation of this [`Scene`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the serialization fails.
    pub fn to_yaml(&self) -> OptResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| OptraceError::Scene(format!("serialization of scene failed: {e}")))
    }
    /// Save this [`Scene`] as YAML file to the given path.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the serialization of the scene failed.
    ///   - the file cannot be created or written.
    pub fn save_to_file(&self, path: &Path) -> OptResult<()> {
        let serialized = self.to_yaml()?;
        let mut output = File::create(path).map_err(|e| {
            OptraceError::Scene(format!(
                "could not create file path: {}: {}",
                path.display(),
                e
            ))
        })?;
        write!(output, "{serialized}").map_err(|e| {
            OptraceError::Scene(format!(
                "writing to file path {} failed: {}",
                path.display(),
                e
            ))
        })
    }
    /// Add a [`Component`] to this [`Scene`] and return its index.
    pub fn add_component(&mut self, component: Component) -> usize {
        self.components.push(component);
        self.counters.resize(self.components.len());
        self.components.len() - 1
    }
    /// Returns the components of this [`Scene`] in declaration order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }
    /// Returns the [`Component`] with the given index.
    ///
    /// # Errors
    ///
    /// This function will return an error if the index is out of range.
    pub fn component(&self, index: usize) -> OptResult<&Component> {
        self.components
            .get(index)
            .ok_or_else(|| OptraceError::Scene(format!("component index {index} out of range")))
    }
    /// Returns a mutable reference to the [`Component`] with the given index.
    ///
    /// # Errors
    ///
    /// This function will return an error if the index is out of range.
    pub fn component_mut(&mut self, index: usize) -> OptResult<&mut Component> {
        self.components
            .get_mut(index)
            .ok_or_else(|| OptraceError::Scene(format!("component index {index} out of range")))
    }
    /// Returns the index of the first component with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name() == name)
    }
    /// Returns the trace settings of this [`Scene`].
    #[must_use]
    pub const fn settings(&self) -> &TraceConfig {
        &self.settings
    }
    /// Returns a mutable reference to the trace settings of this [`Scene`].
    pub fn settings_mut(&mut self) -> &mut TraceConfig {
        &mut self.settings
    }
    /// Returns the diagnostic hit counters of this [`Scene`].
    #[must_use]
    pub const fn counters(&self) -> &HitCounters {
        &self.counters
    }
    /// Returns the number of input face hits of all fibers as `(index, name, count)`.
    #[must_use]
    pub fn fiber_hits(&self) -> Vec<(usize, &str, usize)> {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c.kind(), ComponentKind::OpticalFiber(_)))
            .map(|(i, c)| (i, c.name(), self.counters.get(i)))
            .collect()
    }
}
