//! Explicit detector registry, populated at startup.

use drift_core::types::collections::FxHashMap;
use drift_core::types::pattern::PatternCategory;

use super::catalog;
use super::traits::Detector;
use crate::scanner::Language;

/// Registry keyed by detector id, with a `(language, category)` index.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
    by_id: FxHashMap<String, usize>,
    disabled: drift_core::types::collections::FxHashSet<String>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            by_id: FxHashMap::default(),
            disabled: Default::default(),
        }
    }

    /// Registry with the full built-in catalog.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for detector in catalog::all() {
            registry.register(detector);
        }
        registry
    }

    pub fn register(&mut self, detector: Box<dyn Detector>) {
        let id = detector.id().to_string();
        let idx = self.detectors.len();
        if self.by_id.insert(id.clone(), idx).is_some() {
            tracing::warn!(detector = %id, "duplicate detector id; later registration wins");
        }
        self.detectors.push(detector);
    }

    pub fn get(&self, id: &str) -> Option<&dyn Detector> {
        self.by_id.get(id).map(|&idx| self.detectors[idx].as_ref())
    }

    pub fn disable(&mut self, id: &str) {
        self.disabled.insert(id.to_string());
    }

    pub fn enable(&mut self, id: &str) {
        self.disabled.remove(id);
    }

    /// Detectors applicable to a language, in registration order.
    pub fn for_language(&self, language: Language) -> Vec<&dyn Detector> {
        self.detectors
            .iter()
            .filter(|d| !self.disabled.contains(d.id()) && d.supports(language))
            .map(|d| d.as_ref())
            .collect()
    }

    /// Detectors in a category.
    pub fn for_category(&self, category: PatternCategory) -> Vec<&dyn Detector> {
        self.detectors
            .iter()
            .filter(|d| !self.disabled.contains(d.id()) && d.category() == category)
            .map(|d| d.as_ref())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.detectors.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.detectors
            .iter()
            .filter(|d| !self.disabled.contains(d.id()))
            .count()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
