//! Model settings and the flags shared by every host object.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// Generational model of the simulation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ModelType {
    /// Discrete, non-overlapping generations. Individuals have no age.
    #[default]
    WrightFisher,
    /// Overlapping generations with explicit ages.
    NonWrightFisher,
}

/// Fixed configuration of one simulation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelSettings {
    /// Track pedigree IDs for individuals.
    pub pedigrees: bool,
    /// Spatial dimensionality, 0 (non-spatial) to 3.
    pub dimensionality: usize,
    pub model: ModelType,
    /// Model an X chromosome: females carry two, males one plus a null Y.
    pub sex_chromosomes: bool,
}

/// A state that, once observed anywhere, stays set for the run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HostFlag {
    Color,
    Dictionary,
    Tag,
    FitnessScaling,
}

/// Context injected into every host object.
#[derive(Debug, Default)]
pub struct HostContext {
    settings: ModelSettings,
    any_color_set: AtomicBool,
    any_dictionary_set: AtomicBool,
    any_tag_set: AtomicBool,
    any_fitness_scaling_set: AtomicBool,
    last_pedigree_id: AtomicI64,
}

impl HostContext {
    pub fn new(mut settings: ModelSettings) -> Self {
        if settings.dimensionality > 3 {
            tracing::warn!(
                dimensionality = settings.dimensionality,
                "spatial dimensionality clamped to 3"
            );
            settings.dimensionality = 3;
        }
        HostContext {
            settings,
            ..HostContext::default()
        }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    #[inline]
    pub fn dimensionality(&self) -> usize {
        self.settings.dimensionality
    }

    #[inline]
    pub fn tracks_pedigrees(&self) -> bool {
        self.settings.pedigrees
    }

    #[inline]
    pub fn is_wright_fisher(&self) -> bool {
        self.settings.model == ModelType::WrightFisher
    }

    fn flag(&self, flag: HostFlag) -> &AtomicBool {
        match flag {
            HostFlag::Color => &self.any_color_set,
            HostFlag::Dictionary => &self.any_dictionary_set,
            HostFlag::Tag => &self.any_tag_set,
            HostFlag::FitnessScaling => &self.any_fitness_scaling_set,
        }
    }

    #[inline]
    pub fn mark(&self, flag: HostFlag) {
        self.flag(flag).store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_set(&self, flag: HostFlag) -> bool {
        self.flag(flag).load(Ordering::Relaxed)
    }

    /// Next pedigree ID; IDs start at 1 and are never reused.
    pub(crate) fn next_pedigree_id(&self) -> i64 {
        self.last_pedigree_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_start_clear_and_stay_set() {
        let ctx = HostContext::default();
        assert!(!ctx.is_set(HostFlag::Color));
        ctx.mark(HostFlag::Color);
        ctx.mark(HostFlag::Color);
        assert!(ctx.is_set(HostFlag::Color));
        assert!(!ctx.is_set(HostFlag::Tag));
    }

    #[test]
    fn dimensionality_is_clamped() {
        let ctx = HostContext::new(ModelSettings {
            dimensionality: 5,
            ..ModelSettings::default()
        });
        assert_eq!(ctx.dimensionality(), 3);
        assert!(ctx.is_wright_fisher());
    }

    #[test]
    fn pedigree_ids_increase() {
        let ctx = HostContext::default();
        assert_eq!(ctx.next_pedigree_id(), 1);
        assert_eq!(ctx.next_pedigree_id(), 2);
    }
}
