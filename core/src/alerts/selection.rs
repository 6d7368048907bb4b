//! The outcome of alert resolution

use std::sync::Arc;

use alertcast_types::{AlertDefinition, AnimationOverrides, Component, Filter, Variant};

/// A chosen alert variant.
///
/// Holds the owning definition so components can inherit timing and fonts
/// from it. `variant == None` is the definition's "main" variant.
#[derive(Debug, Clone)]
pub struct SelectedVariant {
    definition: Arc<AlertDefinition>,
    variant: Option<usize>,
}

impl SelectedVariant {
    pub fn main(definition: Arc<AlertDefinition>) -> Self {
        Self {
            definition,
            variant: None,
        }
    }

    /// Select variant `index` of `definition`. Out-of-range indexes fall back to main.
    pub fn variant_at(definition: Arc<AlertDefinition>, index: usize) -> Self {
        let variant = (index < definition.variants.len()).then_some(index);
        Self {
            definition,
            variant,
        }
    }

    pub fn definition(&self) -> &AlertDefinition {
        &self.definition
    }

    pub fn variant(&self) -> Option<&Variant> {
        self.variant.and_then(|i| self.definition.variants.get(i))
    }

    pub fn is_main(&self) -> bool {
        self.variant().is_none()
    }

    /// Id of the chosen variant (the definition id for main)
    pub fn id(&self) -> &str {
        self.variant()
            .map(|v| v.id.as_str())
            .unwrap_or(&self.definition.id)
    }

    pub fn name(&self) -> &str {
        self.variant()
            .map(|v| v.name.as_str())
            .unwrap_or(&self.definition.name)
    }

    pub fn enabled(&self) -> bool {
        self.variant()
            .map(|v| v.enabled)
            .unwrap_or(self.definition.enabled)
    }

    pub fn weight(&self) -> u32 {
        self.variant()
            .map(|v| v.weight)
            .unwrap_or(self.definition.weight)
    }

    pub fn filter(&self) -> &Filter {
        self.variant()
            .map(|v| &v.filter)
            .unwrap_or(&self.definition.filter)
    }

    pub fn components(&self) -> &[Component] {
        self.variant()
            .map(|v| v.components.as_slice())
            .unwrap_or(&self.definition.components)
    }

    /// On-screen duration; variants inherit the definition's when unset
    pub fn alert_duration(&self) -> u64 {
        self.variant()
            .and_then(|v| v.alert_duration)
            .unwrap_or(self.definition.alert_duration)
    }

    /// Animation overrides of the chosen variant only (None for main)
    pub fn variant_animation(&self) -> Option<&AnimationOverrides> {
        self.variant().map(|v| &v.animation)
    }

    pub fn definition_animation(&self) -> &AnimationOverrides {
        &self.definition.animation
    }
}
