//! Override chain for animation settings
//!
//! Every animation value resolves from the most specific level that sets it:
//! component → selected variant → owning alert definition → overlay defaults.

use alertcast_types::{AnimationDefaults, AnimationOverrides, Component};

use super::SelectedVariant;

#[derive(Debug, Clone, Copy)]
pub struct OverrideChain<'a> {
    pub component: Option<&'a AnimationOverrides>,
    pub variant: Option<&'a AnimationOverrides>,
    pub definition: &'a AnimationOverrides,
    pub defaults: &'a AnimationDefaults,
}

impl<'a> OverrideChain<'a> {
    /// Chain for the alert as a whole (no component level)
    pub fn for_selection(selected: &'a SelectedVariant, defaults: &'a AnimationDefaults) -> Self {
        Self {
            component: None,
            variant: selected.variant_animation(),
            definition: selected.definition_animation(),
            defaults,
        }
    }

    pub fn for_component(
        component: &'a Component,
        selected: &'a SelectedVariant,
        defaults: &'a AnimationDefaults,
    ) -> Self {
        Self {
            component: Some(&component.animation),
            ..Self::for_selection(selected, defaults)
        }
    }

    fn pick<T>(&self, get: impl Fn(&'a AnimationOverrides) -> Option<T>) -> Option<T> {
        self.component
            .and_then(&get)
            .or_else(|| self.variant.and_then(&get))
            .or_else(|| get(self.definition))
    }

    pub fn animation_in(&self) -> &'a str {
        self.pick(|o| o.animation_in.as_deref())
            .unwrap_or(&self.defaults.animation_in)
    }

    pub fn animation_in_duration(&self) -> u64 {
        self.pick(|o| o.animation_in_duration)
            .unwrap_or(self.defaults.animation_in_duration)
    }

    pub fn animation_out(&self) -> &'a str {
        self.pick(|o| o.animation_out.as_deref())
            .unwrap_or(&self.defaults.animation_out)
    }

    pub fn animation_out_duration(&self) -> u64 {
        self.pick(|o| o.animation_out_duration)
            .unwrap_or(self.defaults.animation_out_duration)
    }

    pub fn animation_text(&self) -> &'a str {
        self.pick(|o| o.animation_text.as_deref())
            .unwrap_or(&self.defaults.animation_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(in_duration: Option<u64>, animation_in: Option<&str>) -> AnimationOverrides {
        AnimationOverrides {
            animation_in: animation_in.map(String::from),
            animation_in_duration: in_duration,
            ..Default::default()
        }
    }

    #[test]
    fn most_specific_level_wins() {
        let defaults = AnimationDefaults::default();
        let definition = overrides(Some(1000), Some("zoomIn"));
        let variant = overrides(Some(500), None);
        let component = overrides(None, Some("bounceIn"));

        let chain = OverrideChain {
            component: Some(&component),
            variant: Some(&variant),
            definition: &definition,
            defaults: &defaults,
        };

        assert_eq!(chain.animation_in(), "bounceIn");
        assert_eq!(chain.animation_in_duration(), 500);
        assert_eq!(chain.animation_out(), defaults.animation_out);
        assert_eq!(chain.animation_out_duration(), defaults.animation_out_duration);
    }

    #[test]
    fn definition_fills_in_for_main_variant() {
        let defaults = AnimationDefaults::default();
        let definition = overrides(Some(750), None);

        let chain = OverrideChain {
            component: None,
            variant: None,
            definition: &definition,
            defaults: &defaults,
        };

        assert_eq!(chain.animation_in_duration(), 750);
        assert_eq!(chain.animation_in(), "fadeIn");
        assert_eq!(chain.animation_text(), "wiggle");
    }
}
