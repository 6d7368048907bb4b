//! Per-component presentation projection
//!
//! The presentation layer never sees alert definitions. It receives one
//! fully resolved projection per component: visibility, timing, text, font,
//! volume and the asset to load, with every fallback already applied.

use alertcast_types::{AlertEvent, AlertsOverlayConfig, Component, ComponentKind, Font, Geometry};

use crate::alerts::{
    AssetCatalog, DEFAULT_AUDIO, DEFAULT_IMAGE, OverrideChain, SelectedVariant, render_template,
};
use crate::filter::FilterMatching;

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentProjection {
    pub component_id: String,
    /// Component type name (`audio`, `tts`, `text`, ...)
    pub kind: &'static str,
    pub visible: bool,
    pub geometry: Geometry,

    // ─── Animation ──────────────────────────────────────────────────────────
    pub animation_type: String,
    pub animation_duration_ms: u64,
    /// Entrance offset from the moment the alert is shown
    pub animation_delay_ms: u64,
    pub animation_out: String,
    pub animation_out_duration_ms: u64,
    /// Per-letter text animation, text components only
    pub text_animation: Option<String>,

    // ─── Content ────────────────────────────────────────────────────────────
    pub resolved_text: Option<String>,
    pub resolved_font: Option<Font>,
    pub resolved_volume: Option<f32>,
    /// Gallery id to load, after fallbacks
    pub asset: Option<String>,
    /// Audio start delay or TTS speak delay
    pub start_delay_ms: u64,
    pub voice: Option<String>,
}

impl ComponentProjection {
    /// Audio that the TTS barrier must wait for
    pub fn is_gating_audio(&self) -> bool {
        self.visible && self.kind == "audio"
    }

    pub fn is_speech(&self) -> bool {
        self.visible && self.kind == "tts" && self.resolved_text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A resolved selection with everything the sequencer needs to time it
#[derive(Debug, Clone)]
pub struct PreparedAlert {
    pub selected: SelectedVariant,
    pub components: Vec<ComponentProjection>,
    pub animation_out: String,
    pub animation_out_duration_ms: u64,
}

impl PreparedAlert {
    pub fn prepare(
        selected: SelectedVariant,
        event: &AlertEvent,
        config: &AlertsOverlayConfig,
        assets: &dyn AssetCatalog,
    ) -> Self {
        let components = project_components(&selected, event, config, assets);
        let chain = OverrideChain::for_selection(&selected, &config.defaults);
        let animation_out = chain.animation_out().to_string();
        let animation_out_duration_ms = chain.animation_out_duration();

        Self {
            selected,
            components,
            animation_out,
            animation_out_duration_ms,
        }
    }
}

/// Resolve every component of the selected alert against `event`
pub fn project_components(
    selected: &SelectedVariant,
    event: &AlertEvent,
    config: &AlertsOverlayConfig,
    assets: &dyn AssetCatalog,
) -> Vec<ComponentProjection> {
    selected
        .components()
        .iter()
        .map(|component| project(component, selected, event, config, assets))
        .collect()
}

fn project(
    component: &Component,
    selected: &SelectedVariant,
    event: &AlertEvent,
    config: &AlertsOverlayConfig,
    assets: &dyn AssetCatalog,
) -> ComponentProjection {
    let chain = OverrideChain::for_component(component, selected, &config.defaults);

    let mut projection = ComponentProjection {
        component_id: component.id.clone(),
        kind: component.kind.name(),
        visible: component.enabled_when.matches_event(event),
        geometry: component.geometry.clone(),
        animation_type: chain.animation_in().to_string(),
        animation_duration_ms: chain.animation_in_duration(),
        animation_delay_ms: component.animation_delay.unwrap_or(0),
        animation_out: chain.animation_out().to_string(),
        animation_out_duration_ms: chain.animation_out_duration(),
        text_animation: None,
        resolved_text: None,
        resolved_font: None,
        resolved_volume: None,
        asset: None,
        start_delay_ms: 0,
        voice: None,
    };

    match &component.kind {
        ComponentKind::Audio { gallery_id, volume, delay } => {
            projection.visible &= !event.is_sound_muted;
            projection.asset = Some(assets.gallery_or(gallery_id.as_deref(), DEFAULT_AUDIO));
            projection.resolved_volume = Some(*volume);
            projection.start_delay_ms = *delay;
        }
        ComponentKind::Tts { template, speak_delay, voice, volume } => {
            // Muting sound silences narration too
            projection.visible &= !(event.is_sound_muted || event.is_tts_muted);
            projection.resolved_text = Some(render_template(template, event));
            projection.resolved_volume = Some(volume.unwrap_or(config.tts.volume));
            projection.start_delay_ms = *speak_delay;
            projection.voice = voice.clone().or_else(|| config.tts.voice.clone());
        }
        ComponentKind::Text { message_template, font, global_font } => {
            projection.resolved_text = Some(render_template(message_template, event));
            projection.resolved_font =
                Some(assets.font_or(font.as_ref(), config.global_font(*global_font)));
            projection.text_animation = Some(chain.animation_text().to_string());
        }
        ComponentKind::Gallery { gallery_id, is_video, volume } => {
            projection.asset = Some(assets.gallery_or(gallery_id.as_deref(), DEFAULT_IMAGE));
            if *is_video {
                projection.resolved_volume = Some(if event.is_sound_muted {
                    0.0
                } else {
                    volume.unwrap_or(1.0)
                });
            }
        }
        ComponentKind::ProfileImage { fallback_gallery_id } => {
            projection.asset = Some(assets.gallery_or(fallback_gallery_id.as_deref(), DEFAULT_IMAGE));
        }
        ComponentKind::Custom { .. } => {}
    }

    projection
}
