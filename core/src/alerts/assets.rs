//! Asset lookup with documented fallbacks
//!
//! A component pointing at a gallery item or font that does not exist still
//! renders, using a bundled default instead.

use hashbrown::HashSet;

use alertcast_types::{Font, SYSTEM_FONT};

/// Bundled sound used when an audio component's asset is missing
pub const DEFAULT_AUDIO: &str = "default-audio";

/// Bundled image used when an image component's asset is missing
pub const DEFAULT_IMAGE: &str = "default-image";

/// Gallery id meaning "use the bundled default"
const DEFAULT_MARKER: &str = "%default%";

/// Answers whether referenced assets exist
pub trait AssetCatalog {
    fn has_gallery_item(&self, id: &str) -> bool;
    fn has_font(&self, family: &str) -> bool;

    /// Gallery id to present, falling back to `fallback` when unset or missing
    fn gallery_or(&self, id: Option<&str>, fallback: &str) -> String {
        match id {
            Some(id) if id != DEFAULT_MARKER && self.has_gallery_item(id) => id.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Component font, else the overlay font, else the system font
    fn font_or(&self, font: Option<&Font>, global: &Font) -> Font {
        if let Some(font) = font
            && self.has_font(&font.family)
        {
            return font.clone();
        }
        if self.has_font(&global.family) {
            return global.clone();
        }
        Font {
            family: SYSTEM_FONT.to_string(),
            ..font.unwrap_or(global).clone()
        }
    }
}

/// Catalog that trusts every reference
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyAsset;

impl AssetCatalog for AnyAsset {
    fn has_gallery_item(&self, _id: &str) -> bool {
        true
    }

    fn has_font(&self, _family: &str) -> bool {
        true
    }
}

/// Catalog backed by known gallery ids and font families
#[derive(Debug, Clone, Default)]
pub struct KnownAssets {
    pub gallery: HashSet<String>,
    pub fonts: HashSet<String>,
}

impl AssetCatalog for KnownAssets {
    fn has_gallery_item(&self, id: &str) -> bool {
        self.gallery.contains(id)
    }

    fn has_font(&self, family: &str) -> bool {
        family == SYSTEM_FONT || self.fonts.contains(family)
    }
}
