//! Alert selection
//!
//! This module provides:
//! - **Resolver**: picks the alert variant to play for an incoming event
//! - **Selection**: the chosen variant with a back-reference to its owner
//! - **Overrides**: component → variant → alert → overlay value fallback
//! - **Templates**: placeholder substitution for text and TTS components
//! - **Assets**: fallbacks for missing gallery items and fonts

mod assets;
mod overrides;
mod resolver;
mod selection;
mod template;


pub use alertcast_types::{AlertDefinition, Component, ComponentKind, Variant};
pub use assets::{AnyAsset, AssetCatalog, DEFAULT_AUDIO, DEFAULT_IMAGE, KnownAssets};
pub use overrides::OverrideChain;
pub use resolver::{AlertResolver, Unresolved};
pub use selection::SelectedVariant;
pub use template::render_template;
