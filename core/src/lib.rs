pub mod alerts;
pub mod context;
pub mod events;
pub mod filter;
pub mod overlay;
pub mod playback;
pub mod profanity;
pub mod timers;

// Re-exports for convenience
pub use alerts::{AlertResolver, AnyAsset, AssetCatalog, KnownAssets, SelectedVariant, Unresolved};
pub use context::{AppSettings, ConfigError, load_overlay_config};
pub use events::{Admission, AlertEvent, EventDeduplicator, EventKind, TransportMessage};
pub use filter::{FilterMatching, evaluate};
pub use overlay::{OverlayHandles, OverlayInstance, OverlayRuntime};
pub use playback::{
    AlertToken, ClearReason, DropReason, PlaybackSequencer, PlaybackSignal, PlaybackState,
    PresentationFeedback,
};
pub use profanity::{DirectoryWordLists, ProfanityFilter};
pub use timers::{FileStore, FileTickSink, MemoryStore, TimerReplica, TimerService};
