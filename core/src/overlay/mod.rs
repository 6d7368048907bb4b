//! Overlay instances and their async runtime

mod instance;
mod runtime;


pub use instance::OverlayInstance;
pub use runtime::{OverlayHandles, OverlayRuntime, TICK_INTERVAL, watch_config};
