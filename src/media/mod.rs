//! Per-item media lifecycle.
//!
//! - `MediaBackend` - the decode/playback capability the core drives
//! - `MediaNode` - load and playback state machine for one item
//! - `RedrawDriver` - aggregates continuous-refresh subscriptions

pub mod backend;
pub mod node;
pub mod redraw;

pub use backend::{LoadRequest, LoadToken, MediaBackend, MediaEvent};
pub use node::{ClickOutcome, ImagePhase, MediaNode, MediaPhase, NodeVisual, VideoPhase};
pub use redraw::RedrawDriver;
