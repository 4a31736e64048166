//! DuoCanvas Core Library
//!
//! Coordination layer for a diagram editor with two mutually exclusive
//! environments: a structured node/edge editor ("practical") and a free-form
//! drawing surface ("design"). Rendering lives elsewhere; this crate owns the
//! state machine, viewport synchronization, presence, and auto-layout.

pub mod canvas;
pub mod collaboration;
pub mod config;
pub mod layout;
pub mod style;
pub mod tools;
pub mod viewport;
pub mod viewport_sync;

pub use canvas::{CanvasContext, CanvasEvent, CanvasState, CanvasStateMachine, CanvasStatus};
pub use collaboration::{Collaborator, PresenceTracker};
pub use config::{CanvasConfig, ConfigError, ConfigResult};
pub use layout::{
    LayoutDirection, LayoutEdge, LayoutGraph, LayoutJob, LayoutNode, LayoutOptions, LayoutPositions,
    LayoutResult, compute_graph_layout, compute_layout,
};
pub use style::SerializableColor;
pub use tools::{
    DesignTool, Environment, LiveTool, NavigationTool, PracticalTool, ToolKind, ToolTraits,
};
pub use viewport::{Viewport, ZoomRange};
pub use viewport_sync::{SurfaceId, SyncOutcome, ViewportPush, ViewportSyncCoordinator};

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;
