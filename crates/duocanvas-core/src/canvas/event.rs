//! Events accepted by the canvas state machine.

use crate::collaboration::Collaborator;
use crate::layout::{LayoutDirection, LayoutGraph, LayoutOptions, LayoutResult};
use crate::style::SerializableColor;
use crate::tools::{DesignTool, NavigationTool, PracticalTool};
use crate::viewport::Viewport;
use crate::viewport_sync::SurfaceId;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named transition request. Serialized as `{"type": "SWITCH_TO_DESIGN", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanvasEvent {
    SwitchToPractical,
    SwitchToDesign,
    /// Switch to whichever environment is not active.
    ToggleEnvironment,
    SetNavigationTool {
        tool: NavigationTool,
    },
    SetPracticalTool {
        tool: PracticalTool,
    },
    SetDesignTool {
        tool: DesignTool,
    },
    ToggleKeepToolActive,
    /// A one-shot tool finished its gesture.
    ToolUsed,
    SetStrokeColor {
        color: SerializableColor,
    },
    SetStrokeWidth {
        width: f64,
    },
    EnablePassthrough,
    DisablePassthrough,
    UpdateViewport {
        source: SurfaceId,
        viewport: Viewport,
    },
    /// Fit `bounds` (world space) into a `screen`-sized surface.
    FitView {
        bounds: Rect,
        screen: Size,
        #[serde(default)]
        padding: f64,
    },
    ResetViewport,
    /// Pan by a screen-space delta, pushed from the host surface.
    PanViewport {
        delta: Vec2,
    },
    /// Zoom by `factor` keeping the screen point `anchor` fixed.
    ZoomViewport {
        anchor: Point,
        factor: f64,
    },
    UpdatePracticalData {
        #[serde(default)]
        nodes: Vec<Value>,
        #[serde(default)]
        edges: Vec<Value>,
    },
    UpdateDesignData {
        #[serde(default)]
        elements: Vec<Value>,
        #[serde(default)]
        app_state: Value,
    },
    SynchronizeEnvironments,
    AddCollaborator {
        collaborator: Collaborator,
    },
    RemoveCollaborator {
        id: String,
    },
    /// Lay out `graph`; direction and options default to the config.
    RequestLayout {
        graph: LayoutGraph,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<LayoutDirection>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<LayoutOptions>,
    },
    LayoutCompleted(LayoutResult),
    Error {
        message: String,
    },
    ClearError,
    ResetCanvas,
}

impl CanvasEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            CanvasEvent::SwitchToPractical => "SWITCH_TO_PRACTICAL",
            CanvasEvent::SwitchToDesign => "SWITCH_TO_DESIGN",
            CanvasEvent::ToggleEnvironment => "TOGGLE_ENVIRONMENT",
            CanvasEvent::SetNavigationTool { .. } => "SET_NAVIGATION_TOOL",
            CanvasEvent::SetPracticalTool { .. } => "SET_PRACTICAL_TOOL",
            CanvasEvent::SetDesignTool { .. } => "SET_DESIGN_TOOL",
            CanvasEvent::ToggleKeepToolActive => "TOGGLE_KEEP_TOOL_ACTIVE",
            CanvasEvent::ToolUsed => "TOOL_USED",
            CanvasEvent::SetStrokeColor { .. } => "SET_STROKE_COLOR",
            CanvasEvent::SetStrokeWidth { .. } => "SET_STROKE_WIDTH",
            CanvasEvent::EnablePassthrough => "ENABLE_PASSTHROUGH",
            CanvasEvent::DisablePassthrough => "DISABLE_PASSTHROUGH",
            CanvasEvent::UpdateViewport { .. } => "UPDATE_VIEWPORT",
            CanvasEvent::FitView { .. } => "FIT_VIEW",
            CanvasEvent::ResetViewport => "RESET_VIEWPORT",
            CanvasEvent::PanViewport { .. } => "PAN_VIEWPORT",
            CanvasEvent::ZoomViewport { .. } => "ZOOM_VIEWPORT",
            CanvasEvent::UpdatePracticalData { .. } => "UPDATE_PRACTICAL_DATA",
            CanvasEvent::UpdateDesignData { .. } => "UPDATE_DESIGN_DATA",
            CanvasEvent::SynchronizeEnvironments => "SYNCHRONIZE_ENVIRONMENTS",
            CanvasEvent::AddCollaborator { .. } => "ADD_COLLABORATOR",
            CanvasEvent::RemoveCollaborator { .. } => "REMOVE_COLLABORATOR",
            CanvasEvent::RequestLayout { .. } => "REQUEST_LAYOUT",
            CanvasEvent::LayoutCompleted(_) => "LAYOUT_COMPLETED",
            CanvasEvent::Error { .. } => "ERROR",
            CanvasEvent::ClearError => "CLEAR_ERROR",
            CanvasEvent::ResetCanvas => "RESET_CANVAS",
        }
    }
}
