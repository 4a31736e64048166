//! The mutable aggregate owned by the state machine.

use super::state::{CanvasState, CanvasStatus};
use crate::collaboration::PresenceTracker;
use crate::config::CanvasConfig;
use crate::layout::LayoutResult;
use crate::style::SerializableColor;
use crate::tools::{DesignTool, Environment, LiveTool, NavigationTool, PracticalTool};
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Everything both environments share about one open diagram.
///
/// Only [`CanvasStateMachine`](super::CanvasStateMachine) mutates a context.
/// Node, edge and element payloads are stored as opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasContext {
    pub(super) diagram_id: Uuid,
    pub(super) current_environment: Environment,
    pub(super) practical_tool: PracticalTool,
    pub(super) design_tool: DesignTool,
    pub(super) navigation_tool: NavigationTool,
    pub(super) keep_tool_active: bool,
    pub(super) viewport: Viewport,
    pub(super) is_passthrough_mode: bool,
    pub(super) practical_nodes: Vec<Value>,
    pub(super) practical_edges: Vec<Value>,
    pub(super) design_elements: Vec<Value>,
    pub(super) design_app_state: Value,
    pub(super) collaborators: PresenceTracker,
    pub(super) stroke_color: SerializableColor,
    pub(super) stroke_width: f64,
    pub(super) error: Option<String>,
    pub(super) layout: Option<LayoutResult>,
}

impl CanvasContext {
    pub(super) fn new(config: &CanvasConfig, viewport: Viewport) -> Self {
        Self {
            diagram_id: Uuid::new_v4(),
            current_environment: Environment::default(),
            practical_tool: PracticalTool::default(),
            design_tool: DesignTool::default(),
            navigation_tool: NavigationTool::default(),
            keep_tool_active: false,
            viewport,
            is_passthrough_mode: false,
            practical_nodes: Vec::new(),
            practical_edges: Vec::new(),
            design_elements: Vec::new(),
            design_app_state: Value::Null,
            collaborators: PresenceTracker::new(),
            stroke_color: config.stroke_color,
            stroke_width: config.stroke_width,
            error: None,
            layout: None,
        }
    }

    /// Random id assigned when the diagram was opened.
    pub fn diagram_id(&self) -> Uuid {
        self.diagram_id
    }

    pub fn current_environment(&self) -> Environment {
        self.current_environment
    }

    pub fn practical_tool(&self) -> PracticalTool {
        self.practical_tool
    }

    pub fn design_tool(&self) -> DesignTool {
        self.design_tool
    }

    pub fn navigation_tool(&self) -> NavigationTool {
        self.navigation_tool
    }

    pub fn keep_tool_active(&self) -> bool {
        self.keep_tool_active
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_passthrough_mode(&self) -> bool {
        self.is_passthrough_mode
    }

    pub fn practical_nodes(&self) -> &[Value] {
        &self.practical_nodes
    }

    pub fn practical_edges(&self) -> &[Value] {
        &self.practical_edges
    }

    pub fn design_elements(&self) -> &[Value] {
        &self.design_elements
    }

    pub fn design_app_state(&self) -> &Value {
        &self.design_app_state
    }

    pub fn collaborators(&self) -> &PresenceTracker {
        &self.collaborators
    }

    pub fn stroke_color(&self) -> SerializableColor {
        self.stroke_color
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The most recently applied layout.
    pub fn layout(&self) -> Option<&LayoutResult> {
        self.layout.as_ref()
    }

    /// Machine state derived from the environment and the error field.
    pub fn state(&self) -> CanvasState {
        CanvasState {
            environment: self.current_environment,
            status: if self.error.is_some() {
                CanvasStatus::Error
            } else {
                CanvasStatus::Normal
            },
        }
    }

    /// The tool that receives pointer input right now.
    pub fn live_tool(&self) -> LiveTool {
        LiveTool::resolve(
            self.current_environment,
            self.navigation_tool,
            self.practical_tool,
            self.design_tool,
            self.is_passthrough_mode,
        )
    }

    /// Serialize a snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
