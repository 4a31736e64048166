//! The canvas state machine: sole owner and mutator of [`CanvasContext`].

use super::context::CanvasContext;
use super::event::CanvasEvent;
use super::state::CanvasState;
use crate::Instant;
use crate::collaboration::Collaborator;
use crate::config::CanvasConfig;
use crate::layout::{LayoutDirection, LayoutGraph, LayoutJob, LayoutOptions, LayoutResult};
use crate::tools::{DesignTool, Environment, LiveTool, PracticalTool, ToolKind};
use crate::viewport::Viewport;
use crate::viewport_sync::{ViewportPush, ViewportSyncCoordinator};
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use crate::layout::{LayoutWorker, LayoutWorkerError};

/// Central authority over environment, tools, viewport and presence.
///
/// Every mutation goes through [`send`](Self::send). Transitions are
/// synchronous and total: unknown combinations are no-ops, faults are stored
/// in the context's `error` field, nothing panics.
pub struct CanvasStateMachine {
    config: CanvasConfig,
    context: CanvasContext,
    sync: ViewportSyncCoordinator,
    /// Sequence number of the most recently issued layout request.
    layout_sequence: u64,
    /// Job handed to the worker and not yet applied. Kept so it can run
    /// inline if the worker goes away.
    pending_layout: Option<LayoutJob>,
    #[cfg(not(target_arch = "wasm32"))]
    worker: Option<LayoutWorker>,
}

impl Default for CanvasStateMachine {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl CanvasStateMachine {
    /// Create a machine for a freshly opened diagram.
    ///
    /// An invalid config is replaced by the defaults.
    pub fn new(config: CanvasConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("{}, falling back to default canvas config", err);
                CanvasConfig::default()
            }
        };
        let sync = ViewportSyncCoordinator::new(config.zoom_range, config.debounce());
        let context = CanvasContext::new(&config, sync.viewport());
        log::debug!("Opened diagram {}", context.diagram_id());

        Self {
            config,
            context,
            sync,
            layout_sequence: 0,
            pending_layout: None,
            #[cfg(not(target_arch = "wasm32"))]
            worker: None,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn context(&self) -> &CanvasContext {
        &self.context
    }

    pub fn state(&self) -> CanvasState {
        self.context.state()
    }

    /// Sequence number of the latest layout request, 0 if none was issued.
    pub fn layout_sequence(&self) -> u64 {
        self.layout_sequence
    }

    /// Whether a background layout is still outstanding.
    pub fn has_pending_layout(&self) -> bool {
        self.pending_layout.is_some()
    }

    /// Apply an event using the current time.
    pub fn send(&mut self, event: CanvasEvent) -> &CanvasContext {
        self.send_at(event, Instant::now())
    }

    /// Apply an event at an explicit instant (used by viewport echo suppression).
    pub fn send_at(&mut self, event: CanvasEvent, now: Instant) -> &CanvasContext {
        match event {
            CanvasEvent::SwitchToPractical => self.switch_environment(Environment::Practical),
            CanvasEvent::SwitchToDesign => self.switch_environment(Environment::Design),
            CanvasEvent::ToggleEnvironment => {
                self.switch_environment(self.context.current_environment.other());
            }
            CanvasEvent::SetNavigationTool { tool } => self.context.navigation_tool = tool,
            CanvasEvent::SetPracticalTool { tool } => self.context.practical_tool = tool,
            CanvasEvent::SetDesignTool { tool } => self.context.design_tool = tool,
            CanvasEvent::ToggleKeepToolActive => {
                self.context.keep_tool_active = !self.context.keep_tool_active;
            }
            CanvasEvent::ToolUsed => self.tool_used(),
            CanvasEvent::SetStrokeColor { color } => {
                if self.in_design("SET_STROKE_COLOR") {
                    log::debug!("Stroke color set to {}", color.to_hex());
                    self.context.stroke_color = color;
                }
            }
            CanvasEvent::SetStrokeWidth { width } => {
                if !(width.is_finite() && width > 0.0) {
                    log::debug!("Ignoring stroke width {}", width);
                } else if self.in_design("SET_STROKE_WIDTH") {
                    self.context.stroke_width = width;
                }
            }
            CanvasEvent::EnablePassthrough => self.context.is_passthrough_mode = true,
            CanvasEvent::DisablePassthrough => self.context.is_passthrough_mode = false,
            CanvasEvent::UpdateViewport { source, viewport } => {
                if self.sync.report_viewport(source, viewport, now).is_accepted() {
                    self.context.viewport = self.sync.viewport();
                }
            }
            CanvasEvent::FitView {
                bounds,
                screen,
                padding,
            } => {
                let fitted = Viewport::fitted(bounds, screen, padding, self.sync.zoom_range());
                self.force_viewport(fitted, now);
            }
            CanvasEvent::ResetViewport => self.force_viewport(Viewport::default(), now),
            CanvasEvent::PanViewport { delta } => {
                let mut viewport = self.sync.viewport();
                viewport.pan(delta);
                self.force_viewport(viewport, now);
            }
            CanvasEvent::ZoomViewport { anchor, factor } => {
                if factor.is_finite() && factor > 0.0 {
                    let mut viewport = self.sync.viewport();
                    viewport.zoom_at(anchor, factor, self.sync.zoom_range());
                    self.force_viewport(viewport, now);
                } else {
                    log::debug!("Ignoring zoom factor {}", factor);
                }
            }
            CanvasEvent::UpdatePracticalData { nodes, edges } => {
                self.context.practical_nodes = nodes;
                self.context.practical_edges = edges;
            }
            CanvasEvent::UpdateDesignData {
                elements,
                app_state,
            } => {
                self.context.design_elements = elements;
                self.context.design_app_state = app_state;
            }
            CanvasEvent::SynchronizeEnvironments => {
                log::debug!(
                    "Environment sync requested ({} nodes, {} edges, {} elements kept as is)",
                    self.context.practical_nodes.len(),
                    self.context.practical_edges.len(),
                    self.context.design_elements.len()
                );
            }
            CanvasEvent::AddCollaborator { collaborator } => {
                self.context.collaborators.add(collaborator);
            }
            CanvasEvent::RemoveCollaborator { id } => {
                if self.context.collaborators.remove(&id).is_none() {
                    log::debug!("Collaborator {} was not present", id);
                }
            }
            CanvasEvent::RequestLayout {
                graph,
                direction,
                options,
            } => self.request_layout(graph, direction, options),
            CanvasEvent::LayoutCompleted(result) => self.apply_layout(result),
            CanvasEvent::Error { message } => {
                log::warn!("Canvas error: {}", message);
                self.context.error = Some(message);
            }
            CanvasEvent::ClearError => self.context.error = None,
            CanvasEvent::ResetCanvas => self.reset(),
        }
        &self.context
    }

    /// Insert or replace a collaborator.
    pub fn add_collaborator(&mut self, collaborator: Collaborator) -> &CanvasContext {
        self.send(CanvasEvent::AddCollaborator { collaborator })
    }

    /// Remove a collaborator by id. Unknown ids are ignored.
    pub fn remove_collaborator(&mut self, id: impl Into<String>) -> &CanvasContext {
        self.send(CanvasEvent::RemoveCollaborator { id: id.into() })
    }

    /// Drain viewport values that must be applied to the rendering surfaces.
    pub fn take_viewport_pushes(&mut self) -> Vec<ViewportPush> {
        self.sync.take_outgoing()
    }

    /// Translate a keyboard shortcut into the matching tool event.
    pub fn tool_event_for_shortcut(&self, key: char) -> Option<CanvasEvent> {
        LiveTool::from_shortcut(self.context.current_environment, key).map(|tool| match tool {
            LiveTool::Navigation(tool) => CanvasEvent::SetNavigationTool { tool },
            LiveTool::Practical(tool) => CanvasEvent::SetPracticalTool { tool },
            LiveTool::Design(tool) => CanvasEvent::SetDesignTool { tool },
        })
    }

    /// Apply any finished background layouts. Returns true if the pending
    /// request was applied.
    pub fn poll_layout(&mut self) -> bool {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let polled = match &self.worker {
                Some(worker) => worker.poll(),
                None => return false,
            };
            let had_pending = self.pending_layout.is_some();
            match polled {
                Ok(results) => {
                    for result in results {
                        self.send(CanvasEvent::LayoutCompleted(result));
                    }
                }
                Err(err) => self.worker_lost(err),
            }
            had_pending && self.pending_layout.is_none()
        }
        #[cfg(target_arch = "wasm32")]
        {
            false
        }
    }

    /// Block until the latest layout request is applied or `timeout` elapses.
    ///
    /// Returns true when no layout is outstanding.
    pub fn wait_for_layout(&mut self, timeout: Duration) -> bool {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let deadline = Instant::now() + timeout;
            while self.pending_layout.is_some() {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                let received = match &self.worker {
                    Some(worker) => worker.recv_timeout(remaining),
                    None => Err(LayoutWorkerError::Disconnected),
                };
                match received {
                    Ok(Some(result)) => {
                        self.send(CanvasEvent::LayoutCompleted(result));
                    }
                    Ok(None) => break,
                    Err(err) => self.worker_lost(err),
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;
        self.pending_layout.is_none()
    }

    fn switch_environment(&mut self, environment: Environment) {
        if self.context.current_environment == environment {
            log::debug!("Already in {:?} environment", environment);
            return;
        }
        log::info!(
            "Switching environment {:?} -> {:?}",
            self.context.current_environment,
            environment
        );
        self.context.current_environment = environment;
    }

    fn in_design(&self, event: &str) -> bool {
        let design = self.context.current_environment == Environment::Design;
        if !design {
            log::debug!("{} ignored outside the design environment", event);
        }
        design
    }

    fn tool_used(&mut self) {
        if self.context.keep_tool_active {
            return;
        }
        match self.context.live_tool() {
            LiveTool::Practical(tool) if tool.traits().one_shot => {
                log::debug!("One-shot tool {} reverts to select", tool.name());
                self.context.practical_tool = PracticalTool::Select;
            }
            LiveTool::Design(tool) if tool.traits().one_shot => {
                log::debug!("One-shot tool {} reverts to select", tool.name());
                self.context.design_tool = DesignTool::Select;
            }
            _ => {}
        }
    }

    fn force_viewport(&mut self, viewport: Viewport, now: Instant) {
        if self.sync.force(viewport, now).is_accepted() {
            self.context.viewport = self.sync.viewport();
        }
    }

    fn request_layout(
        &mut self,
        graph: LayoutGraph,
        direction: Option<LayoutDirection>,
        options: Option<LayoutOptions>,
    ) {
        self.layout_sequence += 1;
        let job = LayoutJob {
            sequence: self.layout_sequence,
            graph,
            direction: direction.unwrap_or(self.config.layout_direction),
            options: options.unwrap_or(self.config.layout),
        };

        #[cfg(not(target_arch = "wasm32"))]
        let job = if job.graph.nodes.len() > self.config.background_layout_threshold {
            match self.submit_background(job) {
                Ok(()) => return,
                Err(job) => job,
            }
        } else {
            job
        };

        self.apply_layout(job.run());
    }

    /// Hand a job to the worker, spawning it on first use. A job that could
    /// not be queued comes back so the caller can run it inline.
    #[cfg(not(target_arch = "wasm32"))]
    fn submit_background(&mut self, job: LayoutJob) -> Result<(), LayoutJob> {
        if self.worker.is_none() {
            match LayoutWorker::spawn() {
                Ok(worker) => self.worker = Some(worker),
                Err(err) => {
                    log::warn!("{}, running layout {} inline", err, job.sequence);
                    return Err(job);
                }
            }
        }
        let Some(worker) = &self.worker else {
            return Err(job);
        };

        match worker.submit(job.clone()) {
            Ok(()) => {
                self.pending_layout = Some(job);
                Ok(())
            }
            Err(err) => {
                log::warn!("{}, running layout {} inline", err, job.sequence);
                self.worker = None;
                Err(job)
            }
        }
    }

    /// Drop a dead worker and finish its outstanding job on this thread.
    #[cfg(not(target_arch = "wasm32"))]
    fn worker_lost(&mut self, err: LayoutWorkerError) {
        log::warn!("{}, dropping layout worker", err);
        self.worker = None;
        if let Some(job) = self.pending_layout.take() {
            log::warn!("Running layout {} inline", job.sequence);
            self.apply_layout(job.run());
        }
    }

    fn apply_layout(&mut self, result: LayoutResult) {
        if result.sequence != self.layout_sequence {
            log::debug!(
                "Dropping stale layout {} (latest is {})",
                result.sequence,
                self.layout_sequence
            );
            return;
        }
        log::debug!("Applied layout {} with {} nodes", result.sequence, result.positions.len());
        self.pending_layout = None;
        self.context.layout = Some(result);
    }

    fn reset(&mut self) {
        log::info!("Resetting diagram {}", self.context.diagram_id);
        self.context.practical_nodes.clear();
        self.context.practical_edges.clear();
        self.context.design_elements.clear();
        self.context.collaborators.clear();
        self.context.layout = None;
        // Results for requests issued before the reset are now stale.
        self.layout_sequence += 1;
        self.pending_layout = None;
    }
}
