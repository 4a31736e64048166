//! Viewport synchronization between the two rendering surfaces.
//!
//! Both surfaces listen for viewport changes and also emit them. When the
//! coordinator pushes a new value into surface B, B reports it straight back
//! as if the user had moved it. The coordinator absorbs that round trip with a
//! short quiet window: a report from a *different* surface that arrives within
//! `debounce` of the last accepted report is treated as an echo and dropped.
//!
//! This is last-writer-wins, not a lock. A surface cannot echo itself, so
//! reports from the surface that won most recently always apply.

use crate::Instant;
use crate::viewport::{Viewport, ZoomRange};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default echo window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

/// Identity of a viewport source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceId {
    /// The node/edge graph editor.
    Practical,
    /// The free-form drawing surface.
    Design,
    /// The embedding application (toolbar zoom, fit view). Never receives pushes.
    Host,
}

impl SurfaceId {
    /// Surfaces that render the viewport and therefore receive pushes.
    pub const RENDERING: [SurfaceId; 2] = [SurfaceId::Practical, SurfaceId::Design];
}

/// Result of a viewport report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Stored and queued for the other surfaces.
    Accepted,
    /// Dropped as an echo of a value that was just propagated.
    EchoSuppressed,
    /// Dropped because a component was NaN/infinite or zoom was not positive.
    Invalid,
}

impl SyncOutcome {
    pub fn is_accepted(self) -> bool {
        self == SyncOutcome::Accepted
    }
}

/// A viewport value that must be applied to a rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportPush {
    pub target: SurfaceId,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Copy)]
struct AcceptedReport {
    source: SurfaceId,
    at: Instant,
}

/// Single owner of the authoritative viewport.
#[derive(Debug, Clone)]
pub struct ViewportSyncCoordinator {
    viewport: Viewport,
    zoom_range: ZoomRange,
    debounce: Duration,
    last: Option<AcceptedReport>,
    /// Pending pushes, at most one per target.
    outgoing: Vec<ViewportPush>,
}

impl Default for ViewportSyncCoordinator {
    fn default() -> Self {
        Self::new(ZoomRange::default(), Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl ViewportSyncCoordinator {
    /// An invalid zoom range is replaced by the default one.
    pub fn new(zoom_range: ZoomRange, debounce: Duration) -> Self {
        let zoom_range = if zoom_range.is_valid() {
            zoom_range
        } else {
            log::warn!("Invalid zoom range {:?}, using defaults", zoom_range);
            ZoomRange::default()
        };
        Self {
            viewport: Viewport::default().clamped(zoom_range),
            zoom_range,
            debounce,
            last: None,
            outgoing: Vec::new(),
        }
    }

    /// The current authoritative viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn zoom_range(&self) -> ZoomRange {
        self.zoom_range
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Source of the most recently accepted report.
    pub fn last_source(&self) -> Option<SurfaceId> {
        self.last.map(|report| report.source)
    }

    /// Decide whether a surface's viewport report should be applied.
    pub fn report_viewport(
        &mut self,
        source: SurfaceId,
        viewport: Viewport,
        now: Instant,
    ) -> SyncOutcome {
        if !viewport.is_valid() {
            log::warn!("Ignoring invalid viewport from {:?}: {:?}", source, viewport);
            return SyncOutcome::Invalid;
        }

        if let Some(last) = self.last {
            let elapsed = now.saturating_duration_since(last.at);
            if last.source != source && elapsed < self.debounce {
                log::debug!(
                    "Suppressed viewport echo from {:?} ({:?} after {:?})",
                    source,
                    elapsed,
                    last.source
                );
                return SyncOutcome::EchoSuppressed;
            }
        }

        self.accept(source, viewport, now);
        SyncOutcome::Accepted
    }

    /// Apply a viewport unconditionally as the host surface.
    pub fn force(&mut self, viewport: Viewport, now: Instant) -> SyncOutcome {
        if !viewport.is_valid() {
            log::warn!("Ignoring invalid forced viewport: {:?}", viewport);
            return SyncOutcome::Invalid;
        }
        self.accept(SurfaceId::Host, viewport, now);
        SyncOutcome::Accepted
    }

    fn accept(&mut self, source: SurfaceId, viewport: Viewport, now: Instant) {
        self.viewport = viewport.clamped(self.zoom_range);
        self.last = Some(AcceptedReport { source, at: now });

        for target in SurfaceId::RENDERING {
            if target == source {
                continue;
            }
            let push = ViewportPush {
                target,
                viewport: self.viewport,
            };
            match self.outgoing.iter_mut().find(|p| p.target == target) {
                Some(pending) => *pending = push,
                None => self.outgoing.push(push),
            }
        }
    }

    /// Take pending pushes (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<ViewportPush> {
        std::mem::take(&mut self.outgoing)
    }

    /// Check if there are pending pushes.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_report_always_accepted() {
        let mut sync = ViewportSyncCoordinator::default();
        let v = Viewport::new(10.0, 20.0, 1.5);
        assert_eq!(
            sync.report_viewport(SurfaceId::Design, v, Instant::now()),
            SyncOutcome::Accepted
        );
        assert_eq!(sync.viewport(), v);
        assert_eq!(sync.last_source(), Some(SurfaceId::Design));
    }

    #[test]
    fn test_echo_inside_window_is_suppressed() {
        let mut sync = ViewportSyncCoordinator::default();
        let t0 = Instant::now();
        let v1 = Viewport::new(1.0, 1.0, 1.0);
        let v2 = Viewport::new(2.0, 2.0, 1.0);
        let v3 = Viewport::new(3.0, 3.0, 1.0);

        assert!(sync.report_viewport(SurfaceId::Practical, v1, t0).is_accepted());
        assert_eq!(
            sync.report_viewport(SurfaceId::Design, v2, t0 + ms(10)),
            SyncOutcome::EchoSuppressed
        );
        assert_eq!(sync.viewport(), v1);

        assert!(sync.report_viewport(SurfaceId::Design, v3, t0 + ms(60)).is_accepted());
        assert_eq!(sync.viewport(), v3);
    }

    #[test]
    fn test_same_surface_always_overwrites() {
        let mut sync = ViewportSyncCoordinator::default();
        let t0 = Instant::now();
        sync.report_viewport(SurfaceId::Practical, Viewport::new(1.0, 0.0, 1.0), t0);
        let outcome =
            sync.report_viewport(SurfaceId::Practical, Viewport::new(5.0, 0.0, 1.0), t0 + ms(1));
        assert!(outcome.is_accepted());
        assert!((sync.viewport().x - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_is_clamped_on_accept() {
        let mut sync = ViewportSyncCoordinator::default();
        sync.report_viewport(SurfaceId::Practical, Viewport::new(0.0, 0.0, 50.0), Instant::now());
        assert!((sync.viewport().zoom - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        let mut sync = ViewportSyncCoordinator::default();
        let outcome =
            sync.report_viewport(SurfaceId::Design, Viewport::new(f64::NAN, 0.0, 1.0), Instant::now());
        assert_eq!(outcome, SyncOutcome::Invalid);
        assert_eq!(sync.last_source(), None);
    }

    #[test]
    fn test_pushes_go_to_other_surfaces_and_coalesce() {
        let mut sync = ViewportSyncCoordinator::default();
        let t0 = Instant::now();
        sync.report_viewport(SurfaceId::Practical, Viewport::new(1.0, 0.0, 1.0), t0);
        sync.report_viewport(SurfaceId::Practical, Viewport::new(2.0, 0.0, 1.0), t0 + ms(5));

        let pushes = sync.take_outgoing();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].target, SurfaceId::Design);
        assert!((pushes[0].viewport.x - 2.0).abs() < f64::EPSILON);
        assert!(!sync.has_outgoing());
    }

    #[test]
    fn test_force_pushes_to_both_surfaces_and_suppresses_echoes() {
        let mut sync = ViewportSyncCoordinator::default();
        let t0 = Instant::now();
        assert!(sync.force(Viewport::new(7.0, 7.0, 2.0), t0).is_accepted());
        assert_eq!(sync.take_outgoing().len(), 2);

        let echo = sync.report_viewport(SurfaceId::Practical, Viewport::new(7.1, 7.0, 2.0), t0 + ms(3));
        assert_eq!(echo, SyncOutcome::EchoSuppressed);
    }

    #[test]
    fn test_zero_debounce_never_suppresses() {
        let mut sync = ViewportSyncCoordinator::new(ZoomRange::default(), Duration::ZERO);
        let t0 = Instant::now();
        sync.report_viewport(SurfaceId::Practical, Viewport::new(1.0, 0.0, 1.0), t0);
        let outcome = sync.report_viewport(SurfaceId::Design, Viewport::new(2.0, 0.0, 1.0), t0);
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_inverted_zoom_range_falls_back_to_default() {
        let mut sync = ViewportSyncCoordinator::new(ZoomRange::new(2.0, 1.0), ms(50));
        assert_eq!(sync.zoom_range(), ZoomRange::default());
        assert_eq!(sync.viewport(), Viewport::default());

        sync.report_viewport(SurfaceId::Design, Viewport::new(0.0, 0.0, 100.0), Instant::now());
        assert!((sync.viewport().zoom - ZoomRange::default().max).abs() < f64::EPSILON);
    }

    #[test]
    fn test_nan_zoom_range_falls_back_to_default() {
        let sync = ViewportSyncCoordinator::new(ZoomRange::new(f64::NAN, 3.0), ms(50));
        assert_eq!(sync.zoom_range(), ZoomRange::default());
    }
}
