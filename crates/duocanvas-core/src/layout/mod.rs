//! Layered auto-layout for directed graphs.
//!
//! Implements a Sugiyama-style pipeline:
//!   1. Cycle breaking (DFS back-edge removal) and longest-path ranking
//!   2. Ordering within ranks (barycenter sweeps)
//!   3. Coordinate assignment along the requested direction
//!   4. Side-by-side packing of disconnected components
//!
//! Output is deterministic for identical input order and never depends on
//! the clock. Malformed input (unknown edge endpoints, cycles, duplicate ids)
//! produces a best-effort layout, never an error.

mod graph;
mod ordering;
mod placement;
#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(not(target_arch = "wasm32"))]
pub use worker::{LayoutWorker, LayoutWorkerError};

/// Default fallback node width.
pub const DEFAULT_NODE_WIDTH: f64 = 150.0;
/// Default fallback node height.
pub const DEFAULT_NODE_HEIGHT: f64 = 50.0;
/// Number of barycenter passes (each pass is one sweep, alternating down/up).
pub const ORDERING_PASSES: usize = 4;

/// Direction in which edges flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LayoutDirection {
    /// Top to bottom.
    #[default]
    TB,
    /// Bottom to top.
    BT,
    /// Left to right.
    LR,
    /// Right to left.
    RL,
}

impl LayoutDirection {
    /// Ranks advance along Y.
    pub fn is_vertical(self) -> bool {
        matches!(self, LayoutDirection::TB | LayoutDirection::BT)
    }

    /// Ranks advance toward smaller coordinates.
    pub fn is_reversed(self) -> bool {
        matches!(self, LayoutDirection::BT | LayoutDirection::RL)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TB" | "TD" => Some(LayoutDirection::TB),
            "BT" => Some(LayoutDirection::BT),
            "LR" => Some(LayoutDirection::LR),
            "RL" => Some(LayoutDirection::RL),
            _ => None,
        }
    }
}

/// A node to place, with an optional estimated size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl LayoutNode {
    /// Node that uses the fallback size.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            width: None,
            height: None,
        }
    }

    pub fn sized(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width: Some(width),
            height: Some(height),
        }
    }

    /// Size to lay out with, falling back to the option defaults for
    /// missing or unusable estimates.
    fn resolved_size(&self, options: &LayoutOptions) -> Size {
        let pick = |value: Option<f64>, fallback: f64| match value {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => fallback,
        };
        Size::new(
            pick(self.width, options.node_width),
            pick(self.height, options.node_height),
        )
    }
}

/// A directed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
}

impl LayoutEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Node and edge lists bundled together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutGraph {
    #[serde(default)]
    pub nodes: Vec<LayoutNode>,
    #[serde(default)]
    pub edges: Vec<LayoutEdge>,
}

impl LayoutGraph {
    pub fn new(nodes: Vec<LayoutNode>, edges: Vec<LayoutEdge>) -> Self {
        Self { nodes, edges }
    }
}

/// Spacing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Fallback width for nodes without an estimate.
    pub node_width: f64,
    /// Fallback height for nodes without an estimate.
    pub node_height: f64,
    /// Gap between consecutive ranks (and between components).
    pub rank_separation: f64,
    /// Gap between neighbours within a rank.
    pub node_separation: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
            rank_separation: 80.0,
            node_separation: 40.0,
            margin_x: 20.0,
            margin_y: 20.0,
        }
    }
}

impl LayoutOptions {
    /// True when every field is finite and the fallback sizes are positive.
    pub fn is_valid(&self) -> bool {
        [
            self.node_width,
            self.node_height,
            self.rank_separation,
            self.node_separation,
            self.margin_x,
            self.margin_y,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.node_width > 0.0
            && self.node_height > 0.0
            && self.rank_separation >= 0.0
            && self.node_separation >= 0.0
    }
}

/// Node id → top-left corner of the node.
pub type LayoutPositions = BTreeMap<String, Point>;

/// A finished layout tagged with the request sequence that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub sequence: u64,
    pub direction: LayoutDirection,
    pub positions: LayoutPositions,
}

/// A layout request: graph plus parameters, tagged with its sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutJob {
    pub sequence: u64,
    pub graph: LayoutGraph,
    pub direction: LayoutDirection,
    pub options: LayoutOptions,
}

impl LayoutJob {
    /// Run the job on the current thread.
    pub fn run(&self) -> LayoutResult {
        LayoutResult {
            sequence: self.sequence,
            direction: self.direction,
            positions: compute_graph_layout(&self.graph, self.direction, &self.options),
        }
    }
}

/// Compute a position for every node.
pub fn compute_layout(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    direction: LayoutDirection,
    options: &LayoutOptions,
) -> LayoutPositions {
    let mut positions = LayoutPositions::new();
    if nodes.is_empty() {
        return positions;
    }

    let options = if options.is_valid() {
        *options
    } else {
        log::warn!("Invalid layout options {:?}, using defaults", options);
        LayoutOptions::default()
    };

    let indexed = graph::IndexedGraph::build(nodes, edges, &options);
    let mut offset = 0.0;

    for component in indexed.components() {
        let ranks = component.ranks();
        let layers = ordering::order_layers(&component, &ranks, ORDERING_PASSES);
        let placed = placement::place_component(&component, &layers, direction, &options);

        for (local, point) in placed.points.iter().enumerate() {
            let (dx, dy) = if direction.is_vertical() {
                (offset, 0.0)
            } else {
                (0.0, offset)
            };
            let id = indexed.id(component.members[local]);
            positions.insert(
                id.to_string(),
                Point::new(point.x + dx + options.margin_x, point.y + dy + options.margin_y),
            );
        }

        let extent = if direction.is_vertical() {
            placed.size.width
        } else {
            placed.size.height
        };
        offset += extent + options.rank_separation;
    }

    positions
}

/// Convenience wrapper over [`compute_layout`] for a bundled graph.
pub fn compute_graph_layout(
    graph: &LayoutGraph,
    direction: LayoutDirection,
    options: &LayoutOptions,
) -> LayoutPositions {
    compute_layout(&graph.nodes, &graph.edges, direction, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    fn nodes(ids: &[&str]) -> Vec<LayoutNode> {
        ids.iter().map(|id| LayoutNode::new(*id)).collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<LayoutEdge> {
        pairs.iter().map(|(s, t)| LayoutEdge::new(*s, *t)).collect()
    }

    fn rect_of(positions: &LayoutPositions, id: &str, options: &LayoutOptions) -> Rect {
        let p = positions[id];
        Rect::new(p.x, p.y, p.x + options.node_width, p.y + options.node_height)
    }

    fn overlaps(a: Rect, b: Rect) -> bool {
        a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
    }

    #[test]
    fn test_empty_input() {
        let positions = compute_layout(&[], &[], LayoutDirection::TB, &LayoutOptions::default());
        assert!(positions.is_empty());
    }

    #[test]
    fn test_chain_top_to_bottom() {
        let options = LayoutOptions::default();
        let positions = compute_layout(
            &nodes(&["A", "B", "C"]),
            &edges(&[("A", "B"), ("B", "C")]),
            LayoutDirection::TB,
            &options,
        );
        assert_eq!(positions.len(), 3);
        assert!(positions["A"].y < positions["B"].y);
        assert!(positions["B"].y < positions["C"].y);
        assert!((positions["A"].x - positions["C"].x).abs() < 1e-9);
        assert!((positions["A"].x - options.margin_x).abs() < 1e-9);
        assert!((positions["A"].y - options.margin_y).abs() < 1e-9);
        let step = options.node_height + options.rank_separation;
        assert!((positions["B"].y - positions["A"].y - step).abs() < 1e-9);
    }

    #[test]
    fn test_bottom_to_top_mirrors() {
        let positions = compute_layout(
            &nodes(&["A", "B", "C"]),
            &edges(&[("A", "B"), ("B", "C")]),
            LayoutDirection::BT,
            &LayoutOptions::default(),
        );
        assert!(positions["A"].y > positions["B"].y);
        assert!(positions["B"].y > positions["C"].y);
    }

    #[test]
    fn test_left_to_right_and_reverse() {
        let n = nodes(&["A", "B"]);
        let e = edges(&[("A", "B")]);
        let lr = compute_layout(&n, &e, LayoutDirection::LR, &LayoutOptions::default());
        assert!(lr["A"].x < lr["B"].x);
        assert!((lr["A"].y - lr["B"].y).abs() < 1e-9);

        let rl = compute_layout(&n, &e, LayoutDirection::RL, &LayoutOptions::default());
        assert!(rl["A"].x > rl["B"].x);
    }

    #[test]
    fn test_two_cycle_terminates_without_overlap() {
        let options = LayoutOptions::default();
        let positions = compute_layout(
            &nodes(&["A", "B"]),
            &edges(&[("A", "B"), ("B", "A")]),
            LayoutDirection::TB,
            &options,
        );
        assert_eq!(positions.len(), 2);
        assert!(positions["A"].y < positions["B"].y);
        assert!(!overlaps(
            rect_of(&positions, "A", &options),
            rect_of(&positions, "B", &options)
        ));
    }

    #[test]
    fn test_larger_cycle_every_node_placed() {
        let options = LayoutOptions::default();
        let ids = ["A", "B", "C", "D"];
        let positions = compute_layout(
            &nodes(&ids),
            &edges(&[("A", "B"), ("B", "C"), ("C", "D"), ("D", "B"), ("C", "A")]),
            LayoutDirection::LR,
            &options,
        );
        assert_eq!(positions.len(), ids.len());
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert!(!overlaps(rect_of(&positions, a, &options), rect_of(&positions, b, &options)));
            }
        }
    }

    #[test]
    fn test_disconnected_components_do_not_overlap() {
        let options = LayoutOptions::default();
        let ids = ["A", "B", "C", "D", "E"];
        let positions = compute_layout(
            &nodes(&ids),
            &edges(&[("A", "B"), ("C", "D")]),
            LayoutDirection::TB,
            &options,
        );
        assert_eq!(positions.len(), 5);
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert!(
                    !overlaps(rect_of(&positions, a, &options), rect_of(&positions, b, &options)),
                    "{} overlaps {}",
                    a,
                    b
                );
            }
        }
        // Isolated node sits on rank 0 of its own component.
        assert!((positions["E"].y - options.margin_y).abs() < 1e-9);
        // Components are packed left to right in input order.
        assert!(positions["A"].x < positions["C"].x);
        assert!(positions["C"].x < positions["E"].x);
    }

    #[test]
    fn test_unknown_endpoint_ignored() {
        let positions = compute_layout(
            &nodes(&["A", "B"]),
            &edges(&[("A", "ghost"), ("A", "B")]),
            LayoutDirection::TB,
            &LayoutOptions::default(),
        );
        assert_eq!(positions.len(), 2);
        assert!(!positions.contains_key("ghost"));
        assert!(positions["A"].y < positions["B"].y);
    }

    #[test]
    fn test_duplicate_ids_get_one_position() {
        let positions = compute_layout(
            &nodes(&["A", "A", "B"]),
            &edges(&[("A", "B")]),
            LayoutDirection::TB,
            &LayoutOptions::default(),
        );
        assert_eq!(positions.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let n = nodes(&["A", "B", "C", "D", "E", "F"]);
        let e = edges(&[("A", "D"), ("B", "D"), ("C", "E"), ("A", "F"), ("F", "E"), ("E", "A")]);
        let first = compute_layout(&n, &e, LayoutDirection::TB, &LayoutOptions::default());
        for _ in 0..5 {
            assert_eq!(compute_layout(&n, &e, LayoutDirection::TB, &LayoutOptions::default()), first);
        }
    }

    #[test]
    fn test_barycenter_uncrosses_edges() {
        // Input order puts C before D, which would cross A->D and B->C.
        let positions = compute_layout(
            &nodes(&["R", "A", "B", "C", "D"]),
            &edges(&[("R", "A"), ("R", "B"), ("A", "D"), ("B", "C")]),
            LayoutDirection::TB,
            &LayoutOptions::default(),
        );
        assert!(positions["A"].x < positions["B"].x);
        assert!(positions["D"].x < positions["C"].x);
    }

    #[test]
    fn test_node_sizes_respected() {
        let options = LayoutOptions::default();
        let positions = compute_layout(
            &[LayoutNode::sized("A", 300.0, 120.0), LayoutNode::new("B")],
            &edges(&[("A", "B")]),
            LayoutDirection::TB,
            &options,
        );
        assert!((positions["B"].y - positions["A"].y - (120.0 + options.rank_separation)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_options_fall_back() {
        let options = LayoutOptions {
            node_width: f64::NAN,
            ..LayoutOptions::default()
        };
        let positions = compute_layout(&nodes(&["A"]), &[], LayoutDirection::TB, &options);
        assert_eq!(positions.len(), 1);
        assert!(positions["A"].x.is_finite());
    }

    #[test]
    fn test_inputs_not_mutated() {
        let n = nodes(&["A", "B"]);
        let e = edges(&[("B", "A"), ("A", "B")]);
        let (n_before, e_before) = (n.clone(), e.clone());
        compute_layout(&n, &e, LayoutDirection::TB, &LayoutOptions::default());
        assert_eq!(n, n_before);
        assert_eq!(e, e_before);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(LayoutDirection::parse("lr"), Some(LayoutDirection::LR));
        assert_eq!(LayoutDirection::parse("TD"), Some(LayoutDirection::TB));
        assert_eq!(LayoutDirection::parse("up"), None);
    }
}
