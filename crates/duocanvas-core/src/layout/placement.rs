//! Coordinate assignment for one component.

use super::graph::Component;
use super::{LayoutDirection, LayoutOptions};
use kurbo::{Point, Size};

/// Positions of one component relative to its own origin.
pub(super) struct PlacedComponent {
    /// Top-left corner per local node index.
    pub points: Vec<Point>,
    /// Bounding size of the whole component.
    pub size: Size,
}

/// Lay out ordered layers along the main axis of `direction`.
///
/// Each rank is as thick as its largest node along the main axis; ranks are
/// `rank_separation` apart. Inside a rank nodes are `node_separation` apart
/// and the rank is centered against the widest rank.
pub(super) fn place_component(
    component: &Component,
    layers: &[Vec<usize>],
    direction: LayoutDirection,
    options: &LayoutOptions,
) -> PlacedComponent {
    let vertical = direction.is_vertical();
    let main_extent = |size: Size| if vertical { size.height } else { size.width };
    let cross_extent = |size: Size| if vertical { size.width } else { size.height };

    let thickness: Vec<f64> = layers
        .iter()
        .map(|layer| {
            layer
                .iter()
                .map(|&node| main_extent(component.sizes[node]))
                .fold(0.0, f64::max)
        })
        .collect();

    let mut rank_start = Vec::with_capacity(layers.len());
    let mut cursor = 0.0;
    for &t in &thickness {
        rank_start.push(cursor);
        cursor += t + options.rank_separation;
    }
    let total_main = match (rank_start.last(), thickness.last()) {
        (Some(start), Some(t)) => start + t,
        _ => 0.0,
    };

    let layer_width: Vec<f64> = layers
        .iter()
        .map(|layer| {
            let sum: f64 = layer.iter().map(|&node| cross_extent(component.sizes[node])).sum();
            sum + options.node_separation * layer.len().saturating_sub(1) as f64
        })
        .collect();
    let max_cross = layer_width.iter().copied().fold(0.0, f64::max);

    let mut points = vec![Point::ZERO; component.len()];
    for (r, layer) in layers.iter().enumerate() {
        let mut along = (max_cross - layer_width[r]) / 2.0;
        for &node in layer {
            let size = component.sizes[node];
            let mut depth = rank_start[r] + (thickness[r] - main_extent(size)) / 2.0;
            if direction.is_reversed() {
                depth = total_main - depth - main_extent(size);
            }
            points[node] = if vertical {
                Point::new(along, depth)
            } else {
                Point::new(depth, along)
            };
            along += cross_extent(size) + options.node_separation;
        }
    }

    let size = if vertical {
        Size::new(max_cross, total_main)
    } else {
        Size::new(total_main, max_cross)
    };

    PlacedComponent { points, size }
}
